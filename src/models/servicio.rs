use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Entrada del catálogo de servicios facturables
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Servicio {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: Decimal,
    pub tipo_servicio: String,
    pub activo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServicioListItem {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: Decimal,
    pub tipo_servicio: String,
}
