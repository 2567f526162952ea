use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::estados::EstadoPago;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Factura {
    pub id: i32,
    pub cedulacion_id: i32,
    pub numero_factura: String,
    pub subtotal: Decimal,
    pub impuestos: Decimal,
    pub total: Decimal,
    #[sqlx(try_from = "String")]
    pub estado_pago: EstadoPago,
    pub metodo_pago: Option<String>,
    pub fecha_vencimiento: DateTime<Utc>,
    pub fecha_pago: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FacturaDetalle {
    pub id: i32,
    pub factura_id: i32,
    pub servicio_id: i32,
    pub cantidad: i32,
    pub precio_unitario: Decimal,
    pub subtotal: Decimal,
}
