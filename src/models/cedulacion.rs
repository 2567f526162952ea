use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::estados::{EstadoCedulacion, Genero};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cedulacion {
    pub id: i32,
    pub nombre_completo: String,
    pub cedula_original: Option<String>,
    pub cedula_nueva: Option<String>,
    pub fecha_nacimiento: NaiveDate,
    pub lugar_nacimiento: String,
    #[sqlx(try_from = "String")]
    pub genero: Genero,
    pub foto_url: Option<String>,
    pub tribunal_id: i32,
    #[sqlx(try_from = "String")]
    pub estado: EstadoCedulacion,
    pub observaciones: Option<String>,
    pub fecha_solicitud: DateTime<Utc>,
    pub fecha_entrega_estimada: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos a insertar al registrar una solicitud
#[derive(Debug, Clone)]
pub struct NuevaCedulacion {
    pub nombre_completo: String,
    pub cedula_original: Option<String>,
    pub fecha_nacimiento: NaiveDate,
    pub lugar_nacimiento: String,
    pub genero: Genero,
    pub foto_url: Option<String>,
    pub tribunal_id: i32,
    pub observaciones: Option<String>,
}

/// Fila del listado general, con el tribunal asignado
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CedulacionListItem {
    pub id: i32,
    pub nombre_completo: String,
    pub cedula_original: Option<String>,
    pub cedula_nueva: Option<String>,
    #[sqlx(try_from = "String")]
    pub estado: EstadoCedulacion,
    pub fecha_solicitud: DateTime<Utc>,
    pub fecha_entrega_estimada: Option<DateTime<Utc>>,
    pub tribunal_id: i32,
    pub tribunal_nombre: String,
    pub tribunal_provincia: String,
    pub created_at: DateTime<Utc>,
}

/// Cedulación de un tribunal junto a los datos de su primera factura
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CedulacionPorTribunal {
    pub id: i32,
    pub nombre_completo: String,
    pub cedula_original: Option<String>,
    pub cedula_nueva: Option<String>,
    #[sqlx(try_from = "String")]
    pub estado: EstadoCedulacion,
    pub fecha_solicitud: DateTime<Utc>,
    pub fecha_entrega_estimada: Option<DateTime<Utc>>,
    pub numero_factura: Option<String>,
    pub total: Option<rust_decimal::Decimal>,
    pub estado_pago: Option<String>,
}
