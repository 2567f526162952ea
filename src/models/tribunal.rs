use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tribunal {
    pub id: i32,
    pub nombre: String,
    pub provincia: String,
    pub direccion: Option<String>,
    pub telefono: Option<String>,
    pub tipo_establecimiento: Option<String>,
    pub horario_atencion: Option<String>,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
}

/// Fila del listado público de tribunales activos
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TribunalListItem {
    pub id: i32,
    pub nombre: String,
    pub provincia: String,
    pub direccion: Option<String>,
    pub tipo_establecimiento: Option<String>,
    pub horario_atencion: Option<String>,
}
