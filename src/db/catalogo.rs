use sqlx::{PgExecutor, PgPool};

use crate::models::{Servicio, ServicioListItem, Tribunal, TribunalListItem};

// ============================================================================
// TRIBUNALES
// ============================================================================

pub async fn listar_tribunales_activos(pool: &PgPool) -> Result<Vec<TribunalListItem>, sqlx::Error> {
    sqlx::query_as::<_, TribunalListItem>(
        r#"
        SELECT id, nombre, provincia, direccion, tipo_establecimiento, horario_atencion
        FROM tribunales
        WHERE activo = TRUE
        ORDER BY provincia ASC, nombre ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn buscar_tribunal<'e, E>(executor: E, id: i32) -> Result<Option<Tribunal>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Tribunal>(
        r#"
        SELECT id, nombre, provincia, direccion, telefono, tipo_establecimiento,
               horario_atencion, activo, created_at
        FROM tribunales
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn buscar_tribunales(pool: &PgPool, ids: &[i32]) -> Result<Vec<Tribunal>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, Tribunal>(
        r#"
        SELECT id, nombre, provincia, direccion, telefono, tipo_establecimiento,
               horario_atencion, activo, created_at
        FROM tribunales
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(pool)
    .await
}

// ============================================================================
// SERVICIOS
// ============================================================================

pub async fn listar_servicios_activos(pool: &PgPool) -> Result<Vec<ServicioListItem>, sqlx::Error> {
    sqlx::query_as::<_, ServicioListItem>(
        r#"
        SELECT id, nombre, descripcion, precio, tipo_servicio
        FROM servicios
        WHERE activo = TRUE
        ORDER BY tipo_servicio ASC, nombre ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn buscar_servicio_activo_por_nombre<'e, E>(
    executor: E,
    nombre: &str,
) -> Result<Option<Servicio>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Servicio>(
        r#"
        SELECT id, nombre, descripcion, precio, tipo_servicio, activo
        FROM servicios
        WHERE nombre = $1 AND activo = TRUE
        "#,
    )
    .bind(nombre)
    .fetch_optional(executor)
    .await
}

/// Incluye servicios inactivos; quien llama decide si se pueden cobrar
pub async fn buscar_servicios<'e, E>(executor: E, ids: &[i32]) -> Result<Vec<Servicio>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Servicio>(
        r#"
        SELECT id, nombre, descripcion, precio, tipo_servicio, activo
        FROM servicios
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(executor)
    .await
}
