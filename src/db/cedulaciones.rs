use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::models::{
    Cedulacion, CedulacionListItem, CedulacionPorTribunal, EstadoCedulacion, Estadisticas,
    NuevaCedulacion,
};

const COLUMNAS: &str = r#"
    id, nombre_completo, cedula_original, cedula_nueva, fecha_nacimiento, lugar_nacimiento,
    genero, foto_url, tribunal_id, estado, observaciones, fecha_solicitud,
    fecha_entrega_estimada, created_at, updated_at
"#;

// ============================================================================
// ESCRITURA
// ============================================================================

pub async fn insertar_cedulacion<'e, E>(
    executor: E,
    nueva: &NuevaCedulacion,
    fecha_solicitud: DateTime<Utc>,
    fecha_entrega_estimada: DateTime<Utc>,
) -> Result<Cedulacion, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        r#"
        INSERT INTO cedulaciones (
            nombre_completo, cedula_original, fecha_nacimiento, lugar_nacimiento,
            genero, foto_url, tribunal_id, estado, observaciones,
            fecha_solicitud, fecha_entrega_estimada
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {COLUMNAS}
        "#
    );

    sqlx::query_as::<_, Cedulacion>(&query)
        .bind(&nueva.nombre_completo)
        .bind(&nueva.cedula_original)
        .bind(nueva.fecha_nacimiento)
        .bind(&nueva.lugar_nacimiento)
        .bind(nueva.genero.as_str())
        .bind(&nueva.foto_url)
        .bind(nueva.tribunal_id)
        .bind(EstadoCedulacion::Pendiente.as_str())
        .bind(&nueva.observaciones)
        .bind(fecha_solicitud)
        .bind(fecha_entrega_estimada)
        .fetch_one(executor)
        .await
}

/// `cedula_nueva = None` conserva el valor guardado
pub async fn actualizar_estado(
    pool: &PgPool,
    id: i32,
    estado: EstadoCedulacion,
    cedula_nueva: Option<&str>,
) -> Result<Option<Cedulacion>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE cedulaciones
        SET estado = $2,
            cedula_nueva = COALESCE($3, cedula_nueva),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNAS}
        "#
    );

    sqlx::query_as::<_, Cedulacion>(&query)
        .bind(id)
        .bind(estado.as_str())
        .bind(cedula_nueva)
        .fetch_optional(pool)
        .await
}

// ============================================================================
// LECTURA
// ============================================================================

pub async fn buscar_cedulacion<'e, E>(executor: E, id: i32) -> Result<Option<Cedulacion>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!("SELECT {COLUMNAS} FROM cedulaciones WHERE id = $1");
    sqlx::query_as::<_, Cedulacion>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn buscar_cedulaciones(pool: &PgPool, ids: &[i32]) -> Result<Vec<Cedulacion>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let query = format!("SELECT {COLUMNAS} FROM cedulaciones WHERE id = ANY($1)");
    sqlx::query_as::<_, Cedulacion>(&query)
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub async fn listar_cedulaciones(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<CedulacionListItem>, sqlx::Error> {
    sqlx::query_as::<_, CedulacionListItem>(
        r#"
        SELECT c.id, c.nombre_completo, c.cedula_original, c.cedula_nueva, c.estado,
               c.fecha_solicitud, c.fecha_entrega_estimada, c.tribunal_id,
               t.nombre AS tribunal_nombre, t.provincia AS tribunal_provincia,
               c.created_at
        FROM cedulaciones c
        JOIN tribunales t ON t.id = c.tribunal_id
        ORDER BY c.fecha_solicitud DESC, c.id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn listar_por_tribunal(
    pool: &PgPool,
    tribunal_id: i32,
    limite: i64,
) -> Result<Vec<CedulacionPorTribunal>, sqlx::Error> {
    sqlx::query_as::<_, CedulacionPorTribunal>(
        r#"
        SELECT c.id, c.nombre_completo, c.cedula_original, c.cedula_nueva, c.estado,
               c.fecha_solicitud, c.fecha_entrega_estimada,
               f.numero_factura, f.total, f.estado_pago
        FROM cedulaciones c
        LEFT JOIN LATERAL (
            SELECT numero_factura, total, estado_pago
            FROM facturas
            WHERE cedulacion_id = c.id
            ORDER BY created_at ASC, id ASC
            LIMIT 1
        ) f ON TRUE
        WHERE c.tribunal_id = $1
        ORDER BY c.fecha_solicitud DESC, c.id DESC
        LIMIT $2
        "#,
    )
    .bind(tribunal_id)
    .bind(limite)
    .fetch_all(pool)
    .await
}

/// Conteos por estado de las cedulaciones creadas desde `desde` y lo cobrado por ellas
pub async fn estadisticas(pool: &PgPool, desde: DateTime<Utc>) -> Result<Estadisticas, sqlx::Error> {
    sqlx::query_as::<_, Estadisticas>(
        r#"
        WITH recientes AS (
            SELECT id, estado FROM cedulaciones WHERE created_at >= $1
        )
        SELECT
            (SELECT COUNT(*) FROM recientes) AS total_cedulaciones,
            (SELECT COUNT(*) FROM recientes WHERE estado = 'pendiente') AS pendientes,
            (SELECT COUNT(*) FROM recientes WHERE estado = 'en_proceso') AS en_proceso,
            (SELECT COUNT(*) FROM recientes WHERE estado = 'listo') AS listos,
            (SELECT COUNT(*) FROM recientes WHERE estado = 'entregado') AS entregados,
            (SELECT COUNT(*) FROM recientes WHERE estado = 'cancelado') AS cancelados,
            (
                SELECT COALESCE(SUM(f.total), 0)::NUMERIC(14, 2)
                FROM facturas f
                JOIN recientes r ON r.id = f.cedulacion_id
                WHERE f.estado_pago = 'pagado'
            ) AS ingresos_totales
        "#,
    )
    .bind(desde)
    .fetch_one(pool)
    .await
}
