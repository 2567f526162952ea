use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::domains::billing::{CambioPago, LineaCalculada, Totales};
use crate::models::{DetalleServicioRow, EstadoPago, Factura, FacturaDetalle};

const COLUMNAS: &str = r#"
    id, cedulacion_id, numero_factura, subtotal, impuestos, total, estado_pago,
    metodo_pago, fecha_vencimiento, fecha_pago, created_at, updated_at
"#;

/// Cabecera de factura lista para insertar
#[derive(Debug, Clone)]
pub struct NuevaFactura<'a> {
    pub cedulacion_id: i32,
    pub numero_factura: &'a str,
    pub totales: &'a Totales,
    pub estado_pago: EstadoPago,
    pub metodo_pago: Option<&'a str>,
    pub fecha_vencimiento: DateTime<Utc>,
    pub fecha_pago: Option<DateTime<Utc>>,
}

// ============================================================================
// ESCRITURA
// ============================================================================

const INSERTAR: &str = r#"
    INSERT INTO facturas (
        cedulacion_id, numero_factura, subtotal, impuestos, total,
        estado_pago, metodo_pago, fecha_vencimiento, fecha_pago
    ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

fn enlazar<'q>(
    query: &'q str,
    nueva: &'q NuevaFactura<'q>,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Factura, sqlx::postgres::PgArguments> {
    sqlx::query_as::<_, Factura>(query)
        .bind(nueva.cedulacion_id)
        .bind(nueva.numero_factura)
        .bind(nueva.totales.subtotal)
        .bind(nueva.totales.impuestos)
        .bind(nueva.totales.total)
        .bind(nueva.estado_pago.as_str())
        .bind(nueva.metodo_pago)
        .bind(nueva.fecha_vencimiento)
        .bind(nueva.fecha_pago)
}

pub async fn insertar_factura<'e, E>(executor: E, nueva: &NuevaFactura<'_>) -> Result<Factura, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!("{INSERTAR} RETURNING {COLUMNAS}");
    enlazar(&query, nueva).fetch_one(executor).await
}

/// Igual que [`insertar_factura`], pero devuelve `None` si el número ya está en uso
pub async fn insertar_factura_si_libre<'e, E>(
    executor: E,
    nueva: &NuevaFactura<'_>,
) -> Result<Option<Factura>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!("{INSERTAR} ON CONFLICT (numero_factura) DO NOTHING RETURNING {COLUMNAS}");
    enlazar(&query, nueva).fetch_optional(executor).await
}

pub async fn insertar_detalle<'e, E>(
    executor: E,
    factura_id: i32,
    linea: &LineaCalculada,
) -> Result<FacturaDetalle, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, FacturaDetalle>(
        r#"
        INSERT INTO factura_detalles (factura_id, servicio_id, cantidad, precio_unitario, subtotal)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, factura_id, servicio_id, cantidad, precio_unitario, subtotal
        "#,
    )
    .bind(factura_id)
    .bind(linea.servicio_id)
    .bind(linea.cantidad)
    .bind(linea.precio_unitario)
    .bind(linea.subtotal)
    .fetch_one(executor)
    .await
}

pub async fn actualizar_pago<'e, E>(
    executor: E,
    id: i32,
    cambio: &CambioPago,
    metodo_pago: Option<&str>,
) -> Result<Option<Factura>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        r#"
        UPDATE facturas
        SET estado_pago = $2,
            fecha_pago = $3,
            metodo_pago = COALESCE($4, metodo_pago),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNAS}
        "#
    );

    sqlx::query_as::<_, Factura>(&query)
        .bind(id)
        .bind(cambio.estado_pago.as_str())
        .bind(cambio.fecha_pago)
        .bind(metodo_pago)
        .fetch_optional(executor)
        .await
}

/// Los detalles se eliminan en cascada
pub async fn eliminar_factura(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM facturas WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// LECTURA
// ============================================================================

/// Bloquea la fila hasta el fin de la transacción
pub async fn buscar_factura_para_actualizar<'e, E>(
    executor: E,
    id: i32,
) -> Result<Option<Factura>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let query = format!("SELECT {COLUMNAS} FROM facturas WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Factura>(&query)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn buscar_factura(pool: &PgPool, id: i32) -> Result<Option<Factura>, sqlx::Error> {
    let query = format!("SELECT {COLUMNAS} FROM facturas WHERE id = $1");
    sqlx::query_as::<_, Factura>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn primera_factura_de_cedulacion(
    pool: &PgPool,
    cedulacion_id: i32,
) -> Result<Option<Factura>, sqlx::Error> {
    let query = format!(
        "SELECT {COLUMNAS} FROM facturas WHERE cedulacion_id = $1 ORDER BY created_at ASC, id ASC LIMIT 1"
    );
    sqlx::query_as::<_, Factura>(&query)
        .bind(cedulacion_id)
        .fetch_optional(pool)
        .await
}

pub async fn facturas_de_cedulacion(
    pool: &PgPool,
    cedulacion_id: i32,
) -> Result<Vec<Factura>, sqlx::Error> {
    let query = format!(
        "SELECT {COLUMNAS} FROM facturas WHERE cedulacion_id = $1 ORDER BY created_at ASC, id ASC"
    );
    sqlx::query_as::<_, Factura>(&query)
        .bind(cedulacion_id)
        .fetch_all(pool)
        .await
}

pub async fn listar_facturas(pool: &PgPool) -> Result<Vec<Factura>, sqlx::Error> {
    let query = format!("SELECT {COLUMNAS} FROM facturas ORDER BY created_at DESC, id DESC");
    sqlx::query_as::<_, Factura>(&query).fetch_all(pool).await
}

/// Detalles de varias facturas con el servicio cobrado, en orden de inserción
pub async fn detalles_con_servicio(
    pool: &PgPool,
    factura_ids: &[i32],
) -> Result<Vec<DetalleServicioRow>, sqlx::Error> {
    if factura_ids.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_as::<_, DetalleServicioRow>(
        r#"
        SELECT d.id, d.factura_id, d.servicio_id, d.cantidad, d.precio_unitario, d.subtotal,
               s.nombre AS servicio_nombre, s.descripcion AS servicio_descripcion,
               s.tipo_servicio AS servicio_tipo
        FROM factura_detalles d
        JOIN servicios s ON s.id = d.servicio_id
        WHERE d.factura_id = ANY($1)
        ORDER BY d.factura_id ASC, d.id ASC
        "#,
    )
    .bind(factura_ids)
    .fetch_all(pool)
    .await
}
