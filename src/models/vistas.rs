//! Composiciones de lectura: facturas con sus detalles, cedulaciones con su tribunal

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::{Cedulacion, Factura, FacturaDetalle, Tribunal};

#[derive(Debug, Clone, Serialize)]
pub struct ServicioResumen {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub tipo_servicio: String,
}

/// Detalle unido al servicio facturado, tal como sale de la consulta
#[derive(Debug, Clone, FromRow)]
pub struct DetalleServicioRow {
    pub id: i32,
    pub factura_id: i32,
    pub servicio_id: i32,
    pub cantidad: i32,
    pub precio_unitario: Decimal,
    pub subtotal: Decimal,
    pub servicio_nombre: String,
    pub servicio_descripcion: Option<String>,
    pub servicio_tipo: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetalleConServicio {
    #[serde(flatten)]
    pub detalle: FacturaDetalle,
    pub servicio: ServicioResumen,
}

impl From<DetalleServicioRow> for DetalleConServicio {
    fn from(row: DetalleServicioRow) -> Self {
        Self {
            detalle: FacturaDetalle {
                id: row.id,
                factura_id: row.factura_id,
                servicio_id: row.servicio_id,
                cantidad: row.cantidad,
                precio_unitario: row.precio_unitario,
                subtotal: row.subtotal,
            },
            servicio: ServicioResumen {
                id: row.servicio_id,
                nombre: row.servicio_nombre,
                descripcion: row.servicio_descripcion,
                tipo_servicio: row.servicio_tipo,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FacturaConDetalles {
    #[serde(flatten)]
    pub factura: Factura,
    pub detalles: Vec<DetalleConServicio>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CedulacionConTribunal {
    #[serde(flatten)]
    pub cedulacion: Cedulacion,
    pub tribunal: Tribunal,
}

/// Factura con su solicitante, el tribunal asignado y las líneas cobradas
#[derive(Debug, Clone, Serialize)]
pub struct FacturaCompleta {
    #[serde(flatten)]
    pub factura: Factura,
    pub cedulacion: CedulacionConTribunal,
    pub detalles: Vec<DetalleConServicio>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CedulacionDetalle {
    #[serde(flatten)]
    pub cedulacion: Cedulacion,
    pub tribunal: Tribunal,
    pub facturas: Vec<FacturaConDetalles>,
}

/// Resumen de los últimos 30 días
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Estadisticas {
    pub total_cedulaciones: i64,
    pub pendientes: i64,
    pub en_proceso: i64,
    pub listos: i64,
    pub entregados: i64,
    pub cancelados: i64,
    pub ingresos_totales: Decimal,
}
