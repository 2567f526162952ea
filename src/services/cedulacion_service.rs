use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::BillingConfig;
use sqlx::PgPool;
use tracing::{error, info};

use crate::api::common::{ApiError, ApiResult};
use crate::db::facturas::NuevaFactura;
use crate::db::{catalogo, cedulaciones, facturas};
use crate::domains::billing::{
    calcular_totales, fecha_entrega_estimada, fecha_local, fecha_vencimiento_por_defecto,
    numero_factura_cedulacion, Impuesto, LineaCobro,
};
use crate::models::{CedulacionDetalle, EstadoPago, NuevaCedulacion};

use super::factura_service::agrupar_detalles;

#[derive(Debug, Clone, Serialize)]
pub struct CedulacionRegistrada {
    pub cedulacion_id: i32,
    pub numero_factura: String,
    pub fecha_entrega: DateTime<Utc>,
}

pub struct CedulacionService<'a> {
    pool: &'a PgPool,
    billing: &'a BillingConfig,
}

impl<'a> CedulacionService<'a> {
    pub fn new(pool: &'a PgPool, billing: &'a BillingConfig) -> Self {
        Self { pool, billing }
    }

    /// Registra la solicitud y su factura inicial en una sola transacción:
    /// cedulación, factura por el servicio de primera vez y su único detalle.
    pub async fn registrar(&self, nueva: NuevaCedulacion) -> ApiResult<CedulacionRegistrada> {
        let mut tx = self.pool.begin().await?;

        let tribunal = catalogo::buscar_tribunal(&mut *tx, nueva.tribunal_id)
            .await?
            .filter(|t| t.activo)
            .ok_or_else(|| ApiError::no_encontrado("Tribunal no encontrado"))?;

        let ahora = Utc::now();
        let entrega = fecha_entrega_estimada(ahora, self.billing.dias_entrega_estimada)?;

        let cedulacion = cedulaciones::insertar_cedulacion(&mut *tx, &nueva, ahora, entrega).await?;
        info!(
            cedulacion_id = cedulacion.id,
            tribunal_id = tribunal.id,
            "Cedulación inserted"
        );

        let servicio = catalogo::buscar_servicio_activo_por_nombre(
            &mut *tx,
            &self.billing.servicio_cedula_primera_vez,
        )
        .await?
        .ok_or_else(|| {
            error!(
                servicio = %self.billing.servicio_cedula_primera_vez,
                "Catalog service for first-time cédula is missing, rolling back"
            );
            ApiError::internal(format!(
                "Servicio '{}' no encontrado en el catálogo",
                self.billing.servicio_cedula_primera_vez
            ))
        })?;

        let totales = calcular_totales(
            &[LineaCobro {
                servicio_id: servicio.id,
                cantidad: 1,
                precio_unitario: servicio.precio,
            }],
            Impuesto::default(),
        )?;

        let numero_factura = numero_factura_cedulacion(fecha_local(ahora), cedulacion.id);
        let factura = facturas::insertar_factura(
            &mut *tx,
            &NuevaFactura {
                cedulacion_id: cedulacion.id,
                numero_factura: &numero_factura,
                totales: &totales,
                estado_pago: EstadoPago::Pendiente,
                metodo_pago: None,
                fecha_vencimiento: fecha_vencimiento_por_defecto(ahora, self.billing.meses_vencimiento)?,
                fecha_pago: None,
            },
        )
        .await?;

        for linea in &totales.lineas {
            facturas::insertar_detalle(&mut *tx, factura.id, linea).await?;
        }

        tx.commit().await?;

        info!(
            cedulacion_id = cedulacion.id,
            factura_id = factura.id,
            numero_factura = %factura.numero_factura,
            total = %factura.total,
            "Cedulación registered with its invoice"
        );

        Ok(CedulacionRegistrada {
            cedulacion_id: cedulacion.id,
            numero_factura: factura.numero_factura,
            fecha_entrega: entrega,
        })
    }

    /// Cedulación con su tribunal y cada factura con sus detalles
    pub async fn detalle(&self, id: i32) -> ApiResult<CedulacionDetalle> {
        let cedulacion = cedulaciones::buscar_cedulacion(self.pool, id)
            .await?
            .ok_or_else(|| ApiError::no_encontrado("Cedulación no encontrada"))?;

        let tribunal = catalogo::buscar_tribunal(self.pool, cedulacion.tribunal_id)
            .await?
            .ok_or_else(|| ApiError::internal(format!("Tribunal {} missing", cedulacion.tribunal_id)))?;

        let emitidas = facturas::facturas_de_cedulacion(self.pool, id).await?;
        let facturas = agrupar_detalles(self.pool, emitidas).await?;

        Ok(CedulacionDetalle {
            cedulacion,
            tribunal,
            facturas,
        })
    }
}
