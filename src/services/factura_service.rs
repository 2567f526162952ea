use chrono::{DateTime, Utc};
use shared::BillingConfig;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::api::common::{ApiError, ApiResult};
use crate::db::facturas::NuevaFactura;
use crate::db::{catalogo, cedulaciones, facturas};
use crate::domains::billing::{
    calcular_totales, fecha_vencimiento_por_defecto, numeros_factura_manual, render_factura_html,
    transicion_pago, DocumentoFactura, Impuesto, LineaCobro, LineaDocumento,
};
use crate::models::{
    CedulacionConTribunal, DetalleConServicio, EstadoPago, Factura, FacturaCompleta,
    FacturaConDetalles,
};

/// Números `FAC-<millis>` consecutivos a probar antes de responder 409
const INTENTOS_NUMERO: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServicioSolicitado {
    pub servicio_id: i32,
    pub cantidad: i32,
}

/// Factura emitida a mano sobre una cedulación existente
#[derive(Debug, Clone)]
pub struct FacturaManual {
    pub cedulacion_id: i32,
    pub servicios: Vec<ServicioSolicitado>,
    pub impuesto: Impuesto,
    pub estado_pago: EstadoPago,
    pub metodo_pago: Option<String>,
    pub fecha_vencimiento: Option<DateTime<Utc>>,
    pub fecha_pago: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ActualizacionPago {
    pub estado_pago: EstadoPago,
    pub metodo_pago: Option<String>,
    pub fecha_pago: Option<DateTime<Utc>>,
}

pub struct FacturaService<'a> {
    pool: &'a PgPool,
    billing: &'a BillingConfig,
}

impl<'a> FacturaService<'a> {
    pub fn new(pool: &'a PgPool, billing: &'a BillingConfig) -> Self {
        Self { pool, billing }
    }

    // ========================================================================
    // ESCRITURA
    // ========================================================================

    /// Los precios unitarios salen del catálogo; el cliente solo elige servicios y cantidades
    pub async fn crear(&self, solicitud: FacturaManual) -> ApiResult<FacturaCompleta> {
        let mut tx = self.pool.begin().await?;

        cedulaciones::buscar_cedulacion(&mut *tx, solicitud.cedulacion_id)
            .await?
            .ok_or_else(|| ApiError::no_encontrado("Cedulación no encontrada"))?;

        let ids: Vec<i32> = solicitud
            .servicios
            .iter()
            .map(|s| s.servicio_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let precios: HashMap<i32, _> = catalogo::buscar_servicios(&mut *tx, &ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut lineas = Vec::with_capacity(solicitud.servicios.len());
        for pedido in &solicitud.servicios {
            let servicio = precios.get(&pedido.servicio_id).ok_or_else(|| {
                ApiError::validacion(format!("El servicio {} no existe", pedido.servicio_id))
            })?;
            if !servicio.activo {
                return Err(ApiError::validacion(format!(
                    "El servicio '{}' no está disponible",
                    servicio.nombre
                )));
            }
            lineas.push(LineaCobro {
                servicio_id: servicio.id,
                cantidad: pedido.cantidad,
                precio_unitario: servicio.precio,
            });
        }

        let totales = calcular_totales(&lineas, solicitud.impuesto)?;

        let ahora = Utc::now();
        let pago = transicion_pago(
            EstadoPago::Pendiente,
            None,
            solicitud.estado_pago,
            solicitud.fecha_pago,
            ahora,
        )?;
        let fecha_vencimiento = match solicitud.fecha_vencimiento {
            Some(fecha) => fecha,
            None => fecha_vencimiento_por_defecto(ahora, self.billing.meses_vencimiento)?,
        };

        let mut emitida = None;
        for numero_factura in numeros_factura_manual(ahora, INTENTOS_NUMERO) {
            emitida = facturas::insertar_factura_si_libre(
                &mut *tx,
                &NuevaFactura {
                    cedulacion_id: solicitud.cedulacion_id,
                    numero_factura: &numero_factura,
                    totales: &totales,
                    estado_pago: pago.estado_pago,
                    metodo_pago: solicitud.metodo_pago.as_deref(),
                    fecha_vencimiento,
                    fecha_pago: pago.fecha_pago,
                },
            )
            .await?;
            if emitida.is_some() {
                break;
            }
            warn!(numero_factura = %numero_factura, "Invoice number already taken, retrying");
        }
        let factura = emitida
            .ok_or_else(|| ApiError::Conflicto("El número de factura ya existe".to_string()))?;

        for linea in &totales.lineas {
            facturas::insertar_detalle(&mut *tx, factura.id, linea).await?;
        }

        tx.commit().await?;

        info!(
            factura_id = factura.id,
            cedulacion_id = factura.cedulacion_id,
            numero_factura = %factura.numero_factura,
            lineas = totales.lineas.len(),
            total = %factura.total,
            "Invoice created"
        );

        self.completa(factura.id).await
    }

    pub async fn actualizar_pago(&self, id: i32, cambio: ActualizacionPago) -> ApiResult<FacturaCompleta> {
        let mut tx = self.pool.begin().await?;

        let actual = facturas::buscar_factura_para_actualizar(&mut *tx, id)
            .await?
            .ok_or_else(factura_no_encontrada)?;

        let pago = transicion_pago(
            actual.estado_pago,
            actual.fecha_pago,
            cambio.estado_pago,
            cambio.fecha_pago,
            Utc::now(),
        )?;

        facturas::actualizar_pago(&mut *tx, id, &pago, cambio.metodo_pago.as_deref())
            .await?
            .ok_or_else(factura_no_encontrada)?;

        tx.commit().await?;

        info!(
            factura_id = id,
            anterior = %actual.estado_pago,
            nuevo = %pago.estado_pago,
            "Invoice payment status updated"
        );

        self.completa(id).await
    }

    pub async fn eliminar(&self, id: i32) -> ApiResult<()> {
        if !facturas::eliminar_factura(self.pool, id).await? {
            return Err(factura_no_encontrada());
        }
        info!(factura_id = id, "Invoice deleted");
        Ok(())
    }

    // ========================================================================
    // LECTURA
    // ========================================================================

    pub async fn listar(&self) -> ApiResult<Vec<FacturaCompleta>> {
        let lista = facturas::listar_facturas(self.pool).await?;
        completar(self.pool, lista).await
    }

    pub async fn completa(&self, id: i32) -> ApiResult<FacturaCompleta> {
        let factura = facturas::buscar_factura(self.pool, id)
            .await?
            .ok_or_else(factura_no_encontrada)?;
        una(completar(self.pool, vec![factura]).await?)
    }

    pub async fn de_cedulacion(&self, cedulacion_id: i32) -> ApiResult<FacturaCompleta> {
        let factura = facturas::primera_factura_de_cedulacion(self.pool, cedulacion_id)
            .await?
            .ok_or_else(factura_no_encontrada)?;
        una(completar(self.pool, vec![factura]).await?)
    }

    /// Documento HTML imprimible de la factura
    pub async fn documento(&self, id: i32) -> ApiResult<String> {
        let completa = self.completa(id).await?;
        let lineas: Vec<LineaDocumento> = completa
            .detalles
            .iter()
            .map(|d| LineaDocumento {
                servicio: d.servicio.nombre.clone(),
                tipo_servicio: d.servicio.tipo_servicio.clone(),
                cantidad: d.detalle.cantidad,
                precio_unitario: d.detalle.precio_unitario,
                subtotal: d.detalle.subtotal,
            })
            .collect();

        Ok(render_factura_html(&DocumentoFactura {
            factura: &completa.factura,
            solicitante: &completa.cedulacion.cedulacion,
            tribunal: &completa.cedulacion.tribunal,
            lineas: &lineas,
        }))
    }
}

fn factura_no_encontrada() -> ApiError {
    ApiError::no_encontrado("Factura no encontrada")
}

fn una(mut completas: Vec<FacturaCompleta>) -> ApiResult<FacturaCompleta> {
    completas.pop().ok_or_else(factura_no_encontrada)
}

async fn detalles_por_factura(
    pool: &PgPool,
    lista: &[Factura],
) -> ApiResult<HashMap<i32, Vec<DetalleConServicio>>> {
    let ids: Vec<i32> = lista.iter().map(|f| f.id).collect();
    let mut por_factura: HashMap<i32, Vec<DetalleConServicio>> = HashMap::new();
    for row in facturas::detalles_con_servicio(pool, &ids).await? {
        por_factura
            .entry(row.factura_id)
            .or_default()
            .push(DetalleConServicio::from(row));
    }
    Ok(por_factura)
}

/// Añade a cada factura sus detalles, conservando el orden recibido
pub(crate) async fn agrupar_detalles(
    pool: &PgPool,
    lista: Vec<Factura>,
) -> ApiResult<Vec<FacturaConDetalles>> {
    let mut detalles = detalles_por_factura(pool, &lista).await?;
    Ok(lista
        .into_iter()
        .map(|factura| FacturaConDetalles {
            detalles: detalles.remove(&factura.id).unwrap_or_default(),
            factura,
        })
        .collect())
}

/// Añade a cada factura su cedulación, el tribunal de esta y los detalles
async fn completar(pool: &PgPool, lista: Vec<Factura>) -> ApiResult<Vec<FacturaCompleta>> {
    let cedulacion_ids: Vec<i32> = lista
        .iter()
        .map(|f| f.cedulacion_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let solicitantes: HashMap<i32, _> = cedulaciones::buscar_cedulaciones(pool, &cedulacion_ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let tribunal_ids: Vec<i32> = solicitantes
        .values()
        .map(|c| c.tribunal_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let tribunales: HashMap<i32, _> = catalogo::buscar_tribunales(pool, &tribunal_ids)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let mut detalles = detalles_por_factura(pool, &lista).await?;

    lista
        .into_iter()
        .map(|factura| {
            let cedulacion = solicitantes.get(&factura.cedulacion_id).cloned().ok_or_else(|| {
                ApiError::internal(format!("Cedulación {} missing", factura.cedulacion_id))
            })?;
            let tribunal = tribunales.get(&cedulacion.tribunal_id).cloned().ok_or_else(|| {
                ApiError::internal(format!("Tribunal {} missing", cedulacion.tribunal_id))
            })?;
            Ok(FacturaCompleta {
                detalles: detalles.remove(&factura.id).unwrap_or_default(),
                cedulacion: CedulacionConTribunal {
                    cedulacion,
                    tribunal,
                },
                factura,
            })
        })
        .collect()
}
