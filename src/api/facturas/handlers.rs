use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::Html,
    Json,
};
use std::sync::Arc;
use tracing::info;

use super::models::{ActualizarPagoRequest, CrearFacturaRequest, FacturaEliminada};
use crate::api::common::{parse_id, ApiResponse, ApiResult};
use crate::models::FacturaCompleta;
use crate::services::FacturaService;
use crate::state::AppState;

fn service(state: &AppState) -> FacturaService<'_> {
    FacturaService::new(&state.db_pool, &state.config.billing)
}

/// GET /api/facturas
pub async fn listar_facturas(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<Vec<FacturaCompleta>>>> {
    let facturas = service(&state).listar().await?;
    Ok(Json(ApiResponse::data(&headers, facturas)))
}

/// POST /api/facturas
pub async fn crear_factura(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CrearFacturaRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<FacturaCompleta>>)> {
    let Json(request) = payload?;
    let solicitud = request.into_factura()?;

    info!(
        cedulacion_id = solicitud.cedulacion_id,
        lineas = solicitud.servicios.len(),
        "Creating invoice"
    );

    let factura = service(&state).crear(solicitud).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(&headers, "Factura creada exitosamente", factura)),
    ))
}

/// GET /api/facturas/:id
pub async fn obtener_factura(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<FacturaCompleta>>> {
    let id = parse_id(&id)?;
    let factura = service(&state).completa(id).await?;
    Ok(Json(ApiResponse::data(&headers, factura)))
}

/// GET /api/facturas/cedulacion/:cedulacion_id
pub async fn factura_de_cedulacion(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(cedulacion_id): Path<String>,
) -> ApiResult<Json<ApiResponse<FacturaCompleta>>> {
    let cedulacion_id = parse_id(&cedulacion_id)?;
    let factura = service(&state).de_cedulacion(cedulacion_id).await?;
    Ok(Json(ApiResponse::data(&headers, factura)))
}

/// PUT /api/facturas/:id
pub async fn actualizar_pago(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<ActualizarPagoRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<FacturaCompleta>>> {
    let id = parse_id(&id)?;
    let Json(request) = payload?;
    let cambio = request.into_actualizacion()?;

    let factura = service(&state).actualizar_pago(id, cambio).await?;
    Ok(Json(ApiResponse::with_message(
        &headers,
        "Estado de pago actualizado exitosamente",
        factura,
    )))
}

/// DELETE /api/facturas/:id
pub async fn eliminar_factura(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<FacturaEliminada>>> {
    let id = parse_id(&id)?;
    service(&state).eliminar(id).await?;
    Ok(Json(ApiResponse::with_message(
        &headers,
        "Factura eliminada exitosamente",
        FacturaEliminada { id },
    )))
}

/// GET /api/facturas/:id/documento
pub async fn documento_factura(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Html<String>> {
    let id = parse_id(&id)?;
    let html = service(&state).documento(id).await?;
    Ok(Html(html))
}
