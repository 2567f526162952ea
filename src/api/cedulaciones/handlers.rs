use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::models::{ActualizarEstadoRequest, CrearCedulacionRequest};
use crate::api::common::{parse_id, ApiError, ApiResponse, ApiResult, Paginacion};
use crate::db::cedulaciones;
use crate::models::{Cedulacion, CedulacionDetalle, CedulacionListItem};
use crate::services::{CedulacionRegistrada, CedulacionService};
use crate::state::AppState;

/// POST /api/cedulaciones
///
/// Registra la solicitud, su factura y el detalle del servicio de primera vez.
pub async fn crear_cedulacion(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<CrearCedulacionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CedulacionRegistrada>>)> {
    let Json(request) = payload?;
    let nueva = request.into_nueva(Utc::now())?;

    info!(tribunal_id = nueva.tribunal_id, "Creating cedulación request");

    let registrada = CedulacionService::new(&state.db_pool, &state.config.billing)
        .registrar(nueva)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
        &headers,
            "Solicitud de cedulación creada exitosamente",
            registrada,
        )),
    ))
}

/// GET /api/cedulaciones?limit=50&offset=0
pub async fn listar_cedulaciones(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    params: Result<Query<Paginacion>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<CedulacionListItem>>>> {
    let Query(params) = params?;
    let items = cedulaciones::listar_cedulaciones(&state.db_pool, params.limit(), params.offset()).await?;
    Ok(Json(ApiResponse::data(&headers, items)))
}

/// GET /api/cedulaciones/:id
pub async fn obtener_cedulacion(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<CedulacionDetalle>>> {
    let id = parse_id(&id)?;
    let detalle = CedulacionService::new(&state.db_pool, &state.config.billing)
        .detalle(id)
        .await?;
    Ok(Json(ApiResponse::data(&headers, detalle)))
}

/// PUT /api/cedulaciones/:id/estado
pub async fn actualizar_estado(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<ActualizarEstadoRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Cedulacion>>> {
    let id = parse_id(&id)?;
    let Json(request) = payload?;
    let (estado, cedula_nueva) = request.into_parts()?;

    let cedulacion = cedulaciones::actualizar_estado(&state.db_pool, id, estado, cedula_nueva.as_deref())
        .await?
        .ok_or_else(|| ApiError::no_encontrado("Cedulación no encontrada"))?;

    info!(cedulacion_id = id, estado = %estado, "Cedulación state updated");

    Ok(Json(ApiResponse::with_message(
        &headers,
        "Estado actualizado exitosamente",
        cedulacion,
    )))
}
