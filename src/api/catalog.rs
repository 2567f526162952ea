//! Catálogo público: tribunales activos, servicios facturables y la cola de cada tribunal

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::api::cedulaciones::models::LimiteQuery;
use crate::api::common::{parse_id, ApiError, ApiResponse, ApiResult};
use crate::db::{catalogo, cedulaciones};
use crate::models::{CedulacionPorTribunal, ServicioListItem, TribunalListItem};
use crate::state::AppState;

pub fn create_catalog_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tribunales", get(listar_tribunales))
        .route("/api/tribunales/:id/cedulaciones", get(cedulaciones_por_tribunal))
        .route("/api/servicios", get(listar_servicios))
}

/// GET /api/tribunales
pub async fn listar_tribunales(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<Vec<TribunalListItem>>>> {
    let tribunales = catalogo::listar_tribunales_activos(&state.db_pool).await?;
    Ok(Json(ApiResponse::data(&headers, tribunales)))
}

/// GET /api/servicios
pub async fn listar_servicios(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<Vec<ServicioListItem>>>> {
    let servicios = catalogo::listar_servicios_activos(&state.db_pool).await?;
    Ok(Json(ApiResponse::data(&headers, servicios)))
}

/// GET /api/tribunales/:id/cedulaciones?limite=50
pub async fn cedulaciones_por_tribunal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    params: Result<Query<LimiteQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<CedulacionPorTribunal>>>> {
    let id = parse_id(&id)?;
    let Query(params) = params?;

    catalogo::buscar_tribunal(&state.db_pool, id)
        .await?
        .ok_or_else(|| ApiError::no_encontrado("Tribunal no encontrado"))?;

    let items = cedulaciones::listar_por_tribunal(&state.db_pool, id, params.limite()).await?;
    Ok(Json(ApiResponse::data(&headers, items)))
}
