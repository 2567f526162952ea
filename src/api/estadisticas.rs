use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use chrono::{Duration, Utc};
use std::sync::Arc;

use crate::api::common::{ApiResponse, ApiResult};
use crate::db::cedulaciones;
use crate::models::Estadisticas;
use crate::state::AppState;

const VENTANA_DIAS: i64 = 30;

pub fn create_estadisticas_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/estadisticas", get(obtener_estadisticas))
}

/// GET /api/estadisticas
pub async fn obtener_estadisticas(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<ApiResponse<Estadisticas>>> {
    let desde = Utc::now() - Duration::days(VENTANA_DIAS);
    let estadisticas = cedulaciones::estadisticas(&state.db_pool, desde).await?;
    Ok(Json(ApiResponse::data(&headers, estadisticas)))
}
