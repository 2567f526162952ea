//! HTTP API: catálogo, cedulaciones, facturación y estadísticas

pub mod catalog;
pub mod cedulaciones;
pub mod common;
pub mod estadisticas;
pub mod facturas;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(catalog::create_catalog_router())
        .merge(cedulaciones::create_cedulaciones_router())
        .merge(facturas::create_facturas_router())
        .merge(estadisticas::create_estadisticas_router())
}
