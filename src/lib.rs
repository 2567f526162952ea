use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, Router};
use std::sync::Arc;
use tower_http::compression::{predicate::SizeAbove, CompressionLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod domains;
pub mod models;
pub mod monitoring;
pub mod security;
pub mod services;
pub mod state;

use api::common::request_logging_middleware;
use api::create_api_router;
use monitoring::monitoring_router;
use security::{get_cors_layer, security_headers_middleware};
use state::AppState;

pub fn create_app_router(app_state: Arc<AppState>) -> Router {
    let body_limit = (app_state.config.app.max_request_size_mb as usize).saturating_mul(1024 * 1024);
    let cors = get_cors_layer(&app_state.config.app.cors_allowed_origins);

    Router::new()
        // Salud y diagnóstico
        .merge(monitoring_router())
        // API de cedulación y facturación
        .merge(create_api_router())
        .with_state(app_state)
        .layer(axum_middleware::from_fn(request_logging_middleware))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CompressionLayer::new()
                .gzip(true)
                .deflate(true)
                .compress_when(SizeAbove::new(1024)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(security_headers_middleware))
}
