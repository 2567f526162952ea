use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::state::AppState;

const SERVICE_NAME: &str = "cedulacion_ws";

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub status: String,
    pub response_time_ms: Option<u64>,
    pub pool_size: u32,
    pub idle_connections: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: String,
    pub timestamp: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub environment: String,
    pub database: DatabaseHealth,
}

/// Health and diagnostic endpoints
pub fn monitoring_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
        .route("/api/test", any(api_test))
}

async fn health_check() -> impl IntoResponse {
    let health = serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": SERVICE_NAME
    });

    (StatusCode::OK, Json(health))
}

async fn detailed_health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let start_time = std::time::Instant::now();

    let database = match shared::database::ping(&state.db_pool).await {
        Ok(ms) => DatabaseHealth {
            status: "healthy".to_string(),
            response_time_ms: Some(ms),
            pool_size: state.db_pool.size(),
            idle_connections: state.db_pool.num_idle(),
            error: None,
        },
        Err(e) => {
            warn!(code = e.error_code(), "Database health check failed: {}", e);
            DatabaseHealth {
                status: "unhealthy".to_string(),
                response_time_ms: None,
                pool_size: state.db_pool.size(),
                idle_connections: state.db_pool.num_idle(),
                error: Some(e.to_string()),
            }
        }
    };

    let overall_status = if database.status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    let health = HealthCheck {
        status: overall_status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        environment: state.config.app.environment.clone(),
        database,
    };

    let status_code = if overall_status == "healthy" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    info!(
        overall_status = %overall_status,
        check_duration_ms = %start_time.elapsed().as_millis(),
        "Health check completed"
    );

    (status_code, Json(health))
}

/// Echo endpoint used to check that the API is reachable
async fn api_test(method: Method) -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "API is working!",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "method": method.as_str()
    }))
}
