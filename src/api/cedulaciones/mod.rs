pub mod handlers;
pub mod models;

use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::state::AppState;

pub fn create_cedulaciones_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/cedulaciones",
            get(handlers::listar_cedulaciones).post(handlers::crear_cedulacion),
        )
        .route("/api/cedulaciones/:id", get(handlers::obtener_cedulacion))
        .route("/api/cedulaciones/:id/estado", put(handlers::actualizar_estado))
}
