pub mod handlers;
pub mod models;

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;

pub fn create_facturas_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/facturas",
            get(handlers::listar_facturas).post(handlers::crear_factura),
        )
        .route(
            "/api/facturas/:id",
            get(handlers::obtener_factura)
                .put(handlers::actualizar_pago)
                .delete(handlers::eliminar_factura),
        )
        .route("/api/facturas/:id/documento", get(handlers::documento_factura))
        .route(
            "/api/facturas/cedulacion/:cedulacion_id",
            get(handlers::factura_de_cedulacion),
        )
}
