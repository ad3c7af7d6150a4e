//! Audit Log API 模块 (只读)

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/logs", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/stats", get(handler::stats))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_capability(Capability::ViewLogs)))
}
