//! Reservation API 模块
//!
//! 所有写操作都委托给 [`crate::reservations::ReservationManager`]。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/cancel", patch(handler::cancel))
        // 完成权限在生命周期管理器内检查 (AdminRequired)
        .route("/{id}/complete", patch(handler::complete))
        .layer(middleware::from_fn(require_capability(Capability::Reserve)))
}
