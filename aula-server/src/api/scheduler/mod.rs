//! Scheduler API
//!
//! 手动触发一次过期清扫，与定时清扫共用同一把互斥锁。

use axum::{Json, Router, extract::State, middleware, routing::post};
use shared::client::SweepReport;

use crate::auth::{Capability, CurrentUser, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/scheduler/release-rooms", post(release_rooms))
        .layer(middleware::from_fn(require_capability(Capability::RunSweep)))
}

/// POST /api/scheduler/release-rooms
async fn release_rooms(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> Json<SweepReport> {
    tracing::info!(user_id = current_user.id, "Manual expiry sweep requested");
    let completed = state.sweeper.sweep_once().await;
    Json(SweepReport { completed })
}
