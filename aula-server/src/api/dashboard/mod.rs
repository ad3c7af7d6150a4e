//! Dashboard API

use axum::{Json, Router, extract::State, middleware, routing::get};
use shared::models::DashboardStats;

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;
use crate::db::repository::dashboard;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/dashboard/stats", get(stats))
        .layer(middleware::from_fn(require_capability(Capability::ViewCatalog)))
}

/// GET /api/dashboard/stats
async fn stats(State(state): State<ServerState>) -> AppResult<Json<DashboardStats>> {
    let stats = dashboard::stats(&state.pool).await?;
    Ok(Json(stats))
}
