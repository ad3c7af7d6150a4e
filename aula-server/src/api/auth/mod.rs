//! Authentication Routes

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// Build authentication router
/// - /api/auth/login, /api/auth/register: public (skipped by require_auth)
/// - /api/auth/me: authenticated
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/me", get(handler::me))
}
