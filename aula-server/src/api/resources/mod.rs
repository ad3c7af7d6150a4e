//! Resource API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/resources", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_capability(Capability::ViewCatalog)));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/state", patch(handler::change_state))
        .layer(middleware::from_fn(require_capability(
            Capability::ManageResources,
        )));

    read_routes.merge(manage_routes)
}
