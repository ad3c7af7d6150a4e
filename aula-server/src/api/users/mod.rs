//! User API 模块 (管理员)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            put(handler::update)
                .get(handler::get_by_id)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn(require_capability(Capability::ManageUsers)))
}
