//! Damage Report API 模块

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get},
};

use crate::auth::{Capability, require_capability};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/damages", routes())
}

fn routes() -> Router<ServerState> {
    // 上传大小在 handler 内按 Config::max_upload_bytes 逐块检查
    let report_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(require_capability(
            Capability::ReportDamage,
        )));

    let admin_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_capability(
            Capability::DeleteDamageReports,
        )));

    report_routes.merge(admin_routes)
}
