//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、注册、当前用户
//! - [`rooms`] - 教室管理
//! - [`resources`] - 设备资源管理
//! - [`users`] - 用户管理 (管理员)
//! - [`reservations`] - 预约生命周期
//! - [`damages`] - 损坏报告 (含照片上传)
//! - [`logs`] - 审计日志查询
//! - [`dashboard`] - 仪表盘统计
//! - [`scheduler`] - 手动触发过期清扫
//! - [`uploads`] - 已上传文件的只读访问

pub mod auth;
pub mod damages;
pub mod dashboard;
pub mod health;
pub mod logs;
pub mod reservations;
pub mod resources;
pub mod rooms;
pub mod scheduler;
pub mod uploads;
pub mod users;

use std::time::Duration;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = std::time::Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "http_access",
        "{} {} {} {}ms",
        method,
        uri,
        response.status(),
        started.elapsed().as_millis()
    );

    response
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Public
        .merge(health::router())
        .merge(uploads::router())
        // Auth API - login/register public, /me authenticated
        .merge(auth::router())
        // Catalog and reservations
        .merge(rooms::router())
        .merge(resources::router())
        .merge(reservations::router())
        .merge(damages::router())
        // Administration
        .merge(users::router())
        .merge(logs::router())
        .merge(dashboard::router())
        .merge(scheduler::router())
}

/// Build the fully configured application with middleware and state
///
/// Used by the HTTP server and by the router tests
pub fn build_app(state: ServerState) -> Router {
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_router()
        // JWT 认证中间件 - require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(log_request))
}
