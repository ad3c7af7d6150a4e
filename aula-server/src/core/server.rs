//! Server Implementation
//!
//! HTTP 服务器启动和管理

use crate::api::build_app;
use crate::core::{Config, ServerState};
use crate::utils::{AppError, AppResult};

/// HTTP Server
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 初始化状态、启动后台任务并提供 HTTP 服务，直到收到 Ctrl-C
    pub async fn run(&self) -> AppResult<()> {
        let (state, audit_rx) = ServerState::initialize(&self.config).await?;
        let tasks = state.start_background_tasks(audit_rx);

        let app = build_app(state.clone());

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!("Aula server listening on {}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| AppError::internal(format!("HTTP server error: {e}")));

        tasks.shutdown().await;
        state.pool.close().await;

        served
    }
}
