//! Aula Server - 教室预约管理服务
//!
//! # 架构概述
//!
//! - **预约核心** (`reservations`): 冲突检测 + 预约生命周期 (创建/修改/取消/完成)
//! - **过期清扫** (`sweeper`): 定时将已结束的预约自动完成并释放教室
//! - **通知** (`notify`): 邮件 + WhatsApp 分享链接 (fire-and-forget)
//! - **审计** (`audit`): append-only 操作日志
//! - **认证** (`auth`): JWT + Argon2 + 角色能力表
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! aula-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # JWT 认证、能力策略
//! ├── db/            # SQLite 连接池 + repository
//! ├── audit/         # 审计日志
//! ├── reservations/  # 冲突检测 + 生命周期
//! ├── sweeper.rs     # 过期预约清扫
//! ├── notify/        # 邮件 / WhatsApp
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志、校验、时间、二维码
//! ```

pub mod api;
pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod notify;
pub mod reservations;
pub mod sweeper;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use reservations::{ReservationError, ReservationManager};
pub use sweeper::ExpirySweeper;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境：加载 .env，初始化日志
pub fn setup_environment() -> AppResult<()> {
    let _ = dotenv::dotenv();

    let log_dir = std::env::var("LOG_DIR").ok();
    let json = std::env::var("ENVIRONMENT").is_ok_and(|e| e == "production");
    utils::logger::init_logger("aula_server=info,tower_http=info", json, log_dir.as_deref())
}

pub fn print_banner() {
    println!(
        r#"
    ___           __
   /   | __  __  / /___ _
  / /| |/ / / / / / __ `/
 / ___ / /_/ / / / /_/ /
/_/  |_\__,_/ /_/\__,_/
        room reservations
    "#
    );
}
