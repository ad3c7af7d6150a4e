use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::utils::AppError;

/// 默认清扫间隔 (秒)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 120;

/// 默认上传大小上限 (5 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、上传文件) |
/// | DATABASE_PATH | {WORK_DIR}/aula.db | SQLite 数据库文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | SWEEP_INTERVAL_SECS | 120 | 过期预约清扫间隔 (秒) |
/// | MAX_UPLOAD_BYTES | 5242880 | 损坏报告照片大小上限 |
/// | MAIL_FROM | (空) | 发件地址，设置后通过 SES 发送邮件 |
/// | WHATSAPP_PHONE | (空) | 分享链接的目标号码 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | AUDIT_BUFFER | 1024 | 审计日志通道容量 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/aula HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、上传文件等
    pub work_dir: String,
    /// SQLite 数据库路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 过期清扫间隔 (秒)
    pub sweep_interval_secs: u64,
    /// 上传文件大小上限 (字节)
    pub max_upload_bytes: usize,
    /// 邮件发件地址；为空时邮件只写日志
    pub mail_from: Option<String>,
    /// WhatsApp 目标号码；为空时生成通用分享链接
    pub whatsapp_phone: Option<String>,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 审计日志通道容量
    pub audit_buffer: usize,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| format!("{}/aula.db", work_dir.trim_end_matches('/')));

        Self {
            work_dir,
            database_path,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            mail_from: std::env::var("MAIL_FROM").ok().filter(|v| !v.trim().is_empty()),
            whatsapp_phone: std::env::var("WHATSAPP_PHONE")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            audit_buffer: std::env::var("AUDIT_BUFFER")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1024),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = format!("{}/aula.db", config.work_dir.trim_end_matches('/'));
        config.http_port = http_port;
        config.mail_from = None;
        config
    }

    /// 启动前校验
    ///
    /// 生产环境必须显式设置 JWT_SECRET
    pub fn validate(&self) -> Result<(), AppError> {
        if self.is_production() && std::env::var("JWT_SECRET").is_err() {
            return Err(AppError::with_message(
                shared::ErrorCode::ConfigError,
                "JWT_SECRET must be set in production",
            ));
        }
        if self.jwt.secret.len() < 32 {
            return Err(AppError::with_message(
                shared::ErrorCode::ConfigError,
                "JWT_SECRET must be at least 32 characters",
            ));
        }
        Ok(())
    }

    /// 上传文件根目录
    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("uploads")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
