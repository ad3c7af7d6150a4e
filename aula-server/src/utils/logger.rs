//! Logging Infrastructure
//!
//! Console logging plus optional daily rotating files:
//! - `{log_dir}/app/app.YYYY-MM-DD` - everything except security events
//! - `{log_dir}/security/security.YYYY-MM-DD` - `target: "security"` events

use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::utils::AppError;

/// Initialize the logging system
///
/// `RUST_LOG` overrides `default_filter` when set.
///
/// # Examples
/// ```no_run
/// // Development setup (console only)
/// aula_server::utils::logger::init_logger("aula_server=debug", false, None)?;
/// # Ok::<(), aula_server::AppError>(())
/// ```
pub fn init_logger(
    default_filter: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> Result<(), AppError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let (app_layer, security_layer) = match log_dir {
        Some(dir) => {
            let log_dir = Path::new(dir);
            let app_log_dir = log_dir.join("app");
            let security_log_dir = log_dir.join("security");
            fs::create_dir_all(&app_log_dir)
                .and_then(|_| fs::create_dir_all(&security_log_dir))
                .map_err(|e| AppError::internal(format!("Failed to create log dir: {e}")))?;

            let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
            let app_layer = fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != "security"
                }));

            // Security events are kept apart from app logs
            let security_log =
                RollingFileAppender::new(Rotation::DAILY, security_log_dir, "security");
            let security_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::sync::Mutex::new(security_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == "security"
                }));

            (Some(app_layer), Some(security_layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(app_layer)
        .with(security_layer)
        .try_init()
        .map_err(|e| AppError::internal(format!("Failed to init logger: {e}")))
}
