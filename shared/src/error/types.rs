//! 应用错误与错误响应体

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// 应用错误
///
/// 错误码决定 HTTP 状态，`message` 原样返回给调用方，
/// `details` 携带 id、字段名等上下文。
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// 使用错误码的默认消息
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// 追加一条上下文 (同名 key 覆盖)
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ---- 通用 ----

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// 无专用错误码的实体 (例如审计条目)
    pub fn not_found(what: impl Into<String>) -> Self {
        let what = what.into();
        Self::with_message(ErrorCode::NotFound, format!("{what} not found")).with_detail("resource", what)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    // ---- 认证 / 权限 ----

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    // ---- 领域实体 ----

    pub fn room_not_found(id: i64) -> Self {
        Self::new(ErrorCode::RoomNotFound).with_detail("id", id)
    }

    pub fn reservation_not_found(id: i64) -> Self {
        Self::new(ErrorCode::ReservationNotFound).with_detail("id", id)
    }

    pub fn resource_not_found(id: i64) -> Self {
        Self::new(ErrorCode::ResourceNotFound).with_detail("id", id)
    }

    pub fn user_not_found(id: i64) -> Self {
        Self::new(ErrorCode::UserNotFound).with_detail("id", id)
    }
}

/// 错误响应体
///
/// ```json
/// { "code": 4002, "message": "...", "details": { "room_id": 3 } }
/// ```
///
/// 成功响应直接返回数据本身，不经过此结构。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl ApiResponse {
    pub fn error(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }

    /// 客户端侧：把响应体还原成 AppError (未知错误码按内部错误处理)
    pub fn into_error(self) -> AppError {
        let code = ErrorCode::try_from(self.code).unwrap_or(ErrorCode::InternalError);
        AppError {
            code,
            message: self.message,
            details: self.details,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.http_status();

        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "Request failed with system error");
        }

        (status, axum::Json(ApiResponse::error(&self))).into_response()
    }
}
