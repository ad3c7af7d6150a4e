//! Authentication Handlers
//!
//! Handles login, self-registration and the current-user profile

use axum::{Json, extract::State};
use shared::ErrorCode;
use shared::client::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};
use shared::models::{AuditAction, Role, User};

use crate::audit::AuditLogRequest;
use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::{RepoError, user};
use crate::security_log;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text, validate_password,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
    }
}

/// Login handler
///
/// Unknown email and wrong password return the same error
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            "Email and password are required",
        ));
    }

    let credentials = user::find_credentials(&state.pool, &req.email).await?;

    let account = match credentials {
        Some(c) if verify_password(&req.password, &c.password_hash) => c.user,
        _ => {
            security_log!("WARN", "login_failed", email = req.email.trim().to_string());
            return Err(AppError::invalid_credentials());
        }
    };

    let token = state
        .jwt_service
        .generate_token(&account)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    state
        .audit_service
        .log(
            AuditLogRequest::new(AuditAction::Login, "users", Some(account.id))
                .by_user_id(account.id)
                .detail(format!("Login from {}", account.email)),
        )
        .await;

    tracing::info!(user_id = account.id, email = %account.email, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: user_info(&account),
    }))
}

/// Self-registration, always with the `USER` role
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<UserInfo>> {
    validate_required_text(&req.name, "name", MAX_NAME_LEN)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let password_hash = hash_password(&req.password)?;
    let created = user::create(
        &state.pool,
        user::NewUser {
            name: &req.name,
            email: &req.email,
            password_hash: &password_hash,
            role: Role::User,
            phone: req.phone.as_deref(),
        },
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::EmailExists, msg),
        other => other.into(),
    })?;

    state
        .audit_service
        .log(
            AuditLogRequest::new(AuditAction::Register, "users", Some(created.id))
                .by_user_id(created.id)
                .detail(format!("Registered {}", created.email)),
        )
        .await;

    Ok(Json(user_info(&created)))
}

/// Get current user info
pub async fn me(current_user: CurrentUser) -> Json<UserInfo> {
    Json(UserInfo {
        id: current_user.id,
        name: current_user.name,
        email: current_user.email,
        role: current_user.role,
    })
}
