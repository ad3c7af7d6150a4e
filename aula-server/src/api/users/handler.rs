//! User API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::ErrorCode;
use shared::models::{AuditAction, User, UserCreate, UserUpdate};

use crate::audit::AuditLogRequest;
use crate::auth::{CurrentUser, hash_password};
use crate::core::ServerState;
use crate::db::repository::{self as repo, RepoError};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text, validate_password,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

const ENTITY: &str = "users";

fn map_repo_error(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::EmailExists, msg),
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::UserNotFound, msg),
        other => other.into(),
    }
}

/// GET /api/users
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    let users = repo::user::list(&state.pool).await?;
    Ok(Json(users))
}

/// GET /api/users/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    let user = repo::user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::user_not_found(id))?;
    Ok(Json(user))
}

/// POST /api/users - 创建账号 (可指定角色)
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<User>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let password_hash = hash_password(&payload.password)?;
    let user = repo::user::create(
        &state.pool,
        repo::user::NewUser {
            name: &payload.name,
            email: &payload.email,
            password_hash: &password_hash,
            role: payload.role.unwrap_or_default(),
            phone: payload.phone.as_deref(),
        },
    )
    .await
    .map_err(map_repo_error)?;

    state
        .audit_service
        .log(
            AuditLogRequest::new(AuditAction::Create, ENTITY, Some(user.id))
                .by(&current_user)
                .detail(format!("Created {} account {}", user.role, user.email)),
        )
        .await;

    Ok(Json(user))
}

/// PUT /api/users/:id - 部分更新，新密码会重新哈希
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    if let Some(password) = &payload.password {
        validate_password(password)?;
    }
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let password_hash = payload.password.as_deref().map(hash_password).transpose()?;

    let user = repo::user::update(
        &state.pool,
        id,
        repo::user::UserChanges {
            name: payload.name.as_deref(),
            email: payload.email.as_deref(),
            password_hash: password_hash.as_deref(),
            role: payload.role,
            phone: payload.phone.as_deref(),
        },
    )
    .await
    .map_err(map_repo_error)?;

    let mut changed: Vec<&str> = Vec::new();
    if payload.name.is_some() {
        changed.push("name");
    }
    if payload.email.is_some() {
        changed.push("email");
    }
    if payload.password.is_some() {
        changed.push("password");
    }
    if payload.role.is_some() {
        changed.push("role");
    }
    if payload.phone.is_some() {
        changed.push("phone");
    }

    state
        .audit_service
        .log(
            AuditLogRequest::new(AuditAction::Update, ENTITY, Some(id))
                .by(&current_user)
                .detail(format!("Updated {}: {}", user.email, changed.join(", "))),
        )
        .await;

    Ok(Json(user))
}

/// DELETE /api/users/:id
///
/// 管理员不能删除自己的账号
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if id == current_user.id {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }

    let user = repo::user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::user_not_found(id))?;

    let deleted = state.reservations.remove_user(id).await?;
    if deleted {
        state
            .audit_service
            .log(
                AuditLogRequest::new(AuditAction::Delete, ENTITY, Some(id))
                    .by(&current_user)
                    .detail(format!("Deleted account {}", user.email)),
            )
            .await;
    }

    Ok(Json(deleted))
}
