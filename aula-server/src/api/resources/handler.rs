//! Resource API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::ErrorCode;
use shared::models::{
    AuditAction, Resource, ResourceCreate, ResourceStateChange, ResourceUpdate, ResourceView,
};

use crate::audit::AuditLogRequest;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{self as repo, RepoError};
use crate::utils::validation::{
    MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

const ENTITY: &str = "resources";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub room_id: Option<i64>,
}

fn map_repo_error(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::ResourceCodeExists, msg),
        RepoError::NotFound(msg) => AppError::with_message(ErrorCode::ResourceNotFound, msg),
        other => other.into(),
    }
}

async fn ensure_room(state: &ServerState, room_id: i64) -> AppResult<()> {
    repo::room::find_by_id(&state.pool, room_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::room_not_found(room_id))
}

/// GET /api/resources - 获取设备列表 (可按教室过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<ResourceView>>> {
    let mut resources = repo::resource::list(&state.pool).await?;
    if let Some(room_id) = query.room_id {
        resources.retain(|r| r.room_id == room_id);
    }
    Ok(Json(resources))
}

/// GET /api/resources/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ResourceView>> {
    let resource = repo::resource::find_view(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::resource_not_found(id))?;
    Ok(Json(resource))
}

/// POST /api/resources - 登记设备
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<ResourceCreate>,
) -> AppResult<Json<Resource>> {
    validate_required_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.code, "code", MAX_SHORT_TEXT_LEN)?;
    ensure_room(&state, payload.room_id).await?;

    let resource = repo::resource::create(&state.pool, payload)
        .await
        .map_err(map_repo_error)?;

    state
        .audit_service
        .log(
            AuditLogRequest::new(AuditAction::Create, ENTITY, Some(resource.id))
                .by(&current_user)
                .detail(format!(
                    "Registered {} {} in room {}",
                    resource.category, resource.code, resource.room_id
                )),
        )
        .await;

    Ok(Json(resource))
}

/// PUT /api/resources/:id
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ResourceUpdate>,
) -> AppResult<Json<Resource>> {
    validate_optional_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.code, "code", MAX_SHORT_TEXT_LEN)?;
    if payload.code.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(AppError::validation("code cannot be empty"));
    }
    if let Some(room_id) = payload.room_id {
        ensure_room(&state, room_id).await?;
    }

    let resource = repo::resource::update(&state.pool, id, payload)
        .await
        .map_err(map_repo_error)?;

    state
        .audit_service
        .log(
            AuditLogRequest::new(AuditAction::Update, ENTITY, Some(id))
                .by(&current_user)
                .detail(format!("Updated {} {}", resource.category, resource.code)),
        )
        .await;

    Ok(Json(resource))
}

/// DELETE /api/resources/:id
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let resource = repo::resource::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::resource_not_found(id))?;

    let deleted = repo::resource::delete(&state.pool, id).await?;
    if deleted {
        state
            .audit_service
            .log(
                AuditLogRequest::new(AuditAction::Delete, ENTITY, Some(id))
                    .by(&current_user)
                    .detail(format!("Deleted {} {}", resource.category, resource.code)),
            )
            .await;
    }

    Ok(Json(deleted))
}

/// PATCH /api/resources/:id/state - 变更设备状态 (借出时可移动到目标教室)
pub async fn change_state(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ResourceStateChange>,
) -> AppResult<Json<Resource>> {
    if let Some(room_id) = payload.destination_room_id {
        ensure_room(&state, room_id).await?;
    }

    let resource =
        repo::resource::change_state(&state.pool, id, payload.state, payload.destination_room_id)
            .await
            .map_err(|e| match e {
                RepoError::Validation(msg) => {
                    AppError::with_message(ErrorCode::InvalidResourceState, msg)
                }
                other => map_repo_error(other),
            })?;

    state
        .audit_service
        .log(
            AuditLogRequest::new(AuditAction::StateChange, ENTITY, Some(id))
                .by(&current_user)
                .detail(format!(
                    "{} {} -> {:?} (room {})",
                    resource.category, resource.code, resource.state, resource.room_id
                )),
        )
        .await;

    Ok(Json(resource))
}
