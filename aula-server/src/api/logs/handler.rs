//! Audit Log API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{AuditEntry, AuditQuery, AuditStats};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// GET /api/logs - 按用户/实体/动作/日期过滤
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<Vec<AuditEntry>>> {
    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Err(AppError::validation("'from' must not be after 'to'"));
    }
    let entries = state.audit_service.query(&query).await?;
    Ok(Json(entries))
}

/// GET /api/logs/stats
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<AuditStats>> {
    let stats = state.audit_service.stats().await?;
    Ok(Json(stats))
}

/// GET /api/logs/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AuditEntry>> {
    let entry = state
        .audit_service
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Audit entry {}", id)))?;
    Ok(Json(entry))
}
