//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{
    Reservation, ReservationCreate, ReservationOutcome, ReservationUpdate, ReservationView,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::reservation::{self, ReservationFilter};
use crate::utils::{AppError, AppResult};

/// GET /api/reservations - 按教室/用户/日期/状态过滤
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<ReservationFilter>,
) -> AppResult<Json<Vec<ReservationView>>> {
    let reservations = reservation::list(&state.pool, &filter).await?;
    Ok(Json(reservations))
}

/// GET /api/reservations/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationView>> {
    let reservation = reservation::find_view(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::reservation_not_found(id))?;
    Ok(Json(reservation))
}

/// POST /api/reservations - 创建预约 (预约人为当前用户)
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<ReservationCreate>,
) -> AppResult<Json<ReservationOutcome>> {
    let outcome = state.reservations.create(&current_user, payload).await?;
    Ok(Json(outcome))
}

/// PUT /api/reservations/:id - 修改预约
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ReservationUpdate>,
) -> AppResult<Json<Reservation>> {
    let updated = state.reservations.update(id, &current_user, payload).await?;
    Ok(Json(updated))
}

/// PATCH /api/reservations/:id/cancel - 取消预约
pub async fn cancel(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationOutcome>> {
    let outcome = state.reservations.cancel(id, &current_user).await?;
    Ok(Json(outcome))
}

/// PATCH /api/reservations/:id/complete - 完成预约 (管理员)
pub async fn complete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    let completed = state.reservations.complete(id, &current_user).await?;
    Ok(Json(completed))
}
