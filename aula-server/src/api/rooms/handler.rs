//! Room API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::ErrorCode;
use shared::models::{
    AuditAction, Room, RoomCreate, RoomDetail, RoomOccupancyUpdate, RoomState, RoomUpdate,
    RoomView,
};

use crate::audit::AuditLogRequest;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository as repo;
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult, qr};

const ENTITY: &str = "rooms";

/// Render the room's QR code and store it on the row
async fn refresh_qr(state: &ServerState, room: &mut Room) -> AppResult<()> {
    let data_url = qr::render_data_url(&qr::room_payload(room))?;
    repo::room::set_qr_code(&state.pool, room.id, &data_url).await?;
    room.qr_code = Some(data_url);
    Ok(())
}

/// GET /api/rooms - 获取所有教室
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<RoomView>>> {
    let rooms = repo::room::list(&state.pool).await?;
    Ok(Json(rooms))
}

/// GET /api/rooms/:id - 教室详情 (含设备)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RoomDetail>> {
    let room = repo::room::find_view(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::room_not_found(id))?;
    let resources = repo::resource::list_by_room(&state.pool, id).await?;
    Ok(Json(RoomDetail { room, resources }))
}

/// POST /api/rooms - 创建教室并生成二维码
pub async fn create(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Json(payload): Json<RoomCreate>,
) -> AppResult<Json<Room>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.module, "module", MAX_NAME_LEN)?;

    let mut room = repo::room::create(&state.pool, payload).await?;
    refresh_qr(&state, &mut room).await?;

    state
        .audit_service
        .log(
            AuditLogRequest::new(AuditAction::Create, ENTITY, Some(room.id))
                .by(&current_user)
                .detail(format!("Created room {} ({})", room.name, room.module)),
        )
        .await;

    Ok(Json(room))
}

/// PUT /api/rooms/:id - 更新教室
///
/// 名称或模块变化时重新生成二维码
pub async fn update(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<RoomUpdate>,
) -> AppResult<Json<Room>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.module, "module", MAX_NAME_LEN)?;
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty())
        || payload.module.as_deref().is_some_and(|m| m.trim().is_empty())
    {
        return Err(AppError::validation("name and module cannot be empty"));
    }

    let old = repo::room::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::room_not_found(id))?;

    let mut room = repo::room::update(&state.pool, id, payload).await?;
    if room.name != old.name || room.module != old.module {
        refresh_qr(&state, &mut room).await?;
    }

    state
        .audit_service
        .log(
            AuditLogRequest::new(AuditAction::Update, ENTITY, Some(id))
                .by(&current_user)
                .detail(format!(
                    "Room {} ({}) -> {} ({})",
                    old.name, old.module, room.name, room.module
                )),
        )
        .await;

    Ok(Json(room))
}

/// DELETE /api/rooms/:id - 删除教室
///
/// 存在有效预约时拒绝
pub async fn delete(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let room = repo::room::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::room_not_found(id))?;

    let active = repo::reservation::count_active_for_room(&state.pool, id).await?;
    if active > 0 {
        return Err(AppError::with_message(
            ErrorCode::RoomHasActiveReservations,
            format!("Room {} has {} active reservations", room.name, active),
        )
        .with_detail("room_id", id));
    }

    let deleted = repo::room::delete(&state.pool, id).await?;
    if deleted {
        state
            .audit_service
            .log(
                AuditLogRequest::new(AuditAction::Delete, ENTITY, Some(id))
                    .by(&current_user)
                    .detail(format!("Deleted room {} ({})", room.name, room.module)),
            )
            .await;
    }

    Ok(Json(deleted))
}

/// PATCH /api/rooms/:id/state - 手动设置占用状态
pub async fn set_state(
    State(state): State<ServerState>,
    current_user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<RoomOccupancyUpdate>,
) -> AppResult<Json<RoomView>> {
    let occupant = match payload.state {
        RoomState::Free => None,
        RoomState::Occupied => {
            let user_id = payload.occupied_by.ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::InvalidRoomState,
                    "An occupied room needs an occupant",
                )
            })?;
            repo::user::find_by_id(&state.pool, user_id)
                .await?
                .ok_or_else(|| AppError::user_not_found(user_id))?;
            Some(user_id)
        }
    };

    repo::room::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::room_not_found(id))?;
    repo::room::set_occupancy(&state.pool, id, payload.state, occupant).await?;

    let room = repo::room::find_view(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::room_not_found(id))?;

    state
        .audit_service
        .log(
            AuditLogRequest::new(AuditAction::StateChange, ENTITY, Some(id))
                .by(&current_user)
                .detail(match occupant {
                    Some(user_id) => format!("Room {} marked OCCUPIED by user {}", room.name, user_id),
                    None => format!("Room {} marked FREE", room.name),
                }),
        )
        .await;

    Ok(Json(room))
}
