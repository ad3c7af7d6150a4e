//! Room Repository

use super::{RepoError, RepoResult, reservation};
use shared::models::{Room, RoomCreate, RoomState, RoomUpdate, RoomView};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const ROOM_COLUMNS: &str =
    "id, name, module, state, occupied_by, qr_code, created_at, updated_at";

const ROOM_VIEW_SELECT: &str = "SELECT r.id, r.name, r.module, r.state, r.occupied_by, u.name AS occupant_name, u.email AS occupant_email, r.qr_code, r.created_at, r.updated_at FROM rooms r LEFT JOIN users u ON u.id = r.occupied_by";

pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<RoomView>> {
    let rooms = sqlx::query_as::<_, RoomView>(&format!(
        "{ROOM_VIEW_SELECT} ORDER BY r.module, r.name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rooms)
}

pub async fn find_view(pool: &SqlitePool, id: i64) -> RepoResult<Option<RoomView>> {
    let room = sqlx::query_as::<_, RoomView>(&format!("{ROOM_VIEW_SELECT} WHERE r.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(room)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Room>>
where
    E: SqliteExecutor<'e>,
{
    let room = sqlx::query_as::<_, Room>(&format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(room)
}

pub async fn create(pool: &SqlitePool, data: RoomCreate) -> RepoResult<Room> {
    let now = shared::util::now_millis();
    let room = sqlx::query_as::<_, Room>(&format!(
        "INSERT INTO rooms (name, module, state, created_at, updated_at) VALUES (?1, ?2, 'FREE', ?3, ?3) RETURNING {ROOM_COLUMNS}"
    ))
    .bind(data.name.trim())
    .bind(data.module.trim())
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(room)
}

pub async fn update(pool: &SqlitePool, id: i64, data: RoomUpdate) -> RepoResult<Room> {
    let now = shared::util::now_millis();
    sqlx::query_as::<_, Room>(&format!(
        "UPDATE rooms SET name = COALESCE(?1, name), module = COALESCE(?2, module), updated_at = ?3 WHERE id = ?4 RETURNING {ROOM_COLUMNS}"
    ))
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.module.as_deref().map(str::trim))
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Room {id} not found")))
}

pub async fn set_qr_code(pool: &SqlitePool, id: i64, qr_code: &str) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE rooms SET qr_code = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(qr_code)
        .bind(shared::util::now_millis())
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    if rows == 0 {
        return Err(RepoError::NotFound(format!("Room {id} not found")));
    }
    Ok(())
}

/// Set occupancy directly. `occupied_by` is stored only for `Occupied`.
pub async fn set_occupancy<'e, E>(
    executor: E,
    id: i64,
    state: RoomState,
    occupied_by: Option<i64>,
) -> RepoResult<()>
where
    E: SqliteExecutor<'e>,
{
    let occupant = match state {
        RoomState::Free => None,
        RoomState::Occupied => occupied_by,
    };
    let rows = sqlx::query(
        "UPDATE rooms SET state = ?1, occupied_by = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(state)
    .bind(occupant)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(executor)
    .await?
    .rows_affected();
    if rows == 0 {
        return Err(RepoError::NotFound(format!("Room {id} not found")));
    }
    Ok(())
}

pub async fn mark_occupied<'e, E>(executor: E, id: i64, user_id: i64) -> RepoResult<()>
where
    E: SqliteExecutor<'e>,
{
    set_occupancy(executor, id, RoomState::Occupied, Some(user_id)).await
}

pub async fn mark_free<'e, E>(executor: E, id: i64) -> RepoResult<()>
where
    E: SqliteExecutor<'e>,
{
    set_occupancy(executor, id, RoomState::Free, None).await
}

/// Point occupancy at the owner of the earliest active reservation left in
/// the room, or free it when none remain. Returns the new occupant.
pub async fn sync_occupancy(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<i64>> {
    let owner = reservation::next_active_owner(&mut *conn, id).await?;
    match owner {
        Some(user_id) => mark_occupied(&mut *conn, id, user_id).await?,
        None => mark_free(&mut *conn, id).await?,
    }
    Ok(owner)
}

/// Rooms a user occupies or holds an active reservation in
pub async fn held_by_user<'e, E>(executor: E, user_id: i64) -> RepoResult<Vec<i64>>
where
    E: SqliteExecutor<'e>,
{
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM rooms WHERE occupied_by = ?1 UNION SELECT room_id FROM reservations WHERE user_id = ?1 AND status = 'ACTIVE'",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(ids)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM rooms WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}
