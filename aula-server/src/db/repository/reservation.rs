//! Reservation Repository
//!
//! Dates are stored as `YYYY-MM-DD` and times as `HH:MM:SS`, so plain string
//! comparison in SQL orders them chronologically.

use super::RepoResult;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use shared::models::{Reservation, ReservationStatus, ReservationView};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

const RESERVATION_COLUMNS: &str =
    "id, user_id, room_id, date, start_time, end_time, whatsapp_group, status, created_at, updated_at";

const RESERVATION_VIEW_SELECT: &str = "SELECT v.id, v.user_id, u.name AS user_name, u.email AS user_email, v.room_id, r.name AS room_name, r.module AS room_module, v.date, v.start_time, v.end_time, v.whatsapp_group, v.status, v.created_at, v.updated_at FROM reservations v JOIN users u ON u.id = v.user_id JOIN rooms r ON r.id = v.room_id";

/// List filters (query string of `GET /api/reservations`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationFilter {
    pub user_id: Option<i64>,
    pub room_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
}

/// Slot of a reservation about to be written
#[derive(Debug, Clone)]
pub struct Slot {
    pub room_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

pub async fn list(pool: &SqlitePool, filter: &ReservationFilter) -> RepoResult<Vec<ReservationView>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(RESERVATION_VIEW_SELECT);
    qb.push(" WHERE 1 = 1");
    if let Some(user_id) = filter.user_id {
        qb.push(" AND v.user_id = ").push_bind(user_id);
    }
    if let Some(room_id) = filter.room_id {
        qb.push(" AND v.room_id = ").push_bind(room_id);
    }
    if let Some(date) = filter.date {
        qb.push(" AND v.date = ").push_bind(date);
    }
    if let Some(status) = filter.status {
        qb.push(" AND v.status = ").push_bind(status);
    }
    qb.push(" ORDER BY v.date DESC, v.start_time DESC");

    let rows = qb.build_query_as::<ReservationView>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn recent(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<ReservationView>> {
    let rows = sqlx::query_as::<_, ReservationView>(&format!(
        "{RESERVATION_VIEW_SELECT} ORDER BY v.created_at DESC, v.id DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Reservation>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

pub async fn find_view(pool: &SqlitePool, id: i64) -> RepoResult<Option<ReservationView>> {
    let row =
        sqlx::query_as::<_, ReservationView>(&format!("{RESERVATION_VIEW_SELECT} WHERE v.id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

/// `(start, end)` of every active reservation of a room on a date
pub async fn active_slots<'e, E>(
    executor: E,
    room_id: i64,
    date: NaiveDate,
    exclude_id: Option<i64>,
) -> RepoResult<Vec<(NaiveTime, NaiveTime)>>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, (NaiveTime, NaiveTime)>(
        "SELECT start_time, end_time FROM reservations WHERE room_id = ?1 AND date = ?2 AND status = 'ACTIVE' AND (?3 IS NULL OR id <> ?3)",
    )
    .bind(room_id)
    .bind(date)
    .bind(exclude_id)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn insert<'e, E>(
    executor: E,
    user_id: i64,
    slot: &Slot,
    whatsapp_group: Option<&str>,
) -> RepoResult<Reservation>
where
    E: SqliteExecutor<'e>,
{
    let now = shared::util::now_millis();
    let row = sqlx::query_as::<_, Reservation>(&format!(
        "INSERT INTO reservations (user_id, room_id, date, start_time, end_time, whatsapp_group, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'ACTIVE', ?7, ?7) RETURNING {RESERVATION_COLUMNS}"
    ))
    .bind(user_id)
    .bind(slot.room_id)
    .bind(slot.date)
    .bind(slot.start_time)
    .bind(slot.end_time)
    .bind(whatsapp_group)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(row)
}

/// Overwrite slot and share link. Status is untouched.
pub async fn update_fields<'e, E>(
    executor: E,
    id: i64,
    slot: &Slot,
    whatsapp_group: Option<&str>,
) -> RepoResult<Reservation>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, Reservation>(&format!(
        "UPDATE reservations SET room_id = ?1, date = ?2, start_time = ?3, end_time = ?4, whatsapp_group = ?5, updated_at = ?6 WHERE id = ?7 RETURNING {RESERVATION_COLUMNS}"
    ))
    .bind(slot.room_id)
    .bind(slot.date)
    .bind(slot.start_time)
    .bind(slot.end_time)
    .bind(whatsapp_group)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_one(executor)
    .await?;
    Ok(row)
}

/// Move an active reservation to a terminal status.
///
/// Returns the updated row, or `None` when the reservation was no longer active.
pub async fn finalize<'e, E>(
    executor: E,
    id: i64,
    status: ReservationStatus,
) -> RepoResult<Option<Reservation>>
where
    E: SqliteExecutor<'e>,
{
    let row = sqlx::query_as::<_, Reservation>(&format!(
        "UPDATE reservations SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = 'ACTIVE' RETURNING {RESERVATION_COLUMNS}"
    ))
    .bind(status)
    .bind(shared::util::now_millis())
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// Active reservations of a room on any date
pub async fn count_active_for_room<'e, E>(executor: E, room_id: i64) -> RepoResult<i64>
where
    E: SqliteExecutor<'e>,
{
    let n = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM reservations WHERE room_id = ? AND status = 'ACTIVE'",
    )
    .bind(room_id)
    .fetch_one(executor)
    .await?;
    Ok(n)
}

/// Owner of the room's earliest remaining active reservation
pub async fn next_active_owner<'e, E>(executor: E, room_id: i64) -> RepoResult<Option<i64>>
where
    E: SqliteExecutor<'e>,
{
    let owner = sqlx::query_scalar::<_, i64>(
        "SELECT user_id FROM reservations WHERE room_id = ? AND status = 'ACTIVE' ORDER BY date, start_time, id LIMIT 1",
    )
    .bind(room_id)
    .fetch_optional(executor)
    .await?;
    Ok(owner)
}

/// Active reservations whose end lies at or before `now`
pub async fn find_expired(
    pool: &SqlitePool,
    today: NaiveDate,
    now: NaiveTime,
) -> RepoResult<Vec<Reservation>> {
    let rows = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE status = 'ACTIVE' AND (date < ?1 OR (date = ?1 AND end_time <= ?2)) ORDER BY date, end_time"
    ))
    .bind(today)
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_active(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM reservations WHERE status = 'ACTIVE'",
    )
    .fetch_one(pool)
    .await?;
    Ok(n)
}
