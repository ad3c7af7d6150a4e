//! Dashboard aggregates

use super::{RepoError, RepoResult};
use crate::audit::AuditStorage;
use shared::models::{DashboardStats, LabelCount};
use sqlx::SqlitePool;

const RECENT_LIMIT: i64 = 5;
const RECENT_ACTIVITY_LIMIT: i64 = 10;

async fn group_count(pool: &SqlitePool, sql: &str) -> RepoResult<Vec<LabelCount>> {
    let rows = sqlx::query_as::<_, LabelCount>(sql).fetch_all(pool).await?;
    Ok(rows)
}

async fn scalar(pool: &SqlitePool, sql: &str) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await?;
    Ok(n)
}

pub async fn stats(pool: &SqlitePool) -> RepoResult<DashboardStats> {
    Ok(DashboardStats {
        rooms_total: scalar(pool, "SELECT COUNT(*) FROM rooms").await?,
        rooms_by_state: group_count(
            pool,
            "SELECT state AS label, COUNT(*) AS count FROM rooms GROUP BY state ORDER BY state",
        )
        .await?,
        resources_total: scalar(pool, "SELECT COUNT(*) FROM resources").await?,
        resources_by_state: group_count(
            pool,
            "SELECT state AS label, COUNT(*) AS count FROM resources GROUP BY state ORDER BY state",
        )
        .await?,
        users_by_role: group_count(
            pool,
            "SELECT role AS label, COUNT(*) AS count FROM users GROUP BY role ORDER BY role",
        )
        .await?,
        users_total: super::user::count(pool).await?,
        active_reservations: super::reservation::count_active(pool).await?,
        reservations_by_status: group_count(
            pool,
            "SELECT status AS label, COUNT(*) AS count FROM reservations GROUP BY status ORDER BY status",
        )
        .await?,
        damage_reports_total: super::damage::count(pool).await?,
        recent_reservations: super::reservation::recent(pool, RECENT_LIMIT).await?,
        recent_damage_reports: super::damage::recent(pool, RECENT_LIMIT).await?,
        recent_activity: AuditStorage::new(pool.clone())
            .recent(RECENT_ACTIVITY_LIMIT)
            .await
            .map_err(|e| RepoError::Database(e.to_string()))?,
    })
}
