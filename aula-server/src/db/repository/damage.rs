//! Damage Report Repository

use super::{RepoError, RepoResult};
use shared::models::{DamageReport, DamageReportView, ResourceState};
use sqlx::SqlitePool;

const DAMAGE_COLUMNS: &str = "id, resource_id, user_id, description, photo_url, created_at";

const DAMAGE_VIEW_SELECT: &str = "SELECT d.id, d.resource_id, x.code AS resource_code, x.category AS resource_category, r.name AS room_name, d.user_id, u.name AS reporter_name, d.description, d.photo_url, d.created_at FROM damage_reports d JOIN resources x ON x.id = d.resource_id JOIN rooms r ON r.id = x.room_id JOIN users u ON u.id = d.user_id";

pub async fn list(pool: &SqlitePool) -> RepoResult<Vec<DamageReportView>> {
    let rows = sqlx::query_as::<_, DamageReportView>(&format!(
        "{DAMAGE_VIEW_SELECT} ORDER BY d.created_at DESC, d.id DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn recent(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<DamageReportView>> {
    let rows = sqlx::query_as::<_, DamageReportView>(&format!(
        "{DAMAGE_VIEW_SELECT} ORDER BY d.created_at DESC, d.id DESC LIMIT ?"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_view(pool: &SqlitePool, id: i64) -> RepoResult<Option<DamageReportView>> {
    let row = sqlx::query_as::<_, DamageReportView>(&format!("{DAMAGE_VIEW_SELECT} WHERE d.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DamageReport>> {
    let row = sqlx::query_as::<_, DamageReport>(&format!(
        "SELECT {DAMAGE_COLUMNS} FROM damage_reports WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Insert a report and mark the resource as damaged in one transaction
pub async fn create(
    pool: &SqlitePool,
    resource_id: i64,
    user_id: i64,
    description: &str,
    photo_url: Option<&str>,
) -> RepoResult<DamageReport> {
    let mut tx = pool.begin().await?;

    let exists = super::resource::find_by_id(&mut *tx, resource_id).await?;
    if exists.is_none() {
        return Err(RepoError::NotFound(format!("Resource {resource_id} not found")));
    }

    let report = sqlx::query_as::<_, DamageReport>(&format!(
        "INSERT INTO damage_reports (resource_id, user_id, description, photo_url, created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {DAMAGE_COLUMNS}"
    ))
    .bind(resource_id)
    .bind(user_id)
    .bind(description.trim())
    .bind(photo_url)
    .bind(shared::util::now_millis())
    .fetch_one(&mut *tx)
    .await?;

    super::resource::set_state(&mut *tx, resource_id, ResourceState::Damaged).await?;

    tx.commit().await?;
    Ok(report)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM damage_reports WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(rows > 0)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM damage_reports")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
