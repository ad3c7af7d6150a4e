//! 审计日志 SQLite 存储层
//!
//! Append-only 设计，没有任何删除/更新接口。
//! `audit_log` 表上的触发器会拒绝 UPDATE / DELETE。

use chrono::{Duration, NaiveTime, Utc};
use shared::models::{AuditEntry, AuditQuery, AuditStats, LabelCount, UserActivity};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;

use super::service::AuditLogRequest;

/// 存储错误
#[derive(Debug, Error)]
pub enum AuditStorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AuditStorageResult<T> = Result<T, AuditStorageError>;

impl From<AuditStorageError> for shared::error::AppError {
    fn from(err: AuditStorageError) -> Self {
        shared::error::AppError::database(err.to_string())
    }
}

/// 单次查询的最大条数
pub const MAX_QUERY_LIMIT: i64 = 1000;

const ENTRY_SELECT: &str = "SELECT a.id, a.user_id, u.name AS user_name, a.action, a.entity, a.entity_id, a.detail, a.created_at FROM audit_log a LEFT JOIN users u ON u.id = a.user_id";

/// 审计日志存储
#[derive(Debug, Clone)]
pub struct AuditStorage {
    pool: SqlitePool,
}

impl AuditStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 追加一条审计记录
    pub async fn append(&self, req: AuditLogRequest) -> AuditStorageResult<AuditEntry> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO audit_log (user_id, action, entity, entity_id, detail, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
        )
        .bind(req.user_id)
        .bind(req.action)
        .bind(&req.entity)
        .bind(req.entity_id)
        .bind(&req.detail)
        .bind(shared::util::now_millis())
        .fetch_one(&self.pool)
        .await?;

        let entry = sqlx::query_as::<_, AuditEntry>(&format!("{ENTRY_SELECT} WHERE a.id = ?"))
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(entry)
    }

    pub async fn get(&self, id: i64) -> AuditStorageResult<Option<AuditEntry>> {
        let entry = sqlx::query_as::<_, AuditEntry>(&format!("{ENTRY_SELECT} WHERE a.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    /// 按条件查询，最新的在前
    ///
    /// `from` / `to` 为闭区间日期 (UTC)
    pub async fn query(&self, q: &AuditQuery) -> AuditStorageResult<Vec<AuditEntry>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(ENTRY_SELECT);
        qb.push(" WHERE 1 = 1");
        if let Some(user_id) = q.user_id {
            qb.push(" AND a.user_id = ").push_bind(user_id);
        }
        if let Some(entity) = &q.entity {
            qb.push(" AND a.entity = ").push_bind(entity.clone());
        }
        if let Some(action) = q.action {
            qb.push(" AND a.action = ").push_bind(action);
        }
        if let Some(from) = q.from {
            let start = from.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
            qb.push(" AND a.created_at >= ").push_bind(start);
        }
        if let Some(to) = q.to
            && let Some(next) = to.succ_opt()
        {
            let end = next.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
            qb.push(" AND a.created_at < ").push_bind(end);
        }
        qb.push(" ORDER BY a.created_at DESC, a.id DESC LIMIT ")
            .push_bind(q.limit.clamp(1, MAX_QUERY_LIMIT));

        let entries = qb.build_query_as::<AuditEntry>().fetch_all(&self.pool).await?;
        Ok(entries)
    }

    /// 最近的 `limit` 条记录
    pub async fn recent(&self, limit: i64) -> AuditStorageResult<Vec<AuditEntry>> {
        self.query(&AuditQuery {
            limit,
            ..Default::default()
        })
        .await
    }

    pub async fn stats(&self) -> AuditStorageResult<AuditStats> {
        let by_action = sqlx::query_as::<_, LabelCount>(
            "SELECT action AS label, COUNT(*) AS count FROM audit_log GROUP BY action ORDER BY count DESC, label",
        )
        .fetch_all(&self.pool)
        .await?;

        let by_entity = sqlx::query_as::<_, LabelCount>(
            "SELECT entity AS label, COUNT(*) AS count FROM audit_log GROUP BY entity ORDER BY count DESC, label",
        )
        .fetch_all(&self.pool)
        .await?;

        let top_users = sqlx::query_as::<_, UserActivity>(
            "SELECT a.user_id AS user_id, u.name AS user_name, COUNT(*) AS count FROM audit_log a JOIN users u ON u.id = a.user_id GROUP BY a.user_id, u.name ORDER BY count DESC, user_name LIMIT 10",
        )
        .fetch_all(&self.pool)
        .await?;

        let since = (Utc::now() - Duration::days(7)).timestamp_millis();
        let daily = sqlx::query_as::<_, LabelCount>(
            "SELECT strftime('%Y-%m-%d', created_at / 1000, 'unixepoch') AS label, COUNT(*) AS count FROM audit_log WHERE created_at >= ? GROUP BY label ORDER BY label",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(AuditStats {
            by_action,
            by_entity,
            top_users,
            daily,
        })
    }
}
