//! 审计日志服务
//!
//! `AuditService` 提供：
//! - 日志写入（通过 mpsc 通道异步接收，或直接同步写入）
//! - 日志查询和统计（直接读取 storage）

use std::sync::Arc;

use shared::models::{AuditAction, AuditEntry, AuditQuery, AuditStats};
use sqlx::SqlitePool;
use tokio::sync::mpsc;

use super::storage::{AuditStorage, AuditStorageError};
use crate::auth::CurrentUser;

/// 发送到 AuditService 的日志请求
#[derive(Debug, Clone)]
pub struct AuditLogRequest {
    pub action: AuditAction,
    /// 受影响的表 (`reservations`, `rooms`, ...)
    pub entity: String,
    pub entity_id: Option<i64>,
    /// 操作人，系统操作为 `None`
    pub user_id: Option<i64>,
    pub detail: String,
}

impl AuditLogRequest {
    pub fn new(action: AuditAction, entity: &str, entity_id: Option<i64>) -> Self {
        Self {
            action,
            entity: entity.to_string(),
            entity_id,
            user_id: None,
            detail: String::new(),
        }
    }

    pub fn by(mut self, user: &CurrentUser) -> Self {
        self.user_id = Some(user.id);
        self
    }

    pub fn by_user_id(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// 审计日志服务
///
/// 通过 mpsc 通道接收日志请求，由 [`super::AuditWorker`] 异步写入。
/// 查询操作直接读取 storage。
#[derive(Debug)]
pub struct AuditService {
    storage: AuditStorage,
    tx: mpsc::Sender<AuditLogRequest>,
}

impl AuditService {
    /// 创建审计服务，返回的 Receiver 交给 AuditWorker
    pub fn new(
        pool: SqlitePool,
        buffer_size: usize,
    ) -> (Arc<Self>, mpsc::Receiver<AuditLogRequest>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        let service = Arc::new(Self {
            storage: AuditStorage::new(pool),
            tx,
        });
        (service, rx)
    }

    /// 异步记录审计日志
    ///
    /// 通道满时等待，审计日志不允许丢失。
    pub async fn log(&self, req: AuditLogRequest) {
        if self.tx.send(req).await.is_err() {
            tracing::error!("Audit log channel closed, audit entry lost!");
        }
    }

    /// 直接写入审计日志
    pub async fn log_sync(&self, req: AuditLogRequest) -> Result<AuditEntry, AuditStorageError> {
        self.storage.append(req).await
    }

    pub async fn query(&self, q: &AuditQuery) -> Result<Vec<AuditEntry>, AuditStorageError> {
        self.storage.query(q).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<AuditEntry>, AuditStorageError> {
        self.storage.get(id).await
    }

    pub async fn stats(&self) -> Result<AuditStats, AuditStorageError> {
        self.storage.stats().await
    }

    /// 获取存储引用
    pub fn storage(&self) -> &AuditStorage {
        &self.storage
    }
}
