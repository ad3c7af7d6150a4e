//! 审计日志后台 Worker
//!
//! 从 mpsc 通道消费 AuditLogRequest，写入 SQLite。
//! 通道关闭或收到关机信号时退出，退出前写完已排队的请求。

use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

use super::service::AuditLogRequest;
use super::storage::AuditStorage;

pub struct AuditWorker {
    storage: AuditStorage,
}

impl AuditWorker {
    pub fn new(storage: AuditStorage) -> Self {
        Self { storage }
    }

    /// 运行 worker（阻塞直到通道关闭或收到关机信号）
    pub async fn run(self, mut rx: Receiver<AuditLogRequest>, shutdown: CancellationToken) {
        tracing::info!("Audit log worker started");

        loop {
            tokio::select! {
                req = rx.recv() => match req {
                    Some(req) => self.write(req).await,
                    None => {
                        tracing::info!("Audit log channel closed, worker stopping");
                        return;
                    }
                },
                _ = shutdown.cancelled() => break,
            }
        }

        // 关机：写完已排队的请求
        rx.close();
        while let Some(req) = rx.recv().await {
            self.write(req).await;
        }
        tracing::info!("Audit log worker stopped");
    }

    async fn write(&self, req: AuditLogRequest) {
        match self.storage.append(req).await {
            Ok(entry) => {
                tracing::debug!(
                    audit_id = entry.id,
                    action = %entry.action,
                    entity = %entry.entity,
                    "Audit entry recorded"
                );
            }
            Err(e) => {
                tracing::error!("Failed to write audit entry: {:?}", e);
            }
        }
    }
}
