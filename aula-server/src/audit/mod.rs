//! 审计日志模块 - append-only 操作记录
//!
//! # 架构
//!
//! ```text
//! 业务操作触发
//!   ├─ AuditService::log() → mpsc → AuditWorker → SQLite (audit_log 表)
//!   └─ AuditService::log_sync() → SQLite (预约生命周期，调用方需要知道结果)
//! ```
//!
//! 写入失败只记录错误日志，不影响业务操作结果。
//! `audit_log` 表由触发器保护，拒绝任何 UPDATE / DELETE。

pub mod service;
pub mod storage;
pub mod worker;

pub use service::{AuditLogRequest, AuditService};
pub use storage::{AuditStorage, AuditStorageError};
pub use worker::AuditWorker;
