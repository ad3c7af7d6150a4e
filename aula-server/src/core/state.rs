//! 服务器状态
//!
//! `ServerState` 在所有请求处理器之间共享 (Clone 开销很小，内部都是 Arc / 连接池)。

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio::sync::mpsc;

use crate::audit::{AuditLogRequest, AuditService, AuditWorker};
use crate::auth::JwtService;
use crate::core::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::DbService;
use crate::notify::{LogMailer, Mailer, Notifier, SesMailer};
use crate::reservations::ReservationManager;
use crate::sweeper::ExpirySweeper;
use crate::utils::AppResult;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub audit_service: Arc<AuditService>,
    pub reservations: ReservationManager,
    pub sweeper: ExpirySweeper,
}

impl ServerState {
    /// 打开数据库并组装所有服务
    ///
    /// 返回的 Receiver 交给 [`ServerState::start_background_tasks`]。
    pub async fn initialize(
        config: &Config,
    ) -> AppResult<(Self, mpsc::Receiver<AuditLogRequest>)> {
        let db = DbService::new(&config.database_path).await?;

        let mailer: Arc<dyn Mailer> = match &config.mail_from {
            Some(from) => {
                tracing::info!(from = %from, "Email notifications via SES");
                Arc::new(SesMailer::from_env(from.clone()).await)
            }
            None => {
                tracing::warn!("MAIL_FROM not set, notification emails are only logged");
                Arc::new(LogMailer)
            }
        };

        Ok(Self::assemble(config, db.pool, mailer))
    }

    /// 用已有的连接池和邮件发送器组装状态
    pub fn assemble(
        config: &Config,
        pool: SqlitePool,
        mailer: Arc<dyn Mailer>,
    ) -> (Self, mpsc::Receiver<AuditLogRequest>) {
        let (audit_service, audit_rx) = AuditService::new(pool.clone(), config.audit_buffer);
        let notifier = Notifier::new(mailer, config.whatsapp_phone.clone());
        let reservations = ReservationManager::new(pool.clone(), audit_service.clone(), notifier);
        let sweeper = ExpirySweeper::new(
            pool.clone(),
            reservations.clone(),
            Duration::from_secs(config.sweep_interval_secs),
        );

        let state = Self {
            config: config.clone(),
            pool,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            audit_service,
            reservations,
            sweeper,
        };
        (state, audit_rx)
    }

    /// 启动审计写入和过期清扫
    pub fn start_background_tasks(
        &self,
        audit_rx: mpsc::Receiver<AuditLogRequest>,
    ) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let worker = AuditWorker::new(self.audit_service.storage().clone());
        tasks.spawn(
            "audit_worker",
            TaskKind::Worker,
            worker.run(audit_rx, tasks.shutdown_token()),
        );

        tasks.spawn(
            "expiry_sweeper",
            TaskKind::Periodic,
            self.sweeper.clone().run(tasks.shutdown_token()),
        );

        tasks.log_summary();
        tasks
    }
}
