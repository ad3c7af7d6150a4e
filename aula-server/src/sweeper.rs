//! 过期预约清扫
//!
//! 周期性地把已经结束的 ACTIVE 预约自动完成并释放教室。
//! "结束" 按服务器本地时间判定：`date < today`，或 `date == today && end_time <= now`。
//!
//! 同一时刻只有一次清扫在执行；定时任务和手动触发共用同一把锁。

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::db::repository::reservation;
use crate::reservations::{ReservationError, ReservationManager};
use crate::utils::time::local_now;

#[derive(Clone)]
pub struct ExpirySweeper {
    pool: SqlitePool,
    manager: ReservationManager,
    interval: Duration,
    running: Arc<Mutex<()>>,
}

impl ExpirySweeper {
    pub fn new(pool: SqlitePool, manager: ReservationManager, interval: Duration) -> Self {
        Self {
            pool,
            manager,
            interval,
            running: Arc::new(Mutex::new(())),
        }
    }

    /// 主循环：启动时扫描一次，之后按固定间隔执行，直到收到关机信号
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Expiry sweeper started"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // 首个 tick 立即触发
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }
    }

    /// 按当前本地时间清扫一次，返回完成的预约数
    pub async fn sweep_once(&self) -> usize {
        self.sweep_at(local_now()).await
    }

    /// 以 `now` 为当前时间清扫一次
    ///
    /// 单条预约失败只记录日志，不影响其他预约。
    pub async fn sweep_at(&self, now: NaiveDateTime) -> usize {
        let _running = self.running.lock().await;
        let now = now.with_nanosecond(0).unwrap_or(now);

        let expired = match reservation::find_expired(&self.pool, now.date(), now.time()).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("Failed to load expired reservations: {}", e);
                return 0;
            }
        };

        if expired.is_empty() {
            tracing::debug!("No expired reservations");
            return 0;
        }

        let mut completed = 0;
        for r in &expired {
            match self.manager.auto_complete(r.id).await {
                Ok(_) => completed += 1,
                Err(ReservationError::Finalized { .. }) => {
                    tracing::debug!(reservation_id = r.id, "Reservation finalized concurrently, skipping");
                }
                Err(e) => {
                    tracing::warn!(reservation_id = r.id, error = %e, "Failed to auto-complete reservation");
                }
            }
        }

        tracing::info!(
            found = expired.len(),
            completed,
            "Expired reservations auto-completed"
        );
        completed
    }
}
