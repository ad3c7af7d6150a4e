//! 预约生命周期管理
//!
//! | 操作 | 调用方 | 教室占用 |
//! |------|--------|----------|
//! | create | 任何登录用户 | → OCCUPIED(owner) |
//! | update | 本人或管理员 | 不变 |
//! | cancel | 本人或管理员 | 该教室无其他 ACTIVE 预约时 → FREE，否则占用人改为剩余预约的所有者 |
//! | complete | 管理员 | → FREE |
//! | auto_complete | 过期清扫 | → FREE |
//! | remove_user | 管理员删除账号 | 按剩余 ACTIVE 预约重新对齐 |

use std::sync::Arc;

use shared::models::{
    AuditAction, Reservation, ReservationCreate, ReservationOutcome, ReservationStatus,
    ReservationUpdate, Room, User,
};
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::Mutex;

use super::{ReservationError, conflict};
use crate::audit::{AuditLogRequest, AuditService};
use crate::auth::{Capability, CurrentUser};
use crate::db::repository::reservation::{self, Slot};
use crate::db::repository::{room, user};
use crate::notify::{Notifier, ReservationNotice};
use crate::utils::time::{hhmm, truncate_to_seconds};
use crate::utils::validation::MAX_URL_LEN;

const ENTITY: &str = "reservations";

type Result<T> = std::result::Result<T, ReservationError>;

/// 预约生命周期管理器
///
/// 持有进程级写锁：冲突检查和写入在同一把锁和同一个事务内完成。
#[derive(Clone)]
pub struct ReservationManager {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
    audit: Arc<AuditService>,
    notifier: Notifier,
}

impl ReservationManager {
    pub fn new(pool: SqlitePool, audit: Arc<AuditService>, notifier: Notifier) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
            audit,
            notifier,
        }
    }

    /// 创建预约
    ///
    /// 校验顺序：时间段 → 教室存在 → 冲突。成功后教室变为 OCCUPIED，
    /// 并发送确认邮件。
    pub async fn create(
        &self,
        actor: &CurrentUser,
        input: ReservationCreate,
    ) -> Result<ReservationOutcome> {
        let slot = Slot {
            room_id: input.room_id,
            date: input.date,
            start_time: truncate_to_seconds(input.start_time),
            end_time: truncate_to_seconds(input.end_time),
        };
        validate_slot(&slot)?;
        let whatsapp_group = normalize_group(input.whatsapp_group)?;

        let (reservation, room, owner) = {
            let _guard = self.write_lock.lock().await;
            let mut tx = self.pool.begin().await?;

            let room = room::find_by_id(&mut *tx, slot.room_id)
                .await?
                .ok_or(ReservationError::RoomNotFound(slot.room_id))?;

            if conflict::has_conflict(&mut tx, &slot, None).await? {
                return Err(ReservationError::Conflict);
            }

            let reservation =
                reservation::insert(&mut *tx, actor.id, &slot, whatsapp_group.as_deref()).await?;
            room::mark_occupied(&mut *tx, room.id, actor.id).await?;
            let owner = user::find_by_id(&mut *tx, actor.id).await?;

            tx.commit().await?;
            (reservation, room, owner)
        };

        tracing::info!(
            reservation_id = reservation.id,
            room_id = room.id,
            user_id = actor.id,
            date = %reservation.date,
            "Reservation created"
        );

        self.record(
            AuditLogRequest::new(AuditAction::Create, ENTITY, Some(reservation.id))
                .by(actor)
                .detail(describe(&reservation, &room)),
        )
        .await;

        let notice = notice_for(&reservation, &room, owner.as_ref(), actor);
        let whatsapp_link = self.notifier.reservation_confirmed(&notice);

        Ok(ReservationOutcome {
            reservation,
            whatsapp_link,
        })
    }

    /// 修改预约
    ///
    /// 只要涉及教室/日期/时间中的任一项，就重新校验时间段并检查冲突
    /// (排除自身)。状态和教室占用不变。
    pub async fn update(
        &self,
        id: i64,
        actor: &CurrentUser,
        patch: ReservationUpdate,
    ) -> Result<Reservation> {
        let group_change = match patch.whatsapp_group.clone() {
            Some(group) => Some(normalize_group(Some(group))?),
            None => None,
        };

        let (updated, room) = {
            let _guard = self.write_lock.lock().await;
            let mut tx = self.pool.begin().await?;

            let existing = self.load_for_owner(&mut tx, id, actor).await?;
            if existing.status.is_terminal() {
                return Err(ReservationError::Finalized {
                    id,
                    status: existing.status,
                });
            }

            let slot = Slot {
                room_id: patch.room_id.unwrap_or(existing.room_id),
                date: patch.date.unwrap_or(existing.date),
                start_time: truncate_to_seconds(patch.start_time.unwrap_or(existing.start_time)),
                end_time: truncate_to_seconds(patch.end_time.unwrap_or(existing.end_time)),
            };

            let room = room::find_by_id(&mut *tx, slot.room_id)
                .await?
                .ok_or(ReservationError::RoomNotFound(slot.room_id))?;

            if patch.touches_slot() {
                validate_slot(&slot)?;
                if conflict::has_conflict(&mut tx, &slot, Some(id)).await? {
                    return Err(ReservationError::Conflict);
                }
            }

            let group = match group_change {
                Some(group) => group,
                None => existing.whatsapp_group.clone(),
            };
            let updated = reservation::update_fields(&mut *tx, id, &slot, group.as_deref()).await?;

            tx.commit().await?;
            (updated, room)
        };

        tracing::info!(reservation_id = id, user_id = actor.id, "Reservation updated");

        self.record(
            AuditLogRequest::new(AuditAction::Update, ENTITY, Some(id))
                .by(actor)
                .detail(describe(&updated, &room)),
        )
        .await;

        Ok(updated)
    }

    /// 取消预约
    ///
    /// 该教室不再有任何 ACTIVE 预约 (任意日期) 时释放教室；
    /// 否则占用人改为剩余最早一条预约的所有者。
    pub async fn cancel(&self, id: i64, actor: &CurrentUser) -> Result<ReservationOutcome> {
        let (cancelled, room, owner, released) = {
            let _guard = self.write_lock.lock().await;
            let mut tx = self.pool.begin().await?;

            let existing = self.load_for_owner(&mut tx, id, actor).await?;
            let cancelled = reservation::finalize(&mut *tx, id, ReservationStatus::Cancelled)
                .await?
                .ok_or(ReservationError::Finalized {
                    id,
                    status: existing.status,
                })?;

            let occupant = room::sync_occupancy(&mut tx, cancelled.room_id).await?;
            let released = occupant.is_none();

            let room = room::find_by_id(&mut *tx, cancelled.room_id)
                .await?
                .ok_or(ReservationError::RoomNotFound(cancelled.room_id))?;
            let owner = user::find_by_id(&mut *tx, cancelled.user_id).await?;

            tx.commit().await?;
            (cancelled, room, owner, released)
        };

        tracing::info!(
            reservation_id = id,
            room_id = room.id,
            user_id = actor.id,
            room_released = released,
            "Reservation cancelled"
        );

        self.record(
            AuditLogRequest::new(AuditAction::Cancel, ENTITY, Some(id))
                .by(actor)
                .detail(describe(&cancelled, &room)),
        )
        .await;

        let notice = notice_for(&cancelled, &room, owner.as_ref(), actor);
        let whatsapp_link = self.notifier.reservation_cancelled(&notice);

        Ok(ReservationOutcome {
            reservation: cancelled,
            whatsapp_link,
        })
    }

    /// 管理员手动完成预约，教室无条件释放
    pub async fn complete(&self, id: i64, actor: &CurrentUser) -> Result<Reservation> {
        if !actor.can(Capability::CompleteReservations) {
            return Err(ReservationError::AdminRequired);
        }
        self.finish(id, Some(actor.id), AuditAction::Complete).await
    }

    /// 过期清扫调用：完成预约并释放教室
    pub async fn auto_complete(&self, id: i64) -> Result<Reservation> {
        self.finish(id, None, AuditAction::AutoComplete).await
    }

    async fn finish(
        &self,
        id: i64,
        actor_id: Option<i64>,
        action: AuditAction,
    ) -> Result<Reservation> {
        let (completed, room) = {
            let _guard = self.write_lock.lock().await;
            let mut tx = self.pool.begin().await?;

            let existing = reservation::find_by_id(&mut *tx, id)
                .await?
                .ok_or(ReservationError::NotFound(id))?;
            let completed = reservation::finalize(&mut *tx, id, ReservationStatus::Completed)
                .await?
                .ok_or(ReservationError::Finalized {
                    id,
                    status: existing.status,
                })?;

            room::mark_free(&mut *tx, completed.room_id).await?;
            let room = room::find_by_id(&mut *tx, completed.room_id)
                .await?
                .ok_or(ReservationError::RoomNotFound(completed.room_id))?;

            tx.commit().await?;
            (completed, room)
        };

        tracing::info!(
            reservation_id = id,
            room_id = room.id,
            action = %action,
            "Reservation completed, room released"
        );

        let mut req =
            AuditLogRequest::new(action, ENTITY, Some(id)).detail(describe(&completed, &room));
        if let Some(user_id) = actor_id {
            req = req.by_user_id(user_id);
        }
        self.record(req).await;

        Ok(completed)
    }

    /// 删除账号 (其预约随外键级联删除)，并重新对齐受影响教室的占用状态
    ///
    /// 与预约写操作共用写锁，删除期间不会插入新的预约。
    pub async fn remove_user(&self, user_id: i64) -> Result<bool> {
        let (deleted, realigned) = {
            let _guard = self.write_lock.lock().await;
            let mut tx = self.pool.begin().await?;

            let rooms = room::held_by_user(&mut *tx, user_id).await?;
            let deleted = user::delete(&mut *tx, user_id).await?;
            if deleted {
                for room_id in &rooms {
                    room::sync_occupancy(&mut tx, *room_id).await?;
                }
            }

            tx.commit().await?;
            (deleted, rooms)
        };

        if deleted {
            tracing::info!(user_id, rooms = ?realigned, "User removed, room occupancy realigned");
        }
        Ok(deleted)
    }

    async fn load_for_owner(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        actor: &CurrentUser,
    ) -> Result<Reservation> {
        let existing = reservation::find_by_id(&mut *conn, id)
            .await?
            .ok_or(ReservationError::NotFound(id))?;
        if !actor.can_act_on(existing.user_id) {
            crate::security_log!(
                "WARN",
                "reservation_not_owner",
                user_id = actor.id,
                reservation_id = id
            );
            return Err(ReservationError::NotOwner);
        }
        Ok(existing)
    }

    async fn record(&self, req: AuditLogRequest) {
        let action = req.action;
        if let Err(e) = self.audit.log_sync(req).await {
            tracing::error!(action = %action, error = %e, "Failed to record reservation audit entry");
        }
    }
}

fn validate_slot(slot: &Slot) -> Result<()> {
    if slot.start_time >= slot.end_time {
        return Err(ReservationError::InvalidTimeRange);
    }
    Ok(())
}

/// Trim the group link; an empty value means "no group"
fn normalize_group(group: Option<String>) -> Result<Option<String>> {
    let Some(group) = group else {
        return Ok(None);
    };
    let trimmed = group.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.len() > MAX_URL_LEN {
        return Err(ReservationError::Validation(format!(
            "whatsapp_group is too long (max {MAX_URL_LEN})"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

fn describe(reservation: &Reservation, room: &Room) -> String {
    format!(
        "{} {} {}-{}",
        room.name,
        reservation.date,
        hhmm(reservation.start_time),
        hhmm(reservation.end_time)
    )
}

fn notice_for(
    reservation: &Reservation,
    room: &Room,
    owner: Option<&User>,
    actor: &CurrentUser,
) -> ReservationNotice {
    let (user_name, user_email) = match owner {
        Some(owner) => (owner.name.clone(), owner.email.clone()),
        None => (actor.name.clone(), actor.email.clone()),
    };
    ReservationNotice {
        user_name,
        user_email,
        room_name: room.name.clone(),
        room_module: room.module.clone(),
        date: reservation.date,
        start_time: reservation.start_time,
        end_time: reservation.end_time,
        whatsapp_group: reservation.whatsapp_group.clone(),
    }
}
