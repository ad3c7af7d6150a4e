//! 预约核心
//!
//! - [`conflict`] - 时间段重叠判定 (半开区间 `[start, end)`)
//! - [`lifecycle`] - 创建 / 修改 / 取消 / 完成，维护教室占用状态
//!
//! # 状态机
//!
//! ```text
//! ACTIVE ──cancel──────────▶ CANCELLED
//!    │
//!    └──complete / sweep──▶ COMPLETED
//! ```
//!
//! 终态不可再变更。所有写操作在进程级写锁 + SQLite 事务中完成，
//! 冲突检查与写入之间不会插入其他预约。

pub mod conflict;
pub mod lifecycle;

pub use lifecycle::ReservationManager;

use shared::ErrorCode;
use shared::models::ReservationStatus;
use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("{0}")]
    Validation(String),

    #[error("Start time must be before end time")]
    InvalidTimeRange,

    #[error("Room {0} not found")]
    RoomNotFound(i64),

    #[error("Reservation {0} not found")]
    NotFound(i64),

    #[error("Only the owner or an administrator can modify this reservation")]
    NotOwner,

    #[error("Administrator role required")]
    AdminRequired,

    #[error("A reservation already exists for this room in that time slot")]
    Conflict,

    #[error("Reservation {id} is already {status:?}")]
    Finalized { id: i64, status: ReservationStatus },

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<sqlx::Error> for ReservationError {
    fn from(err: sqlx::Error) -> Self {
        ReservationError::Repo(err.into())
    }
}

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        let message = err.to_string();
        match err {
            ReservationError::Validation(_) => AppError::validation(message),
            ReservationError::InvalidTimeRange => {
                AppError::with_message(ErrorCode::InvalidTimeRange, message)
            }
            ReservationError::RoomNotFound(id) => AppError::room_not_found(id),
            ReservationError::NotFound(id) => AppError::reservation_not_found(id),
            ReservationError::NotOwner => {
                AppError::with_message(ErrorCode::NotReservationOwner, message)
            }
            ReservationError::AdminRequired => {
                AppError::with_message(ErrorCode::AdminRequired, message)
            }
            ReservationError::Conflict => AppError::new(ErrorCode::ReservationConflict),
            ReservationError::Finalized { id, .. } => {
                AppError::with_message(ErrorCode::ReservationFinalized, message)
                    .with_detail("reservation_id", id)
            }
            ReservationError::Repo(e) => e.into(),
        }
    }
}
