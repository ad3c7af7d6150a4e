//! Reservation Model (reservas)

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Reservation status
///
/// `Cancelled` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReservationStatus {
    #[default]
    Active,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Reservation entity
///
/// The booked slot is the half-open interval `[start_time, end_time)` on `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub room_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// WhatsApp group invite link shared with attendees
    pub whatsapp_group: Option<String>,
    pub status: ReservationStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Reservation joined with room and user display fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReservationView {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub user_email: String,
    pub room_id: i64,
    pub room_name: String,
    pub room_module: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub whatsapp_group: Option<String>,
    pub status: ReservationStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create reservation payload (the owner is the caller)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub room_id: i64,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub whatsapp_group: Option<String>,
}

/// Update reservation payload
///
/// Omitted fields keep their stored value. An empty `whatsapp_group`
/// clears the link. Status is not updatable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationUpdate {
    pub room_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub whatsapp_group: Option<String>,
}

impl ReservationUpdate {
    /// Whether any field that defines the booked slot is present
    pub fn touches_slot(&self) -> bool {
        self.room_id.is_some()
            || self.date.is_some()
            || self.start_time.is_some()
            || self.end_time.is_some()
    }
}

/// Response of create / cancel: the reservation plus the composed share link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationOutcome {
    pub reservation: Reservation,
    /// `https://wa.me/?text=...` link for the caller to relay
    pub whatsapp_link: String,
}
