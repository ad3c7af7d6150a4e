//! Room Model (aulas)

use serde::{Deserialize, Serialize};

use super::resource::Resource;

/// Room occupancy state
///
/// `Occupied` always carries an occupant; `Free` never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RoomState {
    #[default]
    Free,
    Occupied,
}

/// Room entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Room {
    pub id: i64,
    pub name: String,
    /// Building / module grouping
    pub module: String,
    pub state: RoomState,
    /// Occupying user, set iff `state == Occupied`
    pub occupied_by: Option<i64>,
    /// Rendered QR code (PNG data URL)
    pub qr_code: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Room joined with its occupant's name and email
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RoomView {
    pub id: i64,
    pub name: String,
    pub module: String,
    pub state: RoomState,
    pub occupied_by: Option<i64>,
    pub occupant_name: Option<String>,
    pub occupant_email: Option<String>,
    pub qr_code: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Room with the resources assigned to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDetail {
    #[serde(flatten)]
    pub room: RoomView,
    pub resources: Vec<Resource>,
}

/// Create room payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCreate {
    pub name: String,
    pub module: String,
}

/// Update room payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomUpdate {
    pub name: Option<String>,
    pub module: Option<String>,
}

/// Manual occupancy override (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomOccupancyUpdate {
    pub state: RoomState,
    /// Required when `state` is `OCCUPIED`, ignored otherwise
    pub occupied_by: Option<i64>,
}
