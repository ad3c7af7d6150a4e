//! Resource Model (projectors, equipment)

use serde::{Deserialize, Serialize};

/// Resource condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ResourceState {
    #[default]
    Active,
    Damaged,
    Loaned,
}

/// Resource entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Resource {
    pub id: i64,
    pub room_id: i64,
    pub category: String,
    /// Unique inventory code
    pub code: String,
    pub state: ResourceState,
    /// Room the resource was registered in (kept across loans)
    pub origin_room_id: Option<i64>,
    pub created_at: i64,
}

/// Resource joined with its room
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ResourceView {
    pub id: i64,
    pub room_id: i64,
    pub room_name: String,
    pub room_module: String,
    pub category: String,
    pub code: String,
    pub state: ResourceState,
    pub origin_room_id: Option<i64>,
    pub created_at: i64,
}

/// Create resource payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCreate {
    pub room_id: i64,
    pub category: String,
    pub code: String,
    pub state: Option<ResourceState>,
}

/// Update resource payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceUpdate {
    pub room_id: Option<i64>,
    pub category: Option<String>,
    pub code: Option<String>,
    pub state: Option<ResourceState>,
}

/// State change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceStateChange {
    pub state: ResourceState,
    /// Destination room when lending the resource
    pub destination_room_id: Option<i64>,
}
