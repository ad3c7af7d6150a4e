//! Damage Report Model

use serde::{Deserialize, Serialize};

/// Damage report entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DamageReport {
    pub id: i64,
    pub resource_id: i64,
    /// Reporting user
    pub user_id: i64,
    pub description: String,
    /// Public path of the uploaded photo (`/uploads/damages/...`)
    pub photo_url: Option<String>,
    pub created_at: i64,
}

/// Damage report joined with resource, room and reporter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DamageReportView {
    pub id: i64,
    pub resource_id: i64,
    pub resource_code: String,
    pub resource_category: String,
    pub room_name: String,
    pub user_id: i64,
    pub reporter_name: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub created_at: i64,
}
