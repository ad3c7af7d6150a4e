//! Audit Log Model
//!
//! Append-only. Rows are never updated or deleted by the service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Audited action kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Cancel,
    Complete,
    /// Completion driven by the expiry sweeper
    AutoComplete,
    StateChange,
    Login,
    Register,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Cancel => "CANCEL",
            Self::Complete => "COMPLETE",
            Self::AutoComplete => "AUTO_COMPLETE",
            Self::StateChange => "STATE_CHANGE",
            Self::Login => "LOGIN",
            Self::Register => "REGISTER",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AuditEntry {
    pub id: i64,
    /// Acting user, `None` for system actions
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub action: AuditAction,
    /// Affected table (`reservations`, `rooms`, ...)
    pub entity: String,
    pub entity_id: Option<i64>,
    pub detail: String,
    pub created_at: i64,
}

/// Audit log query filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditQuery {
    pub user_id: Option<i64>,
    pub entity: Option<String>,
    pub action: Option<AuditAction>,
    /// Inclusive start date (UTC)
    pub from: Option<NaiveDate>,
    /// Inclusive end date (UTC)
    pub to: Option<NaiveDate>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Count keyed by a label
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

/// Most active users in the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserActivity {
    pub user_id: i64,
    pub user_name: String,
    pub count: i64,
}

/// Audit log statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    pub by_action: Vec<LabelCount>,
    pub by_entity: Vec<LabelCount>,
    pub top_users: Vec<UserActivity>,
    /// Entries per day over the last 7 days (`label` is `YYYY-MM-DD`)
    pub daily: Vec<LabelCount>,
}
