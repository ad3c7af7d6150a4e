//! Dashboard aggregates

use serde::{Deserialize, Serialize};

use super::audit::{AuditEntry, LabelCount};
use super::damage::DamageReportView;
use super::reservation::ReservationView;

/// Dashboard statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub rooms_total: i64,
    pub rooms_by_state: Vec<LabelCount>,
    pub resources_total: i64,
    pub resources_by_state: Vec<LabelCount>,
    pub users_by_role: Vec<LabelCount>,
    pub users_total: i64,
    pub active_reservations: i64,
    pub reservations_by_status: Vec<LabelCount>,
    pub damage_reports_total: i64,
    pub recent_reservations: Vec<ReservationView>,
    pub recent_damage_reports: Vec<DamageReportView>,
    pub recent_activity: Vec<AuditEntry>,
}
