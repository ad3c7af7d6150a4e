//! Capability Definitions
//!
//! 角色到能力的静态映射表。
//!
//! ## 设计原则
//! - 登录用户都可以浏览教室/资源、创建和管理自己的预约、报告损坏
//! - 目录管理 (教室/资源/用户) 与审计查看仅管理员可用
//! - 代他人操作预约、手动完成预约、手动触发清扫仅管理员可用

use shared::models::Role;

/// 系统能力
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// 浏览教室、资源和预约
    ViewCatalog,
    /// 创建预约，修改/取消自己的预约
    Reserve,
    /// 提交损坏报告
    ReportDamage,
    /// 教室增删改、二维码、占用状态
    ManageRooms,
    /// 资源增删改、状态变更
    ManageResources,
    /// 用户管理
    ManageUsers,
    /// 审计日志和仪表盘
    ViewLogs,
    /// 手动完成预约
    CompleteReservations,
    /// 手动触发过期清扫
    RunSweep,
    /// 删除损坏报告
    DeleteDamageReports,
    /// 修改/取消任何人的预约
    ActOnAnyReservation,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewCatalog => "catalog:view",
            Self::Reserve => "reservations:own",
            Self::ReportDamage => "damages:report",
            Self::ManageRooms => "rooms:manage",
            Self::ManageResources => "resources:manage",
            Self::ManageUsers => "users:manage",
            Self::ViewLogs => "logs:view",
            Self::CompleteReservations => "reservations:complete",
            Self::RunSweep => "scheduler:run",
            Self::DeleteDamageReports => "damages:delete",
            Self::ActOnAnyReservation => "reservations:any",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 普通用户能力
pub const USER_CAPABILITIES: &[Capability] = &[
    Capability::ViewCatalog,
    Capability::Reserve,
    Capability::ReportDamage,
];

/// 管理员能力 (全部)
pub const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::ViewCatalog,
    Capability::Reserve,
    Capability::ReportDamage,
    Capability::ManageRooms,
    Capability::ManageResources,
    Capability::ManageUsers,
    Capability::ViewLogs,
    Capability::CompleteReservations,
    Capability::RunSweep,
    Capability::DeleteDamageReports,
    Capability::ActOnAnyReservation,
];

/// 能力判定
pub trait Policy {
    fn grants(&self, capability: Capability) -> bool;
}

impl Policy for Role {
    fn grants(&self, capability: Capability) -> bool {
        let table = match self {
            Role::Admin => ADMIN_CAPABILITIES,
            Role::User => USER_CAPABILITIES,
        };
        table.contains(&capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_every_capability() {
        for cap in ADMIN_CAPABILITIES {
            assert!(Role::Admin.grants(*cap), "admin should have {cap}");
        }
    }

    #[test]
    fn user_capabilities_are_limited() {
        assert!(Role::User.grants(Capability::Reserve));
        assert!(Role::User.grants(Capability::ReportDamage));
        assert!(Role::User.grants(Capability::ViewCatalog));

        for cap in [
            Capability::ManageRooms,
            Capability::ManageResources,
            Capability::ManageUsers,
            Capability::ViewLogs,
            Capability::CompleteReservations,
            Capability::RunSweep,
            Capability::DeleteDamageReports,
            Capability::ActOnAnyReservation,
        ] {
            assert!(!Role::User.grants(cap), "user should not have {cap}");
        }
    }

    #[test]
    fn user_capabilities_are_subset_of_admin() {
        for cap in USER_CAPABILITIES {
            assert!(ADMIN_CAPABILITIES.contains(cap));
        }
    }
}
