//! 认证授权模块
//!
//! 提供 JWT 认证、能力策略和中间件：
//! - [`JwtService`] - JWT 令牌服务
//! - [`CurrentUser`] - 当前用户上下文
//! - [`Policy`] - 角色能力表
//! - [`require_auth`] - 认证中间件
//! - [`require_capability`] - 能力检查中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_capability};
pub use password::{hash_password, verify_password};
pub use policy::{Capability, Policy};
