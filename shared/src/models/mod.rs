//! Data models
//!
//! Shared between aula-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.

pub mod audit;
pub mod damage;
pub mod dashboard;
pub mod reservation;
pub mod resource;
pub mod room;
pub mod user;

// Re-exports
pub use audit::*;
pub use damage::*;
pub use dashboard::*;
pub use reservation::*;
pub use resource::*;
pub use room::*;
pub use user::*;
