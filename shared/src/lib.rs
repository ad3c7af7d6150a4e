//! Shared types for the Aula room-reservation service
//!
//! Types used by the server crate and by API clients: the unified error
//! system, the data models and the client DTOs.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
