//! Unified error system for the Aula service
//!
//! - [`ErrorCode`]: Standardized numeric error codes
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error type with code, message and details
//! - [`ApiResponse`]: JSON body of every error response
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Room errors
//! - 4xxx: Reservation errors
//! - 5xxx: Resource and damage report errors
//! - 6xxx: Upload errors
//! - 7xxx: User errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::ReservationConflict);
//! assert_eq!(err.http_status().as_u16(), 400);
//!
//! let err = AppError::validation("Start time must be before end time")
//!     .with_detail("field", "start_time");
//!
//! let body = ApiResponse::error(&err);
//! assert_eq!(body.code, 2);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
