//! Unified error codes for the Aula service
//!
//! This module defines all error codes used by the server and its API clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Room errors
//! - 4xxx: Reservation errors
//! - 5xxx: Resource and damage report errors
//! - 6xxx: Upload errors
//! - 7xxx: User errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2002,
    /// Actor neither owns the reservation nor is an administrator
    NotReservationOwner = 2003,

    // ==================== 3xxx: Room ====================
    /// Room not found
    RoomNotFound = 3001,
    /// Room still referenced by active reservations
    RoomHasActiveReservations = 3002,
    /// Occupancy state and occupant do not agree
    InvalidRoomState = 3003,
    /// QR payload could not be rendered
    QrRenderFailed = 3004,

    // ==================== 4xxx: Reservation ====================
    /// Reservation not found
    ReservationNotFound = 4001,
    /// Interval overlaps an active reservation of the same room and date
    ReservationConflict = 4002,
    /// Start time is not strictly before end time
    InvalidTimeRange = 4003,
    /// Reservation is already cancelled or completed
    ReservationFinalized = 4004,

    // ==================== 5xxx: Resource / Damage ====================
    /// Resource not found
    ResourceNotFound = 5001,
    /// Resource code already in use
    ResourceCodeExists = 5002,
    /// Unknown resource state
    InvalidResourceState = 5003,
    /// Damage report not found
    DamageReportNotFound = 5004,

    // ==================== 6xxx: Upload ====================
    /// File exceeds the size limit
    FileTooLarge = 6001,
    /// File extension is not an accepted image type
    UnsupportedFileFormat = 6002,
    /// File content is not a decodable image
    InvalidImageFile = 6003,
    /// Empty file
    EmptyFile = 6004,

    // ==================== 7xxx: User ====================
    /// User not found
    UserNotFound = 7001,
    /// Email already registered
    EmailExists = 7002,
    /// Administrators cannot delete their own account
    CannotDeleteSelf = 7003,
    /// Password shorter than the minimum length
    PasswordTooShort = 7004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// File system error
    StorageError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::NotReservationOwner => "Only the owner or an administrator may do this",

            // Room
            ErrorCode::RoomNotFound => "Room not found",
            ErrorCode::RoomHasActiveReservations => "Room has active reservations",
            ErrorCode::InvalidRoomState => "Invalid room state",
            ErrorCode::QrRenderFailed => "Failed to render QR code",

            // Reservation
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::ReservationConflict => {
                "A reservation already exists for this room in that time slot"
            }
            ErrorCode::InvalidTimeRange => "Start time must be before end time",
            ErrorCode::ReservationFinalized => "Reservation is already cancelled or completed",

            // Resource / Damage
            ErrorCode::ResourceNotFound => "Resource not found",
            ErrorCode::ResourceCodeExists => "Resource code is already in use",
            ErrorCode::InvalidResourceState => "Invalid resource state",
            ErrorCode::DamageReportNotFound => "Damage report not found",

            // Upload
            ErrorCode::FileTooLarge => "File is too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::EmptyFile => "Empty file provided",

            // User
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailExists => "Email is already registered",
            ErrorCode::CannotDeleteSelf => "You cannot delete your own account",
            ErrorCode::PasswordTooShort => "Password is too short",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::StorageError => "Storage error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::AdminRequired),
            2003 => Ok(ErrorCode::NotReservationOwner),

            // Room
            3001 => Ok(ErrorCode::RoomNotFound),
            3002 => Ok(ErrorCode::RoomHasActiveReservations),
            3003 => Ok(ErrorCode::InvalidRoomState),
            3004 => Ok(ErrorCode::QrRenderFailed),

            // Reservation
            4001 => Ok(ErrorCode::ReservationNotFound),
            4002 => Ok(ErrorCode::ReservationConflict),
            4003 => Ok(ErrorCode::InvalidTimeRange),
            4004 => Ok(ErrorCode::ReservationFinalized),

            // Resource / Damage
            5001 => Ok(ErrorCode::ResourceNotFound),
            5002 => Ok(ErrorCode::ResourceCodeExists),
            5003 => Ok(ErrorCode::InvalidResourceState),
            5004 => Ok(ErrorCode::DamageReportNotFound),

            // Upload
            6001 => Ok(ErrorCode::FileTooLarge),
            6002 => Ok(ErrorCode::UnsupportedFileFormat),
            6003 => Ok(ErrorCode::InvalidImageFile),
            6004 => Ok(ErrorCode::EmptyFile),

            // User
            7001 => Ok(ErrorCode::UserNotFound),
            7002 => Ok(ErrorCode::EmailExists),
            7003 => Ok(ErrorCode::CannotDeleteSelf),
            7004 => Ok(ErrorCode::PasswordTooShort),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::StorageError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::RoomNotFound.code(), 3001);
        assert_eq!(ErrorCode::ReservationConflict.code(), 4002);
        assert_eq!(ErrorCode::ResourceCodeExists.code(), 5002);
        assert_eq!(ErrorCode::FileTooLarge.code(), 6001);
        assert_eq!(ErrorCode::EmailExists.code(), 7002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_covers_every_variant() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidFormat,
            ErrorCode::RequiredField,
            ErrorCode::NotAuthenticated,
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::PermissionDenied,
            ErrorCode::AdminRequired,
            ErrorCode::NotReservationOwner,
            ErrorCode::RoomNotFound,
            ErrorCode::RoomHasActiveReservations,
            ErrorCode::InvalidRoomState,
            ErrorCode::QrRenderFailed,
            ErrorCode::ReservationNotFound,
            ErrorCode::ReservationConflict,
            ErrorCode::InvalidTimeRange,
            ErrorCode::ReservationFinalized,
            ErrorCode::ResourceNotFound,
            ErrorCode::ResourceCodeExists,
            ErrorCode::InvalidResourceState,
            ErrorCode::DamageReportNotFound,
            ErrorCode::FileTooLarge,
            ErrorCode::UnsupportedFileFormat,
            ErrorCode::InvalidImageFile,
            ErrorCode::EmptyFile,
            ErrorCode::UserNotFound,
            ErrorCode::EmailExists,
            ErrorCode::CannotDeleteSelf,
            ErrorCode::PasswordTooShort,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::ConfigError,
            ErrorCode::StorageError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_unknown() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::ReservationConflict).unwrap();
        assert_eq!(json, "4002");
        let code: ErrorCode = serde_json::from_str("3001").unwrap();
        assert_eq!(code, ErrorCode::RoomNotFound);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::InvalidTimeRange), "4003");
    }
}
