//! Unified error codes for the ledger gateway
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tabular source / ingestion errors
//! - 4xxx: Configuration errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the dashboard front-end
/// can switch on them without parsing messages.
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
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Write action name not recognized
    UnrecognizedAction = 9,

    // ==================== 1xxx: Auth ====================
    /// Password did not match
    InvalidCredentials = 1002,
    /// Session token unknown or expired
    SessionInvalid = 1005,
    /// Page type is neither admin nor staff
    UnknownPageType = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Source ====================
    /// Requested sheet does not exist
    SheetNotFound = 3001,
    /// Record lacks its required fields
    RecordInvalid = 3004,

    // ==================== 4xxx: Config ====================
    /// Schema file invalid
    SchemaInvalid = 4002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Backing store error
    StorageError = 9002,
    /// Handler panicked while serving a request
    HandlerPanicked = 9006,
    /// Serialization failed
    SerializationError = 9007,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::UnrecognizedAction => "Unrecognized action",

            // Auth
            ErrorCode::InvalidCredentials => "Incorrect password",
            ErrorCode::SessionInvalid => "Session is invalid or has expired",
            ErrorCode::UnknownPageType => "Unknown page type",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Source
            ErrorCode::SheetNotFound => "Sheet not found",
            ErrorCode::RecordInvalid => "Record is missing required fields",

            // Config
            ErrorCode::SchemaInvalid => "Schema definition is invalid",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StorageError => "Storage error",
            ErrorCode::HandlerPanicked => "Request handler failed unexpectedly",
            ErrorCode::SerializationError => "Serialization failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
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
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            9 => Ok(ErrorCode::UnrecognizedAction),

            // Auth
            1002 => Ok(ErrorCode::InvalidCredentials),
            1005 => Ok(ErrorCode::SessionInvalid),
            1008 => Ok(ErrorCode::UnknownPageType),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Source
            3001 => Ok(ErrorCode::SheetNotFound),
            3004 => Ok(ErrorCode::RecordInvalid),

            // Config
            4002 => Ok(ErrorCode::SchemaInvalid),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageError),
            9006 => Ok(ErrorCode::HandlerPanicked),
            9007 => Ok(ErrorCode::SerializationError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
