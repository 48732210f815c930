//! Application error type

use super::codes::ErrorCode;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Application error with structured error code and details
///
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages (this is what the `message` field of an error
///   envelope carries)
/// - Optional structured details for debugging
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (field-level errors, context, etc.)
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create a missing sheet error
    pub fn sheet_not_found(sheet: impl Into<String>) -> Self {
        let s = sheet.into();
        Self::with_message(ErrorCode::SheetNotFound, format!("Sheet not found: {}", s))
            .with_detail("sheet", s)
    }

    /// Create an invalid credentials error
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    /// Create an invalid session error
    pub fn session_invalid() -> Self {
        Self::new(ErrorCode::SessionInvalid)
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    /// Create an unrecognized action error
    pub fn unrecognized_action(action: impl Into<String>) -> Self {
        let a = action.into();
        Self::with_message(
            ErrorCode::UnrecognizedAction,
            format!("Unrecognized action: {}", a),
        )
        .with_detail("action", a)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::StorageError, msg)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_message(ErrorCode::SerializationError, err.to_string())
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::SessionInvalid);
        assert_eq!(err.code, ErrorCode::SessionInvalid);
        assert_eq!(err.message, "Session is invalid or has expired");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::validation("Missing required fields")
            .with_detail("field", "date")
            .with_detail("row", 4);

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(details.get("field").unwrap(), "date");
        assert_eq!(details.get("row").unwrap(), 4);
    }

    #[test]
    fn test_convenience_constructors() {
        let err = AppError::sheet_not_found("売上");
        assert_eq!(err.code, ErrorCode::SheetNotFound);
        assert_eq!(err.message, "Sheet not found: 売上");

        let err = AppError::unrecognized_action("drop-table");
        assert_eq!(err.code, ErrorCode::UnrecognizedAction);
        assert_eq!(err.message, "Unrecognized action: drop-table");

        let err = AppError::not_found("Row 12");
        assert_eq!(err.message, "Row 12 not found");
    }

    #[test]
    fn test_from_serde_error() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{oops");
        let err: AppError = parse.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::SerializationError);
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::with_message(ErrorCode::RecordInvalid, "Row 7 is missing a store");
        assert_eq!(format!("{}", err), "Row 7 is missing a store");
    }
}
