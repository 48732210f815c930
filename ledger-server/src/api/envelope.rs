//! Handler result envelope
//!
//! ```json
//! { "kind": "ok",  "payload": [...] }
//! { "kind": "err", "code": 3001, "message": "Sheet not found: 売上" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{AppError, AppResult, ErrorCategory, ErrorCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outcome {
    Ok { payload: Value },
    Err { code: ErrorCode, message: String },
}

impl Outcome {
    pub fn ok(payload: impl Serialize) -> Self {
        match serde_json::to_value(payload) {
            Ok(payload) => Self::Ok { payload },
            Err(e) => Self::from_error(e.into()),
        }
    }

    /// Render an error; system-category errors are logged here
    pub fn from_error(err: AppError) -> Self {
        if err.code.category() == ErrorCategory::System {
            tracing::error!(code = %err.code, details = ?err.details, "{}", err.message);
        } else {
            tracing::debug!(code = %err.code, "{}", err.message);
        }
        Self::Err {
            code: err.code,
            message: err.message,
        }
    }

    pub fn from_result<T: Serialize>(result: AppResult<T>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}
