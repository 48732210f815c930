//! Shared types for the store ledger gateway
//!
//! Error codes, the application error type, and the record models served by
//! `ledger-server`.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
