use shared::AppError;
use thiserror::Error;

use crate::kv::KvError;
use crate::source::SourceError;

/// Errors that stop the server from starting or serving
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Workbook error: {0}")]
    Workbook(#[from] SourceError),

    #[error("State store error: {0}")]
    State(#[from] KvError),

    #[error("Schema error: {0}")]
    Schema(AppError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
