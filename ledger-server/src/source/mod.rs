//! Tabular source abstraction
//!
//! The spreadsheet-like store the ledger reads from and writes to: named
//! sheets, each a 2-D grid of [`Cell`]s. All coordinates are 0-based; row 0
//! of a data sheet is its header row.
//!
//! There are no transactions. A write is visible to the next read from the
//! same process as soon as the call returns.

mod memory;
mod workbook;

pub use memory::MemorySource;
pub use workbook::WorkbookFile;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// A single cell value
///
/// Serialized untagged so a workbook file reads naturally: `null`, `true`,
/// `1000`, `"千葉店"`, `{"date": "2024-05-01T00:00:00Z"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Native date/time value (an instant; rendering picks the time zone)
    Date { date: DateTime<Utc> },
}

impl Cell {
    pub fn date(at: DateTime<Utc>) -> Self {
        Self::Date { date: at }
    }

    /// Empty, or text that is only whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Plain-text rendering; dates render as RFC 3339
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
            Self::Date { date } => date.to_rfc3339(),
        }
    }
}

/// Integral numbers render without a trailing `.0`
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

pub type Row = Vec<Cell>;

/// Source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SourceResult<T> = Result<T, SourceError>;

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::SheetNotFound(sheet) => AppError::sheet_not_found(sheet),
            SourceError::Io(e) => AppError::storage(format!("Tabular source I/O error: {e}")),
            SourceError::Serialization(e) => AppError::with_message(
                ErrorCode::SerializationError,
                format!("Tabular source is corrupt: {e}"),
            ),
        }
    }
}

/// Abstract store of named sheets
pub trait TabularSource: Send + Sync {
    fn has_sheet(&self, sheet: &str) -> SourceResult<bool>;

    /// Create `sheet` with `header` as row 0; no-op if it already exists
    fn create_sheet(&self, sheet: &str, header: Row) -> SourceResult<()>;

    /// Every row of `sheet`, header included
    fn read_all(&self, sheet: &str) -> SourceResult<Vec<Row>>;

    /// Overwrite the rectangle starting at (`row`, `col`), growing the grid as needed
    fn write_range(&self, sheet: &str, row: usize, col: usize, values: &[Row])
    -> SourceResult<()>;

    fn write_cell(&self, sheet: &str, row: usize, col: usize, value: Cell) -> SourceResult<()> {
        self.write_range(sheet, row, col, &[vec![value]])
    }

    /// Append after the last row; returns the new row's index
    fn append_row(&self, sheet: &str, row: Row) -> SourceResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_untagged_serde() {
        let row: Row = serde_json::from_str(
            r#"[null, true, 1000, "千葉店", {"date": "2024-05-01T00:00:00Z"}]"#,
        )
        .unwrap();
        assert_eq!(row[0], Cell::Empty);
        assert_eq!(row[1], Cell::Bool(true));
        assert_eq!(row[2], Cell::Number(1000.0));
        assert_eq!(row[3], Cell::Text("千葉店".into()));
        assert!(matches!(row[4], Cell::Date { .. }));

        let back = serde_json::to_string(&row).unwrap();
        assert!(back.starts_with("[null,true,1000.0,\"千葉店\",{\"date\":"));
    }

    #[test]
    fn test_cell_text_rendering() {
        assert_eq!(Cell::Number(1000.0).to_text(), "1000");
        assert_eq!(Cell::Number(12.5).to_text(), "12.5");
        assert_eq!(Cell::Empty.to_text(), "");
        assert!(Cell::Text("   ".into()).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }

    #[test]
    fn test_source_error_into_app_error() {
        let err: AppError = SourceError::SheetNotFound("売上".into()).into();
        assert_eq!(err.code, ErrorCode::SheetNotFound);
        assert_eq!(err.message, "Sheet not found: 売上");
    }
}
