//! JSON workbook file
//!
//! One document holding every sheet:
//!
//! ```json
//! { "sheets": { "売上": [["日付", "店舗", ...], [...]], "config": [...] } }
//! ```
//!
//! Reads are served from memory. Every mutation is written to a temp file
//! next to the workbook and renamed over it before the call returns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{Cell, MemorySource, Row, SourceResult, TabularSource};

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkbookDocument {
    #[serde(default)]
    sheets: BTreeMap<String, Vec<Row>>,
}

/// File-backed tabular source
#[derive(Debug)]
pub struct WorkbookFile {
    path: PathBuf,
    inner: MemorySource,
    write_lock: parking_lot::Mutex<()>,
}

impl WorkbookFile {
    /// Open the workbook at `path`, starting empty when the file does not exist
    pub fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref().to_path_buf();
        let document = if path.exists() {
            let bytes = std::fs::read(&path)?;
            serde_json::from_slice::<WorkbookDocument>(&bytes)?
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            WorkbookDocument::default()
        };

        tracing::info!(
            path = %path.display(),
            sheets = document.sheets.len(),
            "Workbook opened"
        );

        Ok(Self {
            path,
            inner: MemorySource::from_sheets(document.sheets),
            write_lock: parking_lot::Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, sheets: BTreeMap<String, Vec<Row>>) -> SourceResult<()> {
        let document = WorkbookDocument { sheets };
        let bytes = serde_json::to_vec_pretty(&document)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Run a mutation on a staged copy, persist it, then publish it
    ///
    /// Readers never see a change that did not reach the disk.
    fn mutate<T>(&self, op: impl FnOnce(&MemorySource) -> SourceResult<T>) -> SourceResult<T> {
        let _guard = self.write_lock.lock();
        let staged = MemorySource::from_sheets(self.inner.export());
        let result = op(&staged)?;
        let sheets = staged.into_sheets();
        if let Err(e) = self.flush(sheets.clone()) {
            tracing::error!(path = %self.path.display(), error = %e, "Workbook flush failed");
            return Err(e);
        }
        self.inner.replace_all(sheets);
        Ok(result)
    }
}

impl TabularSource for WorkbookFile {
    fn has_sheet(&self, sheet: &str) -> SourceResult<bool> {
        self.inner.has_sheet(sheet)
    }

    fn create_sheet(&self, sheet: &str, header: Row) -> SourceResult<()> {
        if self.inner.has_sheet(sheet)? {
            return Ok(());
        }
        tracing::info!(sheet = %sheet, "Creating sheet");
        self.mutate(|inner| inner.create_sheet(sheet, header))
    }

    fn read_all(&self, sheet: &str) -> SourceResult<Vec<Row>> {
        self.inner.read_all(sheet)
    }

    fn write_range(
        &self,
        sheet: &str,
        row: usize,
        col: usize,
        values: &[Row],
    ) -> SourceResult<()> {
        self.mutate(|inner| inner.write_range(sheet, row, col, values))
    }

    fn write_cell(&self, sheet: &str, row: usize, col: usize, value: Cell) -> SourceResult<()> {
        self.mutate(|inner| inner.write_cell(sheet, row, col, value))
    }

    fn append_row(&self, sheet: &str, row: Row) -> SourceResult<usize> {
        self.mutate(|inner| inner.append_row(sheet, row))
    }
}
