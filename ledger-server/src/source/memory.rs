//! In-process tabular source

use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{Cell, Row, SourceError, SourceResult, TabularSource};

/// Sheets held in memory behind a read-write lock
#[derive(Debug, Default)]
pub struct MemorySource {
    sheets: RwLock<BTreeMap<String, Vec<Row>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sheets(sheets: BTreeMap<String, Vec<Row>>) -> Self {
        Self {
            sheets: RwLock::new(sheets),
        }
    }

    /// Builder used by tests and seeding
    pub fn with_sheet(self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.sheets.write().insert(name.into(), rows);
        self
    }

    /// Copy of every sheet (for persistence)
    pub fn export(&self) -> BTreeMap<String, Vec<Row>> {
        self.sheets.read().clone()
    }

    pub fn into_sheets(self) -> BTreeMap<String, Vec<Row>> {
        self.sheets.into_inner()
    }

    /// Swap in a whole new set of sheets
    pub fn replace_all(&self, sheets: BTreeMap<String, Vec<Row>>) {
        *self.sheets.write() = sheets;
    }
}

impl TabularSource for MemorySource {
    fn has_sheet(&self, sheet: &str) -> SourceResult<bool> {
        Ok(self.sheets.read().contains_key(sheet))
    }

    fn create_sheet(&self, sheet: &str, header: Row) -> SourceResult<()> {
        self.sheets
            .write()
            .entry(sheet.to_string())
            .or_insert_with(|| vec![header]);
        Ok(())
    }

    fn read_all(&self, sheet: &str) -> SourceResult<Vec<Row>> {
        self.sheets
            .read()
            .get(sheet)
            .cloned()
            .ok_or_else(|| SourceError::SheetNotFound(sheet.to_string()))
    }

    fn write_range(
        &self,
        sheet: &str,
        row: usize,
        col: usize,
        values: &[Row],
    ) -> SourceResult<()> {
        let mut sheets = self.sheets.write();
        let grid = sheets
            .get_mut(sheet)
            .ok_or_else(|| SourceError::SheetNotFound(sheet.to_string()))?;

        for (offset, source_row) in values.iter().enumerate() {
            let target = row + offset;
            if grid.len() <= target {
                grid.resize_with(target + 1, Vec::new);
            }
            let cells = &mut grid[target];
            let needed = col + source_row.len();
            if cells.len() < needed {
                cells.resize(needed, Cell::Empty);
            }
            for (i, value) in source_row.iter().enumerate() {
                cells[col + i] = value.clone();
            }
        }
        Ok(())
    }

    fn append_row(&self, sheet: &str, row: Row) -> SourceResult<usize> {
        let mut sheets = self.sheets.write();
        let grid = sheets
            .get_mut(sheet)
            .ok_or_else(|| SourceError::SheetNotFound(sheet.to_string()))?;
        grid.push(row);
        Ok(grid.len() - 1)
    }
}
