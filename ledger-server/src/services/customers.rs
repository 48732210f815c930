//! Customer-intake listings

use shared::models::CustomerIntakeEntry;
use shared::{AppError, AppResult};
use std::sync::Arc;

use crate::ingest::{Schema, map_intake, normalize_store};
use crate::source::TabularSource;
use crate::utils::time::{format_ymd, parse_ymd};

#[derive(Clone)]
pub struct CustomerService {
    source: Arc<dyn TabularSource>,
    schema: Arc<Schema>,
}

impl CustomerService {
    pub fn new(source: Arc<dyn TabularSource>, schema: Arc<Schema>) -> Self {
        Self { source, schema }
    }

    fn read_store(&self, store: &str, sheet: &str) -> AppResult<Vec<CustomerIntakeEntry>> {
        let rows = self.source.read_all(sheet)?;
        Ok(map_intake(&rows, store, &self.schema))
    }

    /// Every store's intake entries, in schema order
    pub fn list_all(&self) -> AppResult<Vec<CustomerIntakeEntry>> {
        let mut entries = Vec::new();
        for intake in &self.schema.intake_sheets {
            entries.extend(self.read_store(&intake.store, &intake.sheet)?);
        }
        Ok(entries)
    }

    /// One store's entries; `store` may be any known alias
    pub fn list_by_store(&self, store: &str) -> AppResult<Vec<CustomerIntakeEntry>> {
        let canonical = normalize_store(store, &self.schema.store_aliases);
        if canonical.is_empty() {
            return Err(AppError::validation("store is required"));
        }
        let intake = self
            .schema
            .intake_sheet_for(&canonical)
            .ok_or_else(|| AppError::not_found(format!("Store {canonical}")))?;
        self.read_store(&intake.store, &intake.sheet)
    }

    /// Entries whose date falls on `day` (`YYYY/M/D`)
    ///
    /// Entry dates with a time suffix or zero padding still match.
    pub fn list_for_day(&self, day: &str) -> AppResult<Vec<CustomerIntakeEntry>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|entry| {
                parse_ymd(&entry.date)
                    .map(format_ymd)
                    .is_some_and(|date| date == day)
            })
            .collect())
    }

    pub fn canonical_store(&self, store: &str) -> String {
        normalize_store(store, &self.schema.store_aliases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Cell, MemorySource};
    use shared::ErrorCode;

    fn intake_sheet(rows: &[(&str, &str)]) -> Vec<Vec<Cell>> {
        let mut out = vec![vec![Cell::from("タイムスタンプ"), Cell::from("氏名")]];
        out.extend(rows.iter().map(|(d, n)| vec![Cell::from(*d), Cell::from(*n)]));
        out
    }

    fn service() -> CustomerService {
        let source = MemorySource::new()
            .with_sheet("問診票_千葉", intake_sheet(&[("2024/5/1 10:00", "山田"), ("2024/5/2", "佐藤")]))
            .with_sheet("問診票_船橋", intake_sheet(&[("2024-05-01", "鈴木")]))
            .with_sheet("問診票_柏", intake_sheet(&[]));
        CustomerService::new(Arc::new(source), Arc::new(Schema::default()))
    }

    #[test]
    fn test_list_all_spans_stores() {
        let entries = service().list_all().unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["chiba-1", "chiba-2", "funabashi-1"]);
    }

    #[test]
    fn test_list_by_store_accepts_alias() {
        let entries = service().list_by_store("船橋店").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].field("name"), "鈴木");

        let err = service().list_by_store("tokyo").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_list_for_day_matches_any_date_form() {
        let entries = service().list_for_day("2024/5/1").unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.field("name")).collect();
        assert_eq!(names, vec!["山田", "鈴木"]);
    }

    #[test]
    fn test_missing_sheet_is_an_error() {
        let source = MemorySource::new().with_sheet("問診票_千葉", intake_sheet(&[]));
        let svc = CustomerService::new(Arc::new(source), Arc::new(Schema::default()));
        let err = svc.list_all().unwrap_err();
        assert_eq!(err.code, ErrorCode::SheetNotFound);
    }
}
