//! JSON blobs on a key/value sheet
//!
//! Column A holds the key, column B the serialized value. The sheet is
//! created with a `key | value` header on first write; until then every key
//! reads as absent.

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::AppResult;
use std::sync::Arc;

use crate::source::{Cell, TabularSource};

#[derive(Clone)]
pub struct BlobSheet {
    source: Arc<dyn TabularSource>,
    sheet: String,
}

impl BlobSheet {
    pub fn new(source: Arc<dyn TabularSource>, sheet: impl Into<String>) -> Self {
        Self {
            source,
            sheet: sheet.into(),
        }
    }

    /// Raw stored text for `key`
    pub fn read(&self, key: &str) -> AppResult<Option<String>> {
        if !self.source.has_sheet(&self.sheet)? {
            return Ok(None);
        }
        let rows = self.source.read_all(&self.sheet)?;
        Ok(rows
            .iter()
            .skip(1)
            .find(|row| row.first().is_some_and(|c| c.to_text().trim() == key))
            .and_then(|row| row.get(1))
            .filter(|cell| !cell.is_blank())
            .map(Cell::to_text))
    }

    /// Decoded blob; absent or malformed values read as `T::default()`
    pub fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> AppResult<T> {
        let Some(raw) = self.read(key)? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(
                    sheet = %self.sheet,
                    key = %key,
                    error = %e,
                    "Malformed stored JSON, using empty default"
                );
                Ok(T::default())
            }
        }
    }

    pub fn write(&self, key: &str, value: &str) -> AppResult<()> {
        self.source
            .create_sheet(&self.sheet, vec!["key".into(), "value".into()])?;

        let rows = self.source.read_all(&self.sheet)?;
        let existing = rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| row.first().is_some_and(|c| c.to_text().trim() == key))
            .map(|(idx, _)| idx);

        match existing {
            Some(idx) => self.source.write_cell(&self.sheet, idx, 1, value.into())?,
            None => {
                self.source
                    .append_row(&self.sheet, vec![key.into(), value.into()])?;
            }
        }
        tracing::debug!(sheet = %self.sheet, key = %key, "Blob saved");
        Ok(())
    }

    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let raw = serde_json::to_string(value)?;
        self.write(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use serde_json::{Value, json};

    fn blobs() -> (BlobSheet, Arc<MemorySource>) {
        let source = Arc::new(MemorySource::new());
        (BlobSheet::new(source.clone(), "config"), source)
    }

    #[test]
    fn test_missing_sheet_reads_absent() {
        let (blobs, source) = blobs();
        assert_eq!(blobs.read("goals").unwrap(), None);
        let value: Value = blobs.read_json("goals").unwrap();
        assert_eq!(value, Value::Null);
        assert!(!source.has_sheet("config").unwrap());
    }

    #[test]
    fn test_write_creates_then_updates_in_place() {
        let (blobs, source) = blobs();
        blobs.write_json("goals", &json!({"chiba": 100})).unwrap();
        blobs.write_json("staff", &json!(["yui"])).unwrap();
        blobs.write_json("goals", &json!({"chiba": 200})).unwrap();

        let rows = source.read_all("config").unwrap();
        assert_eq!(rows.len(), 3);
        let goals: Value = blobs.read_json("goals").unwrap();
        assert_eq!(goals, json!({"chiba": 200}));
    }

    #[test]
    fn test_blank_value_reads_absent() {
        let (blobs, source) = blobs();
        source
            .create_sheet("config", vec![Cell::from("key"), Cell::from("value")])
            .unwrap();
        source.append_row("config", vec![Cell::from("goals"), Cell::from("  ")]).unwrap();
        source.append_row("config", vec![Cell::from("staff"), Cell::Empty]).unwrap();
        source.append_row("config", vec![Cell::from("count"), Cell::Number(0.0)]).unwrap();
        assert_eq!(blobs.read("goals").unwrap(), None);
        assert_eq!(blobs.read("staff").unwrap(), None);
        assert_eq!(blobs.read("count").unwrap().as_deref(), Some("0"));
    }

    #[test]
    fn test_malformed_blob_falls_back_to_default() {
        let (blobs, _) = blobs();
        blobs.write("settings", "{not json").unwrap();
        let value: std::collections::BTreeMap<String, Value> = blobs.read_json("settings").unwrap();
        assert!(value.is_empty());
    }
}
