//! Sales listing and mutations
//!
//! Batch updates read the whole sheet, patch the matched rows in memory and
//! write the whole sheet back. A concurrent writer between the read and the
//! write loses (last write wins).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{SalesEntry, SalesRecordInput};
use shared::{AppError, AppResult, ErrorCode};
use std::sync::Arc;

use crate::ingest::mapper::parse_int_prefix;
use crate::ingest::schema::sales_field;
use crate::ingest::{ColumnMap, FieldKeywords, Schema, map_sales, resolve};
use crate::source::{Cell, Row, TabularSource};
use crate::utils::time::{local_midnight, parse_ymd};

/// Result of `update-sales-rows`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub updated: usize,
    /// Ids that matched no row
    pub missing: Vec<String>,
}

const TEXT_FIELDS: [&str; 4] = [
    sales_field::ID,
    sales_field::DATE,
    sales_field::STORE,
    sales_field::STAFF,
];

/// Logical field addressed by an input key: exact path first, then the first
/// declared field whose path ends in `.{key}`
fn field_for_key<'a>(key: &str, fields: &'a [FieldKeywords]) -> Option<&'a str> {
    let exact = fields.iter().find(|f| f.field == key);
    exact
        .or_else(|| {
            let suffix = format!(".{key}");
            fields.iter().find(|f| f.field.ends_with(&suffix))
        })
        .map(|f| f.field.as_str())
}

#[derive(Clone)]
pub struct SalesService {
    source: Arc<dyn TabularSource>,
    schema: Arc<Schema>,
}

impl SalesService {
    pub fn new(source: Arc<dyn TabularSource>, schema: Arc<Schema>) -> Self {
        Self { source, schema }
    }

    fn sheet(&self) -> &str {
        &self.schema.sales_sheet
    }

    pub fn list(&self) -> AppResult<Vec<SalesEntry>> {
        let rows = self.source.read_all(self.sheet())?;
        Ok(map_sales(&rows, &self.schema))
    }

    /// Cell to store for `field` given a client value
    ///
    /// Dates become native date cells (local midnight) when they parse;
    /// numeric fields become numbers.
    fn cell_for(&self, field: &str, value: &Value) -> Cell {
        match value {
            Value::Null => Cell::Empty,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => Cell::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) if field == sales_field::DATE => parse_ymd(s)
                .map(|d| Cell::date(local_midnight(d, self.schema.time_zone)))
                .unwrap_or_else(|| Cell::from(s.as_str())),
            Value::String(s) if TEXT_FIELDS.contains(&field) => Cell::from(s.trim()),
            Value::String(s) => Cell::from(parse_int_prefix(s).max(0)),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Write the input's fields into `row`; unknown keys and unresolved
    /// columns are skipped
    fn patch_row(&self, row: &mut Row, input: &SalesRecordInput, columns: &ColumnMap) -> usize {
        let mut written = 0;
        for (key, value) in input.flattened() {
            let Some(field) = field_for_key(&key, &self.schema.sales_fields) else {
                tracing::debug!(key = %key, "Ignoring unknown sales field");
                continue;
            };
            if field == sales_field::ID {
                continue;
            }
            let Some(col) = columns.get(field) else {
                continue;
            };
            if row.len() <= col {
                row.resize(col + 1, Cell::Empty);
            }
            row[col] = self.cell_for(field, &value);
            written += 1;
        }
        written
    }

    /// Index into `rows` (header at 0) of the row `id` names
    fn locate(rows: &[Row], id: &str, columns: &ColumnMap) -> Option<usize> {
        if let Some(id_col) = columns.get(sales_field::ID) {
            let by_id = rows
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, row)| row.get(id_col).is_some_and(|c| c.to_text().trim() == id))
                .map(|(idx, _)| idx);
            if by_id.is_some() {
                return by_id;
            }
        }
        // Positional fallback (1-based offset below the header)
        id.parse::<usize>()
            .ok()
            .filter(|pos| *pos >= 1 && *pos < rows.len())
    }

    pub fn update_rows(&self, inputs: &[SalesRecordInput]) -> AppResult<UpdateSummary> {
        let mut rows = self.source.read_all(self.sheet())?;
        let Some(header) = rows.first() else {
            return Err(AppError::validation("Sales sheet has no header row"));
        };
        let columns = resolve(header, &self.schema.sales_fields, self.schema.claim_policy);

        let mut summary = UpdateSummary::default();
        for input in inputs {
            let Some(id) = input.id_text() else {
                summary.missing.push(String::new());
                continue;
            };
            match Self::locate(&rows, &id, &columns) {
                Some(idx) => {
                    self.patch_row(&mut rows[idx], input, &columns);
                    summary.updated += 1;
                }
                None => summary.missing.push(id),
            }
        }

        if summary.updated > 0 {
            self.source.write_range(self.sheet(), 0, 0, &rows)?;
        }
        tracing::info!(
            updated = summary.updated,
            missing = summary.missing.len(),
            "Sales rows updated"
        );
        Ok(summary)
    }

    /// Append a record; returns its id
    pub fn add_record(&self, input: &SalesRecordInput) -> AppResult<String> {
        let sheet = self.sheet();
        if !self.source.has_sheet(sheet)? {
            let header = self
                .schema
                .default_sales_header()
                .into_iter()
                .map(Cell::from)
                .collect();
            self.source.create_sheet(sheet, header)?;
        }

        let rows = self.source.read_all(sheet)?;
        let header = rows.first().cloned().unwrap_or_default();
        let columns = resolve(&header, &self.schema.sales_fields, self.schema.claim_policy);

        let mut row: Row = vec![Cell::Empty; header.len()];
        self.patch_row(&mut row, input, &columns);

        // The row must survive the read path
        if map_sales(&[header, row.clone()], &self.schema).is_empty() {
            return Err(AppError::with_message(
                ErrorCode::RecordInvalid,
                "date, store and staff are required",
            ));
        }

        let durable_id = columns.get(sales_field::ID).map(|col| {
            let id = uuid::Uuid::new_v4().to_string();
            row[col] = Cell::from(id.as_str());
            id
        });

        let idx = self.source.append_row(sheet, row)?;
        let id = durable_id.unwrap_or_else(|| idx.to_string());
        tracing::info!(id = %id, "Sales record added");
        Ok(id)
    }
}
