//! Row → record mapping
//!
//! Every cell is read through a [`ColumnMap`]; an unresolved column, a short
//! row and an unparsable value all read as the empty value (`0` or `""`).

use chrono_tz::Tz;
use shared::models::{CustomerIntakeEntry, SalesEntry};

use super::columns::{ColumnMap, resolve};
use super::schema::{Schema, intake_field, sales_field};
use super::stores::normalize_store;
use crate::source::{Cell, Row};
use crate::utils::time::{format_ymd, local_ymd, parse_ymd};

/// Non-negative integer value of a cell, `0` when absent or unparsable
pub fn coerce_int(cell: Option<&Cell>) -> i64 {
    let value = match cell {
        Some(Cell::Number(n)) if n.is_finite() => n.trunc() as i64,
        Some(Cell::Text(text)) => parse_int_prefix(text),
        _ => 0,
    };
    value.max(0)
}

/// Leading integer of `text` after folding full-width digits and dropping
/// thousands separators: `"1,000円"` → 1000, `"12.5"` → 12, `"¥100"` → 0
pub fn parse_int_prefix(text: &str) -> i64 {
    let folded: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '，'))
        .map(fold_width)
        .collect();

    let mut chars = folded.chars().peekable();
    let negative = match chars.peek() {
        Some('-') => {
            chars.next();
            true
        }
        Some('+') => {
            chars.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for c in chars {
        let Some(digit) = c.to_digit(10) else {
            break;
        };
        value = value.saturating_mul(10).saturating_add(digit as i64);
    }
    if negative { -value } else { value }
}

fn fold_width(c: char) -> char {
    match c {
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
        '－' => '-',
        '＋' => '+',
        other => other,
    }
}

/// Text value of a cell; native dates render as `YYYY/M/D` in `tz`
pub fn text_value(cell: Option<&Cell>, tz: Tz) -> String {
    match cell {
        Some(Cell::Date { date }) => local_ymd(*date, tz),
        Some(other) => other.to_text().trim().to_string(),
        None => String::new(),
    }
}

/// Date value of a cell
///
/// Native dates are formatted in the schema's zone. Typed text passes through
/// unless `normalize_text_dates` is on and the text parses as a date.
pub fn date_value(cell: Option<&Cell>, schema: &Schema) -> String {
    let text = text_value(cell, schema.time_zone);
    if schema.normalize_text_dates
        && matches!(cell, Some(Cell::Text(_)))
        && let Some(date) = parse_ymd(&text)
    {
        return format_ymd(date);
    }
    text
}

/// Map the sales sheet (header row first) to entries
pub fn map_sales(rows: &[Row], schema: &Schema) -> Vec<SalesEntry> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };
    let columns = resolve(header, &schema.sales_fields, schema.claim_policy);

    data.iter()
        .enumerate()
        .filter_map(|(offset, row)| map_sales_row(row, offset + 1, &columns, schema))
        .collect()
}

/// Map one data row; `position` is its 1-based offset below the header
pub fn map_sales_row(
    row: &[Cell],
    position: usize,
    columns: &ColumnMap,
    schema: &Schema,
) -> Option<SalesEntry> {
    use sales_field::*;

    let tz = schema.time_zone;
    let date = date_value(columns.cell(row, DATE), schema);
    let store = normalize_store(
        &text_value(columns.cell(row, STORE), tz),
        &schema.store_aliases,
    );
    let staff = text_value(columns.cell(row, STAFF), tz).to_lowercase();
    if date.is_empty() || store.is_empty() || staff.is_empty() {
        return None;
    }

    let id = Some(text_value(columns.cell(row, ID), tz))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| position.to_string());
    let int = |field: &str| coerce_int(columns.cell(row, field));

    let mut entry = SalesEntry {
        id,
        date,
        store,
        staff,
        ..Default::default()
    };
    entry.sales.cash = int(CASH);
    entry.sales.credit = int(CREDIT);
    entry.sales.qr = int(QR);
    entry.sales.product = int(PRODUCT);
    entry.discounts.hpb_points = int(HPB_POINTS);
    entry.discounts.hpb_gift = int(HPB_GIFT);
    entry.discounts.other = int(OTHER_DISCOUNT);
    entry.discounts.refund = int(REFUND);
    entry.customer_counts.new_primary_channel = int(NEW_PRIMARY);
    entry.customer_counts.new_secondary_channel = int(NEW_SECONDARY);
    entry.customer_counts.existing = int(EXISTING);
    entry.customer_counts.acquaintance = int(ACQUAINTANCE);
    entry.next_bookings.new_primary_channel = int(NEXT_NEW_PRIMARY);
    entry.next_bookings.new_secondary_channel = int(NEXT_NEW_SECONDARY);
    entry.next_bookings.existing = int(NEXT_EXISTING);
    entry.review_count = int(REVIEW_COUNT);
    entry.blog_update_count = int(BLOG_UPDATE_COUNT);
    entry.sns_update_count = int(SNS_UPDATE_COUNT);
    Some(entry)
}

/// Map one store's intake sheet (header row first) to entries
///
/// A row is kept when it has a date or a name.
pub fn map_intake(rows: &[Row], store: &str, schema: &Schema) -> Vec<CustomerIntakeEntry> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };
    let columns = resolve(header, &schema.intake_fields, schema.claim_policy);
    let tz = schema.time_zone;

    data.iter()
        .enumerate()
        .filter_map(|(offset, row)| {
            let date = date_value(columns.cell(row, intake_field::DATE), schema);
            let fields: std::collections::BTreeMap<String, String> = schema
                .intake_topics()
                .map(|topic| (topic.to_string(), text_value(columns.cell(row, topic), tz)))
                .collect();

            let has_name = fields
                .get(intake_field::NAME)
                .is_some_and(|name| !name.is_empty());
            if date.is_empty() && !has_name {
                return None;
            }

            Some(CustomerIntakeEntry {
                id: format!("{store}-{}", offset + 1),
                store: store.to_string(),
                date,
                fields,
            })
        })
        .collect()
}
