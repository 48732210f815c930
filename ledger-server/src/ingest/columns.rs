//! Column resolution
//!
//! Maps logical fields to column indexes by keyword search over the header
//! row, so renamed or reordered headers keep working. Comparison is
//! case-insensitive substring matching on trimmed header text, or whole-cell
//! equality for fields marked `exact`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::schema::FieldKeywords;
use crate::source::Cell;

/// How a header cell may be shared between fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimPolicy {
    /// A header cell belongs to the first declared field that matches it
    #[default]
    Exclusive,
    /// Fields resolve independently and may land on the same column
    Shared,
}

/// Resolved field → column index; absent fields are not found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: BTreeMap<String, usize>,
}

impl ColumnMap {
    pub fn get(&self, field: &str) -> Option<usize> {
        self.columns.get(field).copied()
    }

    /// Cell for `field` in `row`; `None` when unresolved or the row is short
    pub fn cell<'a>(&self, row: &'a [Cell], field: &str) -> Option<&'a Cell> {
        self.get(field).and_then(|idx| row.get(idx))
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Resolve every field in `groups` against `header`
pub fn resolve(header: &[Cell], groups: &[FieldKeywords], policy: ClaimPolicy) -> ColumnMap {
    let headers: Vec<String> = header.iter().map(|c| normalize(&c.to_text())).collect();
    let mut claimed = vec![false; headers.len()];
    let mut columns = BTreeMap::new();

    for group in groups {
        let keywords: Vec<String> = group
            .keywords
            .iter()
            .map(|k| normalize(k))
            .filter(|k| !k.is_empty())
            .collect();

        let found = headers.iter().enumerate().position(|(idx, text)| {
            let available = policy == ClaimPolicy::Shared || !claimed[idx];
            available
                && !text.is_empty()
                && keywords.iter().any(|k| {
                    if group.exact {
                        text == k
                    } else {
                        text.contains(k.as_str())
                    }
                })
        });

        if let Some(idx) = found {
            claimed[idx] = true;
            columns.insert(group.field.clone(), idx);
        }
    }

    ColumnMap { columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|c| Cell::from(*c)).collect()
    }

    #[test]
    fn test_resolves_name_column() {
        let h = header(&["タイムスタンプ", "氏名", "電話番号"]);
        let groups = [FieldKeywords::new("name", &["氏名", "名前"])];
        let map = resolve(&h, &groups, ClaimPolicy::Exclusive);
        assert_eq!(map.get("name"), Some(1));
    }

    #[test]
    fn test_missing_field_is_not_found() {
        let h = header(&["日付", "店舗"]);
        let groups = [FieldKeywords::new("email", &["メール"])];
        let map = resolve(&h, &groups, ClaimPolicy::Exclusive);
        assert_eq!(map.get("email"), None);
        assert!(map.cell(&h, "email").is_none());
    }

    #[test]
    fn test_case_insensitive_and_trimmed() {
        let h = header(&["  Date ", "SNS更新"]);
        let groups = [
            FieldKeywords::new("date", &["DATE"]),
            FieldKeywords::new("sns", &["sns"]),
        ];
        let map = resolve(&h, &groups, ClaimPolicy::Exclusive);
        assert_eq!(map.get("date"), Some(0));
        assert_eq!(map.get("sns"), Some(1));
    }

    #[test]
    fn test_first_matching_cell_wins() {
        let h = header(&["メモ", "現金売上", "現金(予備)"]);
        let groups = [FieldKeywords::new("cash", &["現金"])];
        assert_eq!(resolve(&h, &groups, ClaimPolicy::Exclusive).get("cash"), Some(1));
    }

    #[test]
    fn test_claim_policies_differ_on_ambiguous_header() {
        let h = header(&["次回予約既存", "既存"]);
        let groups = [
            FieldKeywords::new("nextExisting", &["次回予約既存"]),
            FieldKeywords::new("existing", &["既存"]),
        ];

        let exclusive = resolve(&h, &groups, ClaimPolicy::Exclusive);
        assert_eq!(exclusive.get("nextExisting"), Some(0));
        assert_eq!(exclusive.get("existing"), Some(1));

        let shared = resolve(&h, &groups, ClaimPolicy::Shared);
        assert_eq!(shared.get("existing"), Some(0));
    }

    #[test]
    fn test_deterministic() {
        let h = header(&["日付", "店舗", "担当"]);
        let groups = [
            FieldKeywords::new("store", &["店舗"]),
            FieldKeywords::new("staff", &["担当"]),
        ];
        assert_eq!(
            resolve(&h, &groups, ClaimPolicy::Exclusive),
            resolve(&h, &groups, ClaimPolicy::Exclusive)
        );
    }

    #[test]
    fn test_exact_field_ignores_longer_headers() {
        let h = header(&["Paid", "Valid?", " ID ", "日付"]);
        let groups = [FieldKeywords::exact("id", &["id"])];
        assert_eq!(resolve(&h, &groups, ClaimPolicy::Exclusive).get("id"), Some(2));

        let no_id = header(&["Paid", "日付"]);
        assert_eq!(resolve(&no_id, &groups, ClaimPolicy::Exclusive).get("id"), None);
    }

    #[test]
    fn test_empty_header_cells_never_match() {
        let h = vec![Cell::Empty, Cell::from("氏名")];
        let groups = [FieldKeywords::new("name", &["", "氏名"])];
        assert_eq!(resolve(&h, &groups, ClaimPolicy::Exclusive).get("name"), Some(1));
    }
}
