//! Sales Entry Model (日次売上)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Till takings by payment channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesAmounts {
    pub cash: i64,
    pub credit: i64,
    pub qr: i64,
    /// Retail product sales
    pub product: i64,
}

/// Discounts and refunds applied on the day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discounts {
    /// Booking-portal point redemptions
    pub hpb_points: i64,
    /// Booking-portal gift vouchers
    pub hpb_gift: i64,
    pub other: i64,
    pub refund: i64,
}

/// Customers served, split by acquisition channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCounts {
    pub new_primary_channel: i64,
    pub new_secondary_channel: i64,
    pub existing: i64,
    pub acquaintance: i64,
}

/// Follow-up bookings taken at checkout
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextBookings {
    pub new_primary_channel: i64,
    pub new_secondary_channel: i64,
    pub existing: i64,
}

/// One staff member's day at one store
///
/// `id` is the durable id column when the sheet has one, otherwise the
/// 1-based offset into the data rows. Positional ids shift when rows are
/// inserted or deleted above them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesEntry {
    pub id: String,
    /// `YYYY/M/D` for native date cells, the raw text otherwise
    pub date: String,
    pub store: String,
    pub staff: String,
    pub sales: SalesAmounts,
    pub discounts: Discounts,
    pub customer_counts: CustomerCounts,
    pub next_bookings: NextBookings,
    pub review_count: i64,
    pub blog_update_count: i64,
    pub sns_update_count: i64,
}

/// Client-supplied sales record for `add-sales-record` / `update-sales-rows`
///
/// Fields are addressed by their logical paths (`sales.cash`,
/// `nextBookings.existing`, ...), either dotted or grouped the way
/// [`SalesEntry`] serializes them. Bare leaf names (`cash`) are accepted too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesRecordInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SalesRecordInput {
    /// Flatten one level of grouping: `{"sales": {"cash": 1}}` → `("sales.cash", 1)`
    pub fn flattened(&self) -> Vec<(String, Value)> {
        let mut out = Vec::with_capacity(self.fields.len());
        for (key, value) in &self.fields {
            match value {
                Value::Object(group) => {
                    out.extend(
                        group
                            .iter()
                            .map(|(k, v)| (format!("{key}.{k}"), v.clone())),
                    );
                }
                _ => out.push((key.clone(), value.clone())),
            }
        }
        out
    }

    /// Id rendered as text (numbers are accepted for positional ids)
    pub fn id_text(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
