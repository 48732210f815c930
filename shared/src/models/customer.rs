//! Customer Intake Model (問診票)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One intake-form response
///
/// Free-text answers are keyed by topic (`name`, `phone`, `hairConcern`, ...).
/// Every topic declared by the schema is present; unanswered or unresolvable
/// topics are the empty string, which callers read as "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerIntakeEntry {
    /// `{store}-{offset}`
    pub id: String,
    pub store: String,
    pub date: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl CustomerIntakeEntry {
    /// Topic value, empty when the topic is unknown
    pub fn field(&self, topic: &str) -> &str {
        self.fields.get(topic).map(String::as_str).unwrap_or("")
    }
}
