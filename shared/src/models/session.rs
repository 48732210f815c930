//! Session Model

use serde::{Deserialize, Serialize};

/// Dashboard role a session was granted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    /// Parse the `pageType` request parameter
    pub fn from_page_type(page_type: &str) -> Option<Self> {
        match page_type.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }

    /// Admin sessions open staff pages too; staff sessions never open admin pages.
    pub fn satisfies(&self, required: Role) -> bool {
        matches!((self, required), (Self::Admin, _) | (Self::Staff, Self::Staff))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated, time-bounded access grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff: Option<String>,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis; the session is dead from this instant on
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis >= self.expires_at
    }
}
