//! Credential Set Model
//!
//! Stored as one JSON blob:
//!
//! ```json
//! {
//!   "admin": "$argon2id$...",
//!   "stores": { "chiba": "$argon2id$..." },
//!   "staff": { "chiba": { "yui": "$argon2id$..." } }
//! }
//! ```
//!
//! An empty string means "no password configured" for that slot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::session::Role;

/// Placeholder sent to clients in place of a configured secret
pub const REDACTED: &str = "********";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSet {
    #[serde(default)]
    pub admin: String,
    /// Store-wide password, used when a staff member has none of their own
    #[serde(default)]
    pub stores: BTreeMap<String, String>,
    /// store → staff → password
    #[serde(default)]
    pub staff: BTreeMap<String, BTreeMap<String, String>>,
}

impl CredentialSet {
    /// Secret guarding `role` at the given scope, `None` when nothing is configured
    pub fn lookup(&self, role: Role, store: &str, staff: &str) -> Option<&str> {
        let found = match role {
            Role::Admin => Some(self.admin.as_str()),
            Role::Staff => self
                .staff
                .get(store)
                .and_then(|members| members.get(staff))
                .filter(|secret| !secret.is_empty())
                .or_else(|| self.stores.get(store))
                .map(String::as_str),
        };
        found.filter(|secret| !secret.is_empty())
    }

    /// Visit every secret slot
    pub fn secrets_mut(&mut self) -> impl Iterator<Item = &mut String> {
        std::iter::once(&mut self.admin)
            .chain(self.stores.values_mut())
            .chain(self.staff.values_mut().flat_map(|m| m.values_mut()))
    }

    /// Copy with every configured secret replaced by [`REDACTED`]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for secret in copy.secrets_mut() {
            if !secret.is_empty() {
                *secret = REDACTED.to_string();
            }
        }
        copy
    }

    /// Replace every [`REDACTED`] slot with the value `existing` holds there
    pub fn restore_redacted(&mut self, existing: &CredentialSet) {
        if self.admin == REDACTED {
            self.admin = existing.admin.clone();
        }
        for (store, secret) in self.stores.iter_mut() {
            if secret == REDACTED {
                *secret = existing.stores.get(store).cloned().unwrap_or_default();
            }
        }
        for (store, members) in self.staff.iter_mut() {
            for (name, secret) in members.iter_mut() {
                if secret == REDACTED {
                    *secret = existing
                        .staff
                        .get(store)
                        .and_then(|m| m.get(name))
                        .cloned()
                        .unwrap_or_default();
                }
            }
        }
    }
}
