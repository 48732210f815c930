//! Session store
//!
//! Sessions are JSON records under `session:{token}` in the [`KvStore`].
//! An expired session is deleted the moment it is looked at and reported
//! exactly like a token that never existed.

use shared::models::{Role, Session};
use shared::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

use super::password::generate_token;
use crate::kv::KvStore;
use crate::utils::Clock;

const PREFIX: &str = "session:";

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { kv, clock, ttl }
    }

    fn storage_key(token: &str) -> String {
        format!("{PREFIX}{token}")
    }

    /// Issue a fresh session
    pub fn create(
        &self,
        role: Role,
        store: Option<String>,
        staff: Option<String>,
    ) -> AppResult<Session> {
        let now = self.clock.now_millis();
        let ttl_millis = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        let session = Session {
            token: generate_token()?,
            role,
            store: store.filter(|s| !s.is_empty()),
            staff: staff.filter(|s| !s.is_empty()),
            created_at: now,
            expires_at: now.saturating_add(ttl_millis),
        };

        let record = serde_json::to_string(&session)?;
        self.kv.put(&Self::storage_key(&session.token), &record)?;

        tracing::info!(
            role = %session.role,
            store = session.store.as_deref().unwrap_or(""),
            staff = session.staff.as_deref().unwrap_or(""),
            "Session created"
        );
        Ok(session)
    }

    /// Live session for `token` that grants `required`
    pub fn verify(&self, token: &str, required: Role) -> AppResult<Session> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::session_invalid());
        }

        let key = Self::storage_key(token);
        let Some(record) = self.kv.get(&key)? else {
            return Err(AppError::session_invalid());
        };

        let session: Session = match serde_json::from_str(&record) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt session record dropped");
                self.kv.delete(&key)?;
                return Err(AppError::session_invalid());
            }
        };

        if session.is_expired_at(self.clock.now_millis()) {
            self.kv.delete(&key)?;
            tracing::debug!(role = %session.role, "Expired session removed");
            return Err(AppError::session_invalid());
        }

        if !session.role.satisfies(required) {
            return Err(AppError::permission_denied(format!(
                "A {} session cannot open {} pages",
                session.role, required
            )));
        }

        Ok(session)
    }

    /// Delete a session; returns whether one existed
    pub fn revoke(&self, token: &str) -> AppResult<bool> {
        let key = Self::storage_key(token.trim());
        let existed = self.kv.get(&key)?.is_some();
        self.kv.delete(&key)?;
        if existed {
            tracing::info!("Session revoked");
        }
        Ok(existed)
    }

    /// Delete every expired (or unreadable) session; returns how many went
    pub fn purge_expired(&self) -> AppResult<usize> {
        let now = self.clock.now_millis();
        let mut removed = 0;

        for key in self.kv.keys_with_prefix(PREFIX)? {
            let Some(record) = self.kv.get(&key)? else {
                continue;
            };
            let dead = serde_json::from_str::<Session>(&record)
                .map(|s| s.is_expired_at(now))
                .unwrap_or(true);
            if dead {
                self.kv.delete(&key)?;
                removed += 1;
            }
        }

        if removed > 0 {
            tracing::info!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }
}
