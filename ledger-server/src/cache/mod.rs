//! Read-through cache with per-key TTL
//!
//! Entries live in the [`KvStore`] under `cache:{key}` as
//! `{"payload": "<json>", "expiresAt": <unix millis>}`.
//!
//! The cache never fails its caller: a store fault on read is a miss, a fault
//! on write or delete is logged and ignored.
//!
//! Every invalidation also bumps a per-key generation (`cachegen:{key}`). A
//! read-through that started before the bump never leaves its result behind.

mod keys;

pub use keys::CacheKey;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::AppResult;
use std::sync::Arc;
use std::time::Duration;

use crate::kv::KvStore;
use crate::utils::Clock;

const PREFIX: &str = "cache:";
const GENERATION_PREFIX: &str = "cachegen:";

/// Serialized payloads above this many characters are not cached
pub const DEFAULT_MAX_PAYLOAD_CHARS: usize = 100_000;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    payload: String,
    expires_at: i64,
}

#[derive(Clone)]
pub struct Cache {
    kv: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    max_payload_chars: usize,
}

impl Cache {
    pub fn new(kv: Arc<dyn KvStore>, clock: Arc<dyn Clock>, max_payload_chars: usize) -> Self {
        Self {
            kv,
            clock,
            max_payload_chars,
        }
    }

    fn storage_key(key: &str) -> String {
        format!("{PREFIX}{key}")
    }

    /// Raw payload for `key`, `None` on miss
    pub fn get(&self, key: &str) -> Option<String> {
        let storage_key = Self::storage_key(key);
        let raw = match self.kv.get(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Corrupt cache entry dropped");
                self.delete_quietly(&storage_key);
                return None;
            }
        };

        if self.clock.now_millis() >= entry.expires_at {
            self.delete_quietly(&storage_key);
            return None;
        }
        Some(entry.payload)
    }

    /// Typed read; a payload that does not decode as `T` is a miss
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = self.get(key)?;
        serde_json::from_str(&payload).ok()
    }

    /// Store `payload` for `ttl`; returns whether it was stored
    pub fn put(&self, key: &str, payload: &str, ttl: Duration) -> bool {
        let size = payload.chars().count();
        if size > self.max_payload_chars {
            tracing::debug!(key = %key, size, "Payload over cache ceiling, not cached");
            return false;
        }

        let entry = CacheEntry {
            payload: payload.to_string(),
            expires_at: self.clock.now_millis() + ttl.as_millis() as i64,
        };
        let stored = serde_json::to_string(&entry)
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                self.kv
                    .put(&Self::storage_key(key), &raw)
                    .map_err(|e| e.to_string())
            });
        match stored {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache write failed");
                false
            }
        }
    }

    /// Serialize and store `value`
    pub fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        match serde_json::to_string(value) {
            Ok(payload) => self.put(key, &payload, ttl),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache payload not serializable");
                false
            }
        }
    }

    /// Drop `key`; the generation moves first so in-flight loads notice
    pub fn invalidate(&self, key: &str) {
        self.bump_generation(key);
        self.delete_quietly(&Self::storage_key(key));
    }

    fn generation(&self, key: &str) -> u64 {
        match self.kv.get(&format!("{GENERATION_PREFIX}{key}")) {
            Ok(Some(raw)) => raw.parse().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache generation read failed");
                0
            }
        }
    }

    fn bump_generation(&self, key: &str) {
        let next = self.generation(key).wrapping_add(1);
        if let Err(e) = self
            .kv
            .put(&format!("{GENERATION_PREFIX}{key}"), &next.to_string())
        {
            tracing::warn!(key = %key, error = %e, "Cache generation bump failed");
        }
    }

    pub fn invalidate_all<K: AsRef<str>>(&self, keys: impl IntoIterator<Item = K>) {
        for key in keys {
            self.invalidate(key.as_ref());
        }
    }

    /// Drop every cache entry; returns how many were removed
    pub fn clear(&self) -> usize {
        match self.kv.delete_prefix(PREFIX) {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(error = %e, "Cache clear failed");
                0
            }
        }
    }

    /// Cached read: hit returns the stored value; miss (or `bypass`) runs
    /// `load` and stores its result
    pub fn cached<T, F>(&self, key: &CacheKey, bypass: bool, load: F) -> AppResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> AppResult<T>,
    {
        let name = key.key();
        if !bypass && let Some(hit) = self.get_as::<T>(&name) {
            tracing::debug!(key = %name, "Cache hit");
            return Ok(hit);
        }

        let started = self.generation(&name);
        let value = load()?;
        if self.generation(&name) != started {
            tracing::debug!(key = %name, "Invalidated during load, not cached");
            return Ok(value);
        }
        self.put_json(&name, &value, key.ttl());
        // An invalidation may have landed between the check and the put
        if self.generation(&name) != started {
            self.delete_quietly(&Self::storage_key(&name));
        }
        Ok(value)
    }

    fn delete_quietly(&self, storage_key: &str) {
        if let Err(e) = self.kv.delete(storage_key) {
            tracing::warn!(key = %storage_key, error = %e, "Cache delete failed");
        }
    }
}
