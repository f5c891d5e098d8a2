//! Bounded, expiring cache of upstream response payloads.
//!
//! Keys combine the endpoint, the resolved query, and the units parameter,
//! so "current weather for london:on:ca in metric" is one slot regardless
//! of how the user spelled the query. Payloads are shared read-only
//! (`Arc<Value>`); callers must not mutate them.
//!
//! Capacity policy: when a new key would exceed capacity, expired entries
//! are dropped first, then the oldest entry (by insertion sequence) is
//! evicted. Replacing an existing key never evicts. The map never grows
//! past its bound.

use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::gazetteer::fold_key;

/// Default slot count when the embedding process has no opinion.
pub const DEFAULT_CAPACITY: usize = 256;

struct CacheEntry {
    payload: Arc<Value>,
    expires_at_ms: i64,
    /// Monotonic insertion sequence; the eviction order.
    seq: u64,
}

struct Inner {
    entries: HashMap<String, CacheEntry>,
    next_seq: u64,
}

/// The response cache. Interior-locked: share it behind an `Arc` and call
/// from as many threads as needed.
pub struct ResponseCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl ResponseCache {
    /// A cache bounded to `capacity` entries (minimum one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Compose a cache key from the endpoint, the resolved/normalized
    /// query, and the units parameter. The query is folded so spelling
    /// variants of the same place share a slot.
    pub fn key(endpoint: &str, query: &str, units: &str) -> String {
        format!("{}|{}|{}", endpoint, fold_key(query), units.to_lowercase())
    }

    /// The payload for `key`, if present and unexpired.
    pub fn get(&self, key: &str) -> Option<Arc<Value>> {
        let inner = self.inner.lock().unwrap();
        let entry = inner.entries.get(key)?;
        if Utc::now().timestamp_millis() >= entry.expires_at_ms {
            return None; // expired; the next sweep reclaims it
        }
        Some(Arc::clone(&entry.payload))
    }

    /// Store `payload` under `key` with an absolute expiry `ttl` from now.
    pub fn set(&self, key: &str, payload: Value, ttl: Duration) {
        let now = Utc::now().timestamp_millis();
        let mut inner = self.inner.lock().unwrap();

        if !inner.entries.contains_key(key) && inner.entries.len() >= self.capacity {
            inner.entries.retain(|_, e| now < e.expires_at_ms);
            if inner.entries.len() >= self.capacity {
                if let Some(oldest) = inner
                    .entries
                    .iter()
                    .min_by_key(|(_, e)| e.seq)
                    .map(|(k, _)| k.clone())
                {
                    inner.entries.remove(&oldest);
                }
            }
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                payload: Arc::new(payload),
                expires_at_ms: now + ttl.as_millis() as i64,
                seq,
            },
        );
    }

    /// Drop every expired entry. Returns how many were removed. The
    /// embedding process calls this on its own periodic schedule.
    pub fn sweep(&self) -> usize {
        let now = Utc::now().timestamp_millis();
        let mut inner = self.inner.lock().unwrap();
        let before = inner.entries.len();
        inner.entries.retain(|_, e| now < e.expires_at_ms);
        before - inner.entries.len()
    }

    /// Current entry count, expired entries included until swept.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
