//! Key store entries.

use memstash_codec::Value;
use std::time::{Duration, Instant};

/// A single key/value pair with an optional expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    key: String,
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    /// Creates an entry expiring `ttl` after `now`.
    ///
    /// A `None` TTL, or one too large to represent as an instant, never
    /// expires.
    pub fn new(key: impl Into<String>, value: Value, ttl: Option<Duration>, now: Instant) -> Self {
        Self {
            key: key.into(),
            value,
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl)),
        }
    }

    /// Returns the key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the stored value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns when the entry expires, if it ever does.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Returns true once `now` has reached the expiry.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// Input for bulk loading through [`KeyStore::set_many`](super::KeyStore::set_many).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEntry {
    /// Key to insert.
    pub key: String,
    /// Value to store.
    pub value: Value,
    /// Time to live; `None` falls back to the store default.
    pub ttl: Option<Duration>,
}

impl KeyEntry {
    /// Creates a bulk entry without a TTL.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ttl: None,
        }
    }

    /// Sets the TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}
