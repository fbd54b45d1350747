//! Public key store handle.

use super::entry::{Entry, KeyEntry};
use crate::error::{CoreError, CoreResult};
use crate::state::Shared;
use memstash_codec::Value;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Handle to the key/value half of a [`Store`](crate::Store).
///
/// Handles are cheap to clone and share one lock with the data store and
/// the background sweeper. Keys are unique across the whole store.
///
/// A `ttl` of `None` falls back to the store's configured default TTL; with
/// no default the entry never expires. Expired entries stay readable until
/// the sweeper (or [`purge_expired`](Self::purge_expired)) removes them.
#[derive(Clone)]
pub struct KeyStore {
    shared: Arc<Shared>,
}

impl KeyStore {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    fn effective_ttl(&self, ttl: Option<Duration>) -> Option<Duration> {
        ttl.or(self.shared.default_ttl)
    }

    /// Inserts a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyExists`] if the key is already held.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
        ttl: Option<Duration>,
    ) -> CoreResult<()> {
        let entry = Entry::new(key, value.into(), self.effective_ttl(ttl), Instant::now());
        let mut state = self.shared.state.write();
        state.keys.insert(entry)?;
        self.shared.stats.record_keys_set(1);
        debug!(size = state.keys.len(), "key set");
        Ok(())
    }

    /// Inserts a batch of entries and returns every key/value pair held afterwards.
    ///
    /// The batch is validated before anything is inserted: a key repeated in
    /// the batch, or one that is already held, fails the whole call.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyExists`] naming the first offending key.
    pub fn set_many(&self, entries: Vec<KeyEntry>) -> CoreResult<Vec<(String, Value)>> {
        let now = Instant::now();
        let count = entries.len();
        let batch = entries
            .into_iter()
            .map(|e| Entry::new(e.key, e.value, self.effective_ttl(e.ttl), now))
            .collect();

        let mut state = self.shared.state.write();
        state.keys.insert_batch(batch)?;
        self.shared.stats.record_keys_set(count as u64);
        debug!(count, size = state.keys.len(), "key batch set");
        Ok(pairs(state.keys.iter()))
    }

    /// Returns a copy of the value held by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyNotFound`] if the key is absent.
    pub fn get(&self, key: &str) -> CoreResult<Value> {
        let state = self.shared.state.read();
        state
            .keys
            .get(key)
            .map(|e| e.value().clone())
            .ok_or_else(|| CoreError::key_not_found(key))
    }

    /// Returns the pairs for every requested key that is present, in request order.
    ///
    /// Missing keys are skipped.
    pub fn get_many(&self, keys: &[&str]) -> Vec<(String, Value)> {
        let state = self.shared.state.read();
        keys.iter()
            .filter_map(|k| state.keys.get(k))
            .map(|e| (e.key().to_string(), e.value().clone()))
            .collect()
    }

    /// Removes an entry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyNotFound`] if the key is absent.
    pub fn del(&self, key: &str) -> CoreResult<()> {
        let mut state = self.shared.state.write();
        state.keys.remove(key)?;
        self.shared.stats.record_keys_deleted(1);
        debug!(key, "key deleted");
        Ok(())
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let removed = self.shared.state.write().keys.clear();
        self.shared.stats.record_keys_deleted(removed as u64);
        debug!(removed, "key store cleared");
    }

    /// Returns the number of entries, expired-but-unswept ones included.
    pub fn size(&self) -> usize {
        self.shared.state.read().keys.len()
    }

    /// Replaces the value of an existing key with a fresh expiry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyNotFound`] if the key is absent; storage is
    /// left unchanged.
    pub fn overwrite(
        &self,
        key: &str,
        value: impl Into<Value>,
        ttl: Option<Duration>,
    ) -> CoreResult<()> {
        self.overwrite_with_key(key, key, value, ttl)
    }

    /// Replaces an existing entry under a new key with a fresh expiry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyNotFound`] if `old_key` is absent, or
    /// [`CoreError::KeyExists`] if `new_key` differs from `old_key` and is
    /// already held. Storage is left unchanged on error.
    pub fn overwrite_with_key(
        &self,
        old_key: &str,
        new_key: impl Into<String>,
        value: impl Into<Value>,
        ttl: Option<Duration>,
    ) -> CoreResult<()> {
        let entry = Entry::new(new_key, value.into(), self.effective_ttl(ttl), Instant::now());
        let mut state = self.shared.state.write();
        state.keys.replace(old_key, entry)?;
        self.shared.stats.record_overwrite();
        debug!(old_key, "key overwritten");
        Ok(())
    }

    /// Returns every key in insertion order.
    pub fn keys(&self) -> Vec<String> {
        let state = self.shared.state.read();
        state.keys.iter().map(|e| e.key().to_string()).collect()
    }

    /// Returns every value in insertion order.
    pub fn values(&self) -> Vec<Value> {
        let state = self.shared.state.read();
        state.keys.iter().map(|e| e.value().clone()).collect()
    }

    /// Returns the runtime type name of the value held by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyNotFound`] if the key is absent.
    pub fn type_of(&self, key: &str) -> CoreResult<&'static str> {
        let state = self.shared.state.read();
        state
            .keys
            .get(key)
            .map(|e| e.value().type_name())
            .ok_or_else(|| CoreError::key_not_found(key))
    }

    /// Returns every key/value pair in insertion order.
    pub fn key_value_pairs(&self) -> Vec<(String, Value)> {
        pairs(self.shared.state.read().keys.iter())
    }

    /// Returns when `key` expires, or `None` if it never does.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyNotFound`] if the key is absent.
    pub fn expires_at(&self, key: &str) -> CoreResult<Option<Instant>> {
        let state = self.shared.state.read();
        state
            .keys
            .get(key)
            .map(Entry::expires_at)
            .ok_or_else(|| CoreError::key_not_found(key))
    }

    /// Evicts every expired entry now and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let evicted = self.shared.state.write().keys.purge_expired(Instant::now());
        self.shared.stats.record_purge(evicted as u64);
        evicted
    }
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore").field("size", &self.size()).finish()
    }
}

fn pairs<'a>(entries: impl Iterator<Item = &'a Entry>) -> Vec<(String, Value)> {
    entries
        .map(|e| (e.key().to_string(), e.value().clone()))
        .collect()
}
