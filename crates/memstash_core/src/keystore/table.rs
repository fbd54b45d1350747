//! Ordered entry container behind the key store.

use super::entry::Entry;
use crate::error::{CoreError, CoreResult};
use std::collections::HashSet;
use std::time::Instant;

/// Insertion-ordered sequence of entries with unique keys.
///
/// Lookups are linear scans; the container is meant for cache-sized data
/// and keeps the order entries were written in.
#[derive(Debug, Default)]
pub(crate) struct KeyTable {
    entries: Vec<Entry>,
}

impl KeyTable {
    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key() == key)
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.key() == key)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Appends an entry, failing if the key is already held.
    pub(crate) fn insert(&mut self, entry: Entry) -> CoreResult<()> {
        if self.contains(entry.key()) {
            return Err(CoreError::key_exists(entry.key()));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Appends a batch atomically.
    ///
    /// Fails without inserting anything if the batch repeats a key or
    /// carries a key that is already held.
    pub(crate) fn insert_batch(&mut self, batch: Vec<Entry>) -> CoreResult<()> {
        let mut seen = HashSet::with_capacity(batch.len());
        for entry in &batch {
            if !seen.insert(entry.key()) || self.contains(entry.key()) {
                return Err(CoreError::key_exists(entry.key()));
            }
        }
        self.entries.extend(batch);
        Ok(())
    }

    pub(crate) fn remove(&mut self, key: &str) -> CoreResult<Entry> {
        let index = self
            .position(key)
            .ok_or_else(|| CoreError::key_not_found(key))?;
        Ok(self.entries.remove(index))
    }

    /// Removes the entry held by `old_key` and appends `entry` in its place.
    ///
    /// Storage is left untouched on error: `old_key` must exist, and when
    /// the key changes the new key must be free.
    pub(crate) fn replace(&mut self, old_key: &str, entry: Entry) -> CoreResult<()> {
        let index = self
            .position(old_key)
            .ok_or_else(|| CoreError::key_not_found(old_key))?;
        if entry.key() != old_key && self.contains(entry.key()) {
            return Err(CoreError::key_exists(entry.key()));
        }
        self.entries.remove(index);
        self.entries.push(entry);
        Ok(())
    }

    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Drops every entry whose expiry is at or before `now`.
    pub(crate) fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.is_expired_at(now));
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memstash_codec::Value;
    use std::time::Duration;

    fn entry(key: &str, value: i64) -> Entry {
        Entry::new(key, Value::from(value), None, Instant::now())
    }

    #[test]
    fn insert_rejects_duplicate() {
        let mut table = KeyTable::default();
        table.insert(entry("a", 1)).unwrap();

        let err = table.insert(entry("a", 2)).unwrap_err();
        assert!(matches!(err, CoreError::KeyExists { ref key } if key == "a"));
        assert_eq!(table.get("a").unwrap().value(), &Value::from(1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let mut table = KeyTable::default();
        table.insert(entry("b", 0)).unwrap();

        let err = table
            .insert_batch(vec![entry("a", 1), entry("b", 2)])
            .unwrap_err();
        assert!(matches!(err, CoreError::KeyExists { .. }));
        assert_eq!(table.len(), 1);

        let err = table
            .insert_batch(vec![entry("c", 1), entry("c", 2)])
            .unwrap_err();
        assert!(matches!(err, CoreError::KeyExists { .. }));
        assert_eq!(table.len(), 1);

        table.insert_batch(vec![entry("c", 1), entry("d", 2)]).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn remove_keeps_order() {
        let mut table = KeyTable::default();
        for (i, key) in ["a", "b", "c"].iter().enumerate() {
            table.insert(entry(key, i as i64)).unwrap();
        }

        table.remove("b").unwrap();
        let keys: Vec<_> = table.iter().map(Entry::key).collect();
        assert_eq!(keys, vec!["a", "c"]);

        assert!(matches!(
            table.remove("b"),
            Err(CoreError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn replace_moves_entry_to_end() {
        let mut table = KeyTable::default();
        table.insert(entry("a", 1)).unwrap();
        table.insert(entry("b", 2)).unwrap();

        table.replace("a", entry("a", 10)).unwrap();
        let keys: Vec<_> = table.iter().map(Entry::key).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(table.get("a").unwrap().value(), &Value::from(10));
    }

    #[test]
    fn replace_onto_taken_key_fails_unchanged() {
        let mut table = KeyTable::default();
        table.insert(entry("a", 1)).unwrap();
        table.insert(entry("b", 2)).unwrap();

        let err = table.replace("a", entry("b", 3)).unwrap_err();
        assert!(matches!(err, CoreError::KeyExists { .. }));
        assert_eq!(table.get("a").unwrap().value(), &Value::from(1));
        assert_eq!(table.get("b").unwrap().value(), &Value::from(2));
    }

    #[test]
    fn purge_only_expired() {
        let now = Instant::now();
        let mut table = KeyTable::default();
        table
            .insert(Entry::new("old", Value::Null, Some(Duration::ZERO), now))
            .unwrap();
        table
            .insert(Entry::new("new", Value::Null, Some(Duration::from_secs(60)), now))
            .unwrap();
        table.insert(Entry::new("forever", Value::Null, None, now)).unwrap();

        assert_eq!(table.purge_expired(now), 1);
        assert!(!table.contains("old"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.purge_expired(now), 0);
    }
}
