//! The merged configuration snapshot.
//!
//! A `Snapshot` is an ordered key → [`RawEntry`] map. Order is first
//! insertion; replacing a value keeps the key's position so that tree
//! queries stay stable across overrides.

use std::collections::HashMap;

use crate::store::entry::RawEntry;

#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    entry: RawEntry,
}

/// One immutable-once-published, fully merged view of the configuration.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: HashMap<String, Slot>,
    next_seq: u64,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&RawEntry> {
        self.entries.get(key).map(|slot| &slot.entry)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, entry: RawEntry) -> Option<RawEntry> {
        let key = key.into();
        if let Some(slot) = self.entries.get_mut(&key) {
            return Some(std::mem::replace(&mut slot.entry, entry));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(key, Slot { seq, entry });
        None
    }

    /// Record another occurrence of `key` within the same source.
    pub fn append(&mut self, key: impl Into<String>, value: String) {
        let key = key.into();
        match self.entries.get_mut(&key) {
            Some(slot) => slot.entry.push(value),
            None => {
                self.insert(key, RawEntry::Single(value));
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<RawEntry> {
        self.entries.remove(key).map(|slot| slot.entry)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Apply every entry of `other` on top of this snapshot, in order.
    ///
    /// Values from `other` replace existing ones wholesale; a single value
    /// never appends to an existing multi-valued entry.
    pub fn merge(&mut self, other: Snapshot) {
        for (key, entry) in other.into_ordered() {
            self.insert(key, entry);
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawEntry)> {
        let mut slots: Vec<_> = self.entries.iter().collect();
        slots.sort_by_key(|(_, slot)| slot.seq);
        slots
            .into_iter()
            .map(|(key, slot)| (key.as_str(), &slot.entry))
    }

    fn into_ordered(self) -> Vec<(String, RawEntry)> {
        let mut slots: Vec<_> = self.entries.into_iter().collect();
        slots.sort_by_key(|(_, slot)| slot.seq);
        slots
            .into_iter()
            .map(|(key, slot)| (key, slot.entry))
            .collect()
    }

    /// Compare two snapshots key by key.
    pub fn diff(&self, newer: &Snapshot) -> SnapshotDiff {
        let mut diff = SnapshotDiff::default();
        for (key, entry) in newer.iter() {
            match self.get(key) {
                None => diff.added.push(key.to_string()),
                Some(old) if old != entry => diff.changed.push(key.to_string()),
                Some(_) => {}
            }
        }
        for (key, _) in self.iter() {
            if !newer.contains_key(key) {
                diff.removed.push(key.to_string());
            }
        }
        diff
    }
}

impl<K: Into<String>, V: Into<RawEntry>> FromIterator<(K, V)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for (key, value) in iter {
            snapshot.insert(key, value.into());
        }
        snapshot
    }
}

/// Keys that differ between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}
