//! Programmatic changes to the live snapshot.
//!
//! Changes are made on a copy of the current snapshot and published with
//! `ArcSwap::rcu`, so concurrent readers keep a consistent view. They are
//! never written to the backing files and are discarded by the next reload.

use crate::access::coerce::IntoSetting;
use crate::observability::metrics;
use crate::service::{ConfigEvent, ConfigurationService};
use crate::store::{RawEntry, Snapshot};

impl ConfigurationService {
    /// Set `key` to `value` (strings are trimmed); `None` removes the key.
    ///
    /// Returns whether the stored value actually changed.
    pub fn set<V: IntoSetting>(&self, key: &str, value: V) -> bool {
        let changed = self.apply(key, value.into_setting());
        if changed {
            tracing::debug!(key = %key, "Property set");
            metrics::record_mutation("set");
        }
        changed
    }

    /// Load a single value as if it had come from a source.
    ///
    /// Same semantics as [`set`](Self::set).
    pub fn load<V: IntoSetting>(&self, key: &str, value: V) -> bool {
        let changed = self.apply(key, value.into_setting());
        if changed {
            metrics::record_mutation("load");
        }
        changed
    }

    /// Load many values; returns how many changed something.
    pub fn load_all<I, K, V>(&self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoSetting,
    {
        let changed = pairs
            .into_iter()
            .map(|(key, value)| self.load(key.as_ref(), value))
            .filter(|changed| *changed)
            .count();
        tracing::debug!(changed, "Bulk load applied");
        changed
    }

    /// Remove `key`; returns whether it existed.
    pub fn clear(&self, key: &str) -> bool {
        let removed = self.apply(key, None);
        if removed {
            tracing::debug!(key = %key, "Property cleared");
            metrics::record_mutation("clear");
        }
        removed
    }

    /// Remove every property, independent of the backing files.
    pub fn clear_all(&self) {
        let previous = self.inner.snapshot.swap(Snapshot::new().into());
        if !previous.is_empty() {
            tracing::debug!(removed = previous.len(), "All properties cleared");
            metrics::record_mutation("clear_all");
            metrics::record_property_count(0);
            let _ = self.inner.events.send(ConfigEvent::ClearedAll);
        }
    }

    fn apply(&self, key: &str, entry: Option<RawEntry>) -> bool {
        if key.is_empty() {
            tracing::warn!("Ignoring change to empty property key");
            return false;
        }

        let changed = match entry {
            None => {
                if !self.inner.snapshot.load().contains_key(key) {
                    return false;
                }
                let previous = self.inner.snapshot.rcu(|current| {
                    let mut next = Snapshot::clone(current);
                    next.remove(key);
                    next
                });
                let existed = previous.contains_key(key);
                if existed {
                    let _ = self.inner.events.send(ConfigEvent::Cleared {
                        key: key.to_string(),
                    });
                }
                existed
            }
            Some(entry) => {
                if self.inner.snapshot.load().get(key) == Some(&entry) {
                    return false;
                }
                let previous = self.inner.snapshot.rcu(|current| {
                    let mut next = Snapshot::clone(current);
                    next.insert(key, entry.clone());
                    next
                });
                let changed = previous.get(key) != Some(&entry);
                if changed {
                    let _ = self.inner.events.send(ConfigEvent::Set {
                        key: key.to_string(),
                    });
                }
                changed
            }
        };

        if changed {
            metrics::record_property_count(self.inner.snapshot.load().len());
        }
        changed
    }
}
