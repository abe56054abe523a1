//! Hierarchical queries over dotted keys.
//!
//! The tree is never materialised; each query walks the ordered key list.

use crate::store::entry::RawEntry;
use crate::store::snapshot::Snapshot;

impl Snapshot {
    /// Immediate next path segments under `prefix`, deduplicated, in
    /// insertion order. An empty prefix lists top-level segments.
    pub fn children(&self, prefix: &str) -> Vec<String> {
        let mut children: Vec<String> = Vec::new();
        for key in self.keys() {
            let Some(rest) = strip_prefix(key, prefix) else {
                continue;
            };
            let segment = rest.split('.').next().unwrap_or(rest);
            if !segment.is_empty() && !children.iter().any(|c| c == segment) {
                children.push(segment.to_string());
            }
        }
        children
    }

    /// All entries under `prefix`, with `prefix.` stripped from each key.
    pub fn subset(&self, prefix: &str) -> Vec<(String, &RawEntry)> {
        self.iter()
            .filter_map(|(key, entry)| {
                strip_prefix(key, prefix)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_string(), entry))
            })
            .collect()
    }

    /// Keys equal to `prefix` or nested beneath it; all keys when `None`.
    pub fn property_keys(&self, prefix: Option<&str>) -> Vec<String> {
        self.keys()
            .into_iter()
            .filter(|key| match prefix {
                None => true,
                Some(prefix) => *key == prefix || strip_prefix(key, prefix).is_some(),
            })
            .map(str::to_string)
            .collect()
    }
}

/// The part of `key` after `prefix.`, or the whole key for an empty prefix.
fn strip_prefix<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(key);
    }
    key.strip_prefix(prefix)?.strip_prefix('.')
}
