//! `${key}` placeholder resolution.
//!
//! # Rules
//! - Each `${name}` is replaced by the fully resolved value of `name`
//! - A name with no entry resolves to the empty string
//! - A `${` without a closing `}` is kept literally, as is a lone `$`
//! - Any key reached twice on the current resolution chain is a cycle
//!
//! Resolution happens on every read; nothing is cached, so editing a
//! referenced key is visible to all keys that reference it.

use crate::error::{ConfigError, Result};
use crate::store::Snapshot;

const OPEN: &str = "${";
const CLOSE: char = '}';

/// Anything that can supply raw values for placeholder names.
pub trait Lookup {
    fn lookup(&self, key: &str) -> Option<&str>;
}

impl Lookup for Snapshot {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key).map(|entry| entry.first())
    }
}

/// Resolves placeholders against a [`Lookup`].
pub struct Interpolator<'a, L: Lookup + ?Sized> {
    source: &'a L,
}

impl<'a, L: Lookup + ?Sized> Interpolator<'a, L> {
    pub fn new(source: &'a L) -> Self {
        Self { source }
    }

    /// Resolve the value stored under `key`, or `None` when absent.
    pub fn resolve_key(&self, key: &str) -> Result<Option<String>> {
        match self.source.lookup(key) {
            Some(raw) => self.resolve_value(key, raw).map(Some),
            None => Ok(None),
        }
    }

    /// Resolve `raw`, treating it as the value of `key` for cycle detection.
    pub fn resolve_value(&self, key: &str, raw: &str) -> Result<String> {
        let mut chain = vec![key.to_string()];
        self.expand(raw, &mut chain)
    }

    /// Resolve free-standing text that belongs to no key.
    pub fn resolve_text(&self, text: &str) -> Result<String> {
        self.expand(text, &mut Vec::new())
    }

    fn expand(&self, raw: &str, chain: &mut Vec<String>) -> Result<String> {
        if !raw.contains(OPEN) {
            return Ok(raw.to_string());
        }

        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let after = &rest[start + OPEN.len()..];
            let Some(end) = after.find(CLOSE) else {
                out.push_str(&rest[start..]);
                return Ok(out);
            };

            let name = &after[..end];
            if chain.iter().any(|seen| seen == name) {
                let mut cycle = chain.clone();
                cycle.push(name.to_string());
                return Err(ConfigError::CircularReference {
                    key: chain.first().cloned().unwrap_or_else(|| name.to_string()),
                    chain: cycle,
                });
            }

            if let Some(value) = self.source.lookup(name) {
                chain.push(name.to_string());
                let resolved = self.expand(value, chain);
                chain.pop();
                out.push_str(&resolved?);
            }

            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}
