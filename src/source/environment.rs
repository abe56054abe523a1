//! Process-environment overlay.
//!
//! Allowed variables are imported under their own names and applied on
//! top of every file source, so they win over any file value.

use std::collections::HashMap;

use crate::settings::EnvironmentSettings;
use crate::store::{RawEntry, Snapshot};

/// A source of environment variables.
pub trait EnvSource: Send + Sync {
    /// All variables, in a stable order.
    fn vars(&self) -> Vec<(String, String)>;

    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn vars(&self) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        vars.sort();
        vars
    }

    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of variables, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn vars(&self) -> Vec<(String, String)> {
        let mut vars: Vec<_> = self
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        vars.sort();
        vars
    }

    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Decides which variable names are imported.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl AllowList {
    /// Build from exact names and `PREFIX*` patterns. A bare `*` admits all.
    pub fn from_patterns(patterns: &[String]) -> Self {
        let mut list = AllowList::default();
        for pattern in patterns {
            let pattern = pattern.trim();
            match pattern.strip_suffix('*') {
                Some(prefix) => list.prefixes.push(prefix.to_string()),
                None => list.exact.push(pattern.to_string()),
            }
        }
        list
    }

    pub fn admits(&self, name: &str) -> bool {
        self.exact.iter().any(|e| e == name) || self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

/// Build the environment overlay snapshot.
pub fn overlay(settings: &EnvironmentSettings, env: &dyn EnvSource) -> Snapshot {
    let mut snapshot = Snapshot::new();
    if !settings.enabled {
        return snapshot;
    }

    let allow = AllowList::from_patterns(&settings.allow);
    for (name, value) in env.vars() {
        if allow.admits(&name) {
            snapshot.insert(name, RawEntry::from(value));
        }
    }

    tracing::debug!(imported = snapshot.len(), "Environment overlay built");
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(allow: &[&str]) -> EnvironmentSettings {
        EnvironmentSettings {
            enabled: true,
            allow: allow.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_allow_list_patterns() {
        let list = AllowList::from_patterns(&["dspace.*".into(), "Hello".into()]);
        assert!(list.admits("dspace.system.config"));
        assert!(list.admits("Hello"));
        assert!(!list.admits("Hello2"));
        assert!(!list.admits("PATH"));
    }

    #[test]
    fn test_overlay_imports_allowed_only() {
        let env = MapEnv::new()
            .with("Hello", "  World ")
            .with("Tim", "Donohue")
            .with("SECRET", "x");
        let snapshot = overlay(&settings(&["Hello", "Tim"]), &env);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("Hello").unwrap().first(), "World");
        assert!(!snapshot.contains_key("SECRET"));
    }

    #[test]
    fn test_empty_allow_list_imports_nothing() {
        let env = MapEnv::new().with("Hello", "World");
        assert!(overlay(&settings(&[]), &env).is_empty());
    }

    #[test]
    fn test_wildcard_and_disabled() {
        let env = MapEnv::new().with("A", "1").with("B", "2");
        assert_eq!(overlay(&settings(&["*"]), &env).len(), 2);

        let mut disabled = settings(&["*"]);
        disabled.enabled = false;
        assert!(overlay(&disabled, &env).is_empty());
    }
}
