//! Change notifications.

use crate::store::SnapshotDiff;

/// What caused a snapshot replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    /// `reload_config()` was called.
    Manual,
    /// A poll tick saw a newer modification time.
    Poll,
    /// A filesystem event prompted an early check.
    Event,
}

impl ReloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadKind::Manual => "manual",
            ReloadKind::Poll => "poll",
            ReloadKind::Event => "event",
        }
    }
}

/// A visible change to the live configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEvent {
    /// A key was added or its value changed programmatically.
    Set { key: String },
    /// A key was removed programmatically.
    Cleared { key: String },
    /// Every key was removed.
    ClearedAll,
    /// A new snapshot was loaded from the backing sources.
    Reloaded { trigger: ReloadKind, diff: SnapshotDiff },
}
