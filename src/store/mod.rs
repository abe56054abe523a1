//! In-memory property store.
//!
//! # Responsibilities
//! - Hold the merged key space (`Snapshot`) in load order
//! - Answer prefix queries (children, subset, property keys)
//! - Compute differences between snapshots for change events

pub mod entry;
pub mod snapshot;
pub mod tree;

pub use entry::RawEntry;
pub use snapshot::{Snapshot, SnapshotDiff};
