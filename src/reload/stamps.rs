//! Modification times of tracked sources.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Last observed modification time per tracked path (`None` = absent).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStamps {
    entries: Vec<(PathBuf, Option<SystemTime>)>,
}

impl FileStamps {
    /// Stamps recorded while the sources were read. A path seen more than
    /// once keeps its first observation.
    pub fn from_observed(mut observed: Vec<(PathBuf, Option<SystemTime>)>) -> Self {
        observed.sort_by(|a, b| a.0.cmp(&b.0));
        observed.dedup_by(|later, first| later.0 == first.0);
        Self { entries: observed }
    }

    pub fn capture(paths: &[PathBuf]) -> Self {
        Self {
            entries: paths
                .iter()
                .map(|path| (path.clone(), modified(path)))
                .collect(),
        }
    }

    /// The same paths, observed again now.
    pub fn refreshed(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(path, _)| (path.clone(), modified(path)))
                .collect(),
        }
    }

    /// Paths whose timestamp advanced, or which appeared or disappeared.
    pub fn changed(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|(path, seen)| match (seen, modified(path)) {
                (Some(seen), Some(now)) => now > *seen,
                (None, None) => false,
                _ => true,
            })
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|(path, _)| path.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}
