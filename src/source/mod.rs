//! Property sources.
//!
//! # Data Flow
//! ```text
//! home.rs          resolve home directory
//!     → loader.rs  primary + includes + modules + local
//!     → parser.rs  one file → entries + include targets
//! environment.rs   allowed variables, applied last
//!     → merged Snapshot
//! ```

pub mod environment;
pub mod home;
pub mod loader;
pub mod parser;

use crate::error::Result;
use crate::settings::ServiceSettings;
use crate::store::Snapshot;

pub use environment::{AllowList, EnvSource, MapEnv, ProcessEnv};
pub use loader::{LoadedSources, SourceLayout};

/// Merge all file sources (when a layout is given) with the environment
/// overlay on top.
pub fn load_merged(
    layout: Option<&SourceLayout>,
    settings: &ServiceSettings,
    env: &dyn EnvSource,
) -> Result<LoadedSources> {
    let mut loaded = match layout {
        Some(layout) => layout.load()?,
        None => LoadedSources::default(),
    };
    let overlay: Snapshot = environment::overlay(&settings.environment, env);
    loaded.snapshot.merge(overlay);
    Ok(loaded)
}
