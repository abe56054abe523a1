//! Filesystem-event trigger for early reloads.

use std::path::PathBuf;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Watch `roots` and signal `tx` on every modify/create/remove event.
///
/// Bursts of events collapse into one pending signal. The watcher stops
/// when dropped.
pub fn watch_sources(
    roots: &[PathBuf],
    tx: mpsc::Sender<()>,
) -> Result<RecommendedWatcher, notify::Error> {
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove() {
                    let _ = tx.try_send(());
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        },
        notify::Config::default(),
    )?;

    for root in roots {
        if root.exists() {
            watcher.watch(root, RecursiveMode::Recursive)?;
            tracing::info!(path = %root.display(), "Watching configuration sources");
        } else {
            tracing::warn!(path = %root.display(), "Configuration directory missing, not watched");
        }
    }
    Ok(watcher)
}
