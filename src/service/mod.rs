//! The configuration service.
//!
//! # Lifecycle
//! ```text
//! builder() → build()      resolve home, load sources,
//!                          start the reload supervisor     (init)
//!     → accessors / set / load / clear                     (ready)
//!     → shutdown()          stop and join the supervisor   (shutdown)
//! ```
//!
//! # Design Decisions
//! - The merged snapshot lives behind an `ArcSwap`: reads take a guard and
//!   never see a half-merged map, reloads and mutations publish a whole
//!   new snapshot
//! - At most one reload runs at a time (`reload_lock`)
//! - Interpolation runs on every read against the snapshot of that read

pub mod events;
mod mutation;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use tokio::sync::broadcast;

use crate::error::{ConfigError, Result};
use crate::observability::metrics;
use crate::reload::stamps::FileStamps;
use crate::reload::{self, ReloadHandle};
use crate::settings::validation::validate_settings;
use crate::settings::ServiceSettings;
use crate::source::{self, home, EnvSource, LoadedSources, ProcessEnv, SourceLayout};
use crate::store::{Snapshot, SnapshotDiff};

pub use events::{ConfigEvent, ReloadKind};

const EVENT_CAPACITY: usize = 64;

/// Shared state behind every [`ConfigurationService`] handle.
pub(crate) struct ServiceInner {
    pub(crate) snapshot: ArcSwap<Snapshot>,
    pub(crate) settings: ServiceSettings,
    pub(crate) layout: Option<SourceLayout>,
    env: Arc<dyn EnvSource>,
    modules: ArcSwap<Vec<String>>,
    stamps: Mutex<FileStamps>,
    reload_lock: Mutex<()>,
    pub(crate) events: broadcast::Sender<ConfigEvent>,
    supervisor: Mutex<Option<ReloadHandle>>,
}

/// Hierarchical configuration service.
///
/// Cheap to clone; all clones share one live snapshot.
#[derive(Clone)]
pub struct ConfigurationService {
    pub(crate) inner: Arc<ServiceInner>,
}

impl std::fmt::Debug for ConfigurationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationService")
            .field("home", &self.home())
            .field("properties", &self.len())
            .field("reloading", &self.is_reloading())
            .finish()
    }
}

/// Builder for [`ConfigurationService`].
pub struct ServiceBuilder {
    home: Option<PathBuf>,
    settings: ServiceSettings,
    env: Arc<dyn EnvSource>,
    files: bool,
}

impl ServiceBuilder {
    /// Prefer this home directory over the environment variable and default.
    pub fn home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn settings(mut self, settings: ServiceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the process environment (home lookup and overlay).
    pub fn env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Serve only the environment overlay and programmatic values.
    pub fn without_files(mut self) -> Self {
        self.files = false;
        self
    }

    /// Validate settings, resolve the home, load the first snapshot and,
    /// when `reload.enabled`, start the reload supervisor.
    ///
    /// Inside a Tokio runtime the supervisor is a task on that runtime;
    /// otherwise it gets a dedicated thread.
    pub fn build(self) -> Result<ConfigurationService> {
        validate_settings(&self.settings).map_err(ConfigError::Settings)?;

        let layout = if self.files {
            let home = home::resolve_home(self.home.as_deref(), &self.settings, &*self.env)?;
            Some(SourceLayout::new(home, &self.settings))
        } else {
            None
        };

        let loaded = source::load_merged(layout.as_ref(), &self.settings, &*self.env)?;
        let LoadedSources {
            snapshot,
            modules,
            tracked,
        } = loaded;
        let stamps = FileStamps::from_observed(tracked);

        if let Some(layout) = &layout {
            tracing::info!(
                home = %layout.home().display(),
                properties = snapshot.len(),
                modules = modules.len(),
                "Configuration loaded"
            );
        }
        metrics::record_property_count(snapshot.len());

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let inner = Arc::new(ServiceInner {
            snapshot: ArcSwap::from_pointee(snapshot),
            settings: self.settings,
            layout,
            env: self.env,
            modules: ArcSwap::from_pointee(modules),
            stamps: Mutex::new(stamps),
            reload_lock: Mutex::new(()),
            events,
            supervisor: Mutex::new(None),
        });
        let supervisor = reload::start(&inner);
        *lock(&inner.supervisor) = Some(supervisor);

        Ok(ConfigurationService { inner })
    }
}

impl ConfigurationService {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder {
            home: None,
            settings: ServiceSettings::default(),
            env: Arc::new(ProcessEnv),
            files: true,
        }
    }

    /// Load from `home` (or the resolved default) with default settings.
    pub fn init(home: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(home) = home {
            builder = builder.home(home);
        }
        builder.build()
    }

    /// A service with no backing files and no environment overlay.
    pub fn in_memory() -> Self {
        let mut settings = ServiceSettings::default();
        settings.environment.enabled = false;
        settings.reload.enabled = false;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        ConfigurationService {
            inner: Arc::new(ServiceInner {
                snapshot: ArcSwap::from_pointee(Snapshot::new()),
                settings,
                layout: None,
                env: Arc::new(ProcessEnv),
                modules: ArcSwap::from_pointee(Vec::new()),
                stamps: Mutex::new(FileStamps::default()),
                reload_lock: Mutex::new(()),
                events,
                supervisor: Mutex::new(None),
            }),
        }
    }

    /// True when the configuration was loaded from a home directory.
    pub fn is_configured(&self) -> bool {
        self.inner.layout.is_some()
    }

    pub fn home(&self) -> Option<&Path> {
        self.inner.layout.as_ref().map(SourceLayout::home)
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.inner.settings
    }

    /// The current snapshot, for bulk iteration.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot.load_full()
    }

    /// Number of stored properties.
    pub fn len(&self) -> usize {
        self.inner.snapshot.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Module namespaces discovered at the last load.
    pub fn modules(&self) -> Vec<String> {
        self.inner.modules.load().as_ref().clone()
    }

    /// Receive change events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.inner.events.subscribe()
    }

    /// Whether the automatic reload supervisor is running.
    pub fn is_reloading(&self) -> bool {
        lock(&self.inner.supervisor)
            .as_ref()
            .is_some_and(ReloadHandle::is_running)
    }

    /// Stop automatic reload and wait for the supervisor to exit.
    ///
    /// The snapshot stays readable afterwards; only file tracking ends.
    /// Calling it again is a no-op.
    pub async fn shutdown(&self) {
        let supervisor = lock(&self.inner.supervisor).take();
        if let Some(supervisor) = supervisor {
            supervisor.stop().await;
        }
    }

    /// Re-read every source and the environment, replacing the snapshot.
    ///
    /// Programmatic changes since the last load are discarded. On failure
    /// the previous snapshot stays in service and the error is returned.
    pub fn reload_config(&self) -> Result<SnapshotDiff> {
        self.inner.reload(ReloadKind::Manual)
    }
}

impl ServiceInner {
    pub(crate) fn reload(&self, trigger: ReloadKind) -> Result<SnapshotDiff> {
        let _guard = lock(&self.reload_lock);

        let loaded = match source::load_merged(self.layout.as_ref(), &self.settings, &*self.env) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!(
                    trigger = trigger.as_str(),
                    error = %e,
                    "Failed to reload configuration. Keeping current snapshot."
                );
                metrics::record_reload_failure(trigger.as_str());
                return Err(e);
            }
        };

        let LoadedSources {
            snapshot,
            modules,
            tracked,
        } = loaded;
        *lock(&self.stamps) = FileStamps::from_observed(tracked);

        let fresh = Arc::new(snapshot);
        let previous = self.snapshot.swap(Arc::clone(&fresh));
        self.modules.store(Arc::new(modules));
        let diff = previous.diff(&fresh);

        tracing::info!(
            trigger = trigger.as_str(),
            properties = fresh.len(),
            added = diff.added.len(),
            removed = diff.removed.len(),
            changed = diff.changed.len(),
            "Configuration reloaded"
        );
        metrics::record_reload(trigger.as_str());
        metrics::record_property_count(fresh.len());

        let _ = self.events.send(ConfigEvent::Reloaded {
            trigger,
            diff: diff.clone(),
        });
        Ok(diff)
    }

    /// Reload when any tracked file changed since the last load.
    ///
    /// Returns `true` when a new snapshot was published.
    pub(crate) fn reload_if_changed(&self, trigger: ReloadKind) -> bool {
        let (changed, observed) = {
            let stamps = lock(&self.stamps);
            (stamps.changed(), stamps.refreshed())
        };
        if changed.is_empty() {
            return false;
        }

        tracing::info!(
            trigger = trigger.as_str(),
            files = ?changed,
            "Configuration source change detected, reloading..."
        );
        match self.reload(trigger) {
            Ok(_) => true,
            Err(_) => {
                // Wait for the next edit before retrying a broken source.
                // Stamps from before the read, so a fix saved meanwhile counts.
                *lock(&self.stamps) = observed;
                false
            }
        }
    }

    /// Directories worth watching for filesystem events.
    pub(crate) fn watch_roots(&self) -> Vec<PathBuf> {
        self.layout
            .as_ref()
            .map(|layout| vec![layout.config_dir().to_path_buf()])
            .unwrap_or_default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
