//! Automatic reload.
//!
//! # Data Flow
//! ```text
//! ticker (poll_interval) ─┐
//! notify events (opt-in) ─┴→ stamps.rs (any tracked mtime advanced?)
//!                              → ServiceInner::reload
//!                              → atomic snapshot swap
//! ```
//!
//! The supervisor is started by `ServiceBuilder::build` and stopped by
//! `ConfigurationService::shutdown` or when the last service handle is
//! dropped. It runs as a task on the caller's Tokio runtime, or on a
//! dedicated thread with its own runtime when built outside one.
//!
//! A failed reload logs, keeps the last good snapshot and waits for the
//! next change to the sources before trying again.

pub mod stamps;
mod supervisor;
pub mod watcher;

use std::sync::Arc;
use std::thread;

use notify::RecommendedWatcher;
use tokio::runtime::{self, Handle};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;
use crate::service::ServiceInner;
use crate::settings::ReloadTrigger;

use supervisor::ReloadSupervisor;

enum Runner {
    Idle,
    Task(JoinHandle<()>),
    Thread(thread::JoinHandle<()>),
}

/// Owns the background reload supervisor. Dropping it signals the
/// supervisor to exit without waiting for it.
pub(crate) struct ReloadHandle {
    shutdown: Shutdown,
    runner: Runner,
    watcher: Option<RecommendedWatcher>,
}

impl ReloadHandle {
    fn idle() -> Self {
        Self {
            shutdown: Shutdown::new(),
            runner: Runner::Idle,
            watcher: None,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        match &self.runner {
            Runner::Idle => false,
            Runner::Task(task) => !task.is_finished(),
            Runner::Thread(handle) => !handle.is_finished(),
        }
    }

    /// Stop the supervisor and wait for it to exit.
    pub(crate) async fn stop(mut self) {
        self.shutdown.trigger();
        self.watcher.take();
        match std::mem::replace(&mut self.runner, Runner::Idle) {
            Runner::Idle => return,
            Runner::Task(task) => {
                if let Err(e) = task.await {
                    tracing::error!(error = %e, "Reload supervisor ended abnormally");
                }
            }
            Runner::Thread(handle) => {
                match tokio::task::spawn_blocking(move || handle.join()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => tracing::error!("Reload supervisor thread panicked"),
                    Err(e) => tracing::error!(error = %e, "Failed to join reload supervisor thread"),
                }
            }
        }
        tracing::info!("Automatic configuration reload stopped");
    }
}

impl Drop for ReloadHandle {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start automatic reload for `inner` according to its settings.
///
/// Returns an idle handle when automatic reload is disabled.
pub(crate) fn start(inner: &Arc<ServiceInner>) -> ReloadHandle {
    let settings = &inner.settings.reload;
    if !settings.enabled {
        tracing::info!("Automatic configuration reload disabled");
        return ReloadHandle::idle();
    }

    let mut supervisor = ReloadSupervisor::new(Arc::downgrade(inner), settings.poll_interval());
    let mut fs_watcher = None;

    if settings.trigger == ReloadTrigger::Events {
        let (tx, rx) = mpsc::channel(1);
        match watcher::watch_sources(&inner.watch_roots(), tx) {
            Ok(w) => {
                fs_watcher = Some(w);
                supervisor = supervisor.with_events(rx);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Filesystem watcher unavailable, polling only");
            }
        }
    }

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let runner = match Handle::try_current() {
        Ok(handle) => Runner::Task(handle.spawn(supervisor.run(signal))),
        Err(_) => spawn_thread(supervisor, signal),
    };

    ReloadHandle {
        shutdown,
        runner,
        watcher: fs_watcher,
    }
}

/// Run the supervisor on its own thread and single-threaded runtime.
fn spawn_thread(supervisor: ReloadSupervisor, signal: broadcast::Receiver<()>) -> Runner {
    let rt = match runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build reload runtime, automatic reload disabled");
            return Runner::Idle;
        }
    };

    match thread::Builder::new()
        .name("config-reload".into())
        .spawn(move || rt.block_on(supervisor.run(signal)))
    {
        Ok(handle) => Runner::Thread(handle),
        Err(e) => {
            tracing::error!(error = %e, "Failed to spawn reload thread, automatic reload disabled");
            Runner::Idle
        }
    }
}
