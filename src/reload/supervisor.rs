//! Background reload supervisor.
//!
//! # Responsibilities
//! - Periodically compare tracked modification times
//! - Resync when any tracked source changed
//! - Optionally react early to filesystem events
//! - Exit on shutdown, or once the service it watches is gone
//!
//! Between ticks readers keep the current snapshot, even if a file has
//! already changed on disk.

use std::sync::Weak;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task;
use tokio::time::{self, MissedTickBehavior};

use crate::service::{ReloadKind, ServiceInner};

pub(crate) struct ReloadSupervisor {
    inner: Weak<ServiceInner>,
    interval: Duration,
    events: Option<mpsc::Receiver<()>>,
}

impl ReloadSupervisor {
    pub(crate) fn new(inner: Weak<ServiceInner>, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            events: None,
        }
    }

    /// Also check for changes whenever a message arrives on `events`.
    pub(crate) fn with_events(mut self, events: mpsc::Receiver<()>) -> Self {
        self.events = Some(events);
        self
    }

    pub(crate) async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let ReloadSupervisor {
            inner,
            interval,
            mut events,
        } = self;

        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            events = events.is_some(),
            "Reload supervisor starting"
        );

        let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let alive = tokio::select! {
                _ = ticker.tick() => check(&inner, ReloadKind::Poll).await,
                event = next_event(&mut events) => match event {
                    Some(()) => check(&inner, ReloadKind::Event).await,
                    None => {
                        tracing::warn!("Filesystem event channel closed, continuing with polling only");
                        events = None;
                        true
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Reload supervisor received shutdown signal, exiting loop");
                    false
                }
            };
            if !alive {
                break;
            }
        }
    }
}

async fn next_event(events: &mut Option<mpsc::Receiver<()>>) -> Option<()> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// File I/O runs on the blocking pool so ticks never stall the runtime.
///
/// Returns `false` once the service has been dropped.
async fn check(inner: &Weak<ServiceInner>, trigger: ReloadKind) -> bool {
    let Some(inner) = inner.upgrade() else {
        tracing::debug!("Configuration service dropped, reload supervisor exiting");
        return false;
    };
    if let Err(e) = task::spawn_blocking(move || inner.reload_if_changed(trigger)).await {
        tracing::error!(error = %e, "Reload check task failed");
    }
    true
}
