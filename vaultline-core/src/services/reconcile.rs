//! Reconciliation loop - keep the held record in step with the store
//!
//! On every tick an authenticated session re-fetches the collection and
//! replaces its record with the store's current copy. Failures are logged
//! and the held record is kept; the loop itself never stops on error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::services::session::SessionManager;
use crate::services::verifier::find_by_identity;

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session is anonymous; nothing fetched
    Idle,
    /// A previous tick is still waiting on the store
    Busy,
    /// Held record replaced and re-rendered
    Refreshed { changed: bool },
    /// Store no longer lists the held identity; record kept
    Missing,
    /// Fetch failed; record kept
    Failed,
    /// Session changed while the fetch was in flight; result dropped
    Discarded,
}

/// Shortest period the loop runs at
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Periodic reconciliation of the held record
pub struct Reconciler {
    session: Arc<SessionManager>,
    interval: Duration,
    busy: AtomicBool,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Reconciler {
    /// Create a reconciler; periods shorter than `MIN_INTERVAL` are raised to it
    pub fn new(session: Arc<SessionManager>, interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            warn!(
                requested_us = interval.as_micros() as u64,
                "Reconciliation interval too short; using {} ms",
                MIN_INTERVAL.as_millis()
            );
        }
        Self {
            session,
            interval: interval.max(MIN_INTERVAL),
            busy: AtomicBool::new(false),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one reconciliation pass
    ///
    /// Never returns an error: every failure leaves the held record as it was.
    pub async fn tick(&self) -> TickOutcome {
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            debug!("Reconciliation tick skipped: previous tick still running");
            return TickOutcome::Busy;
        };

        let Some(identity_key) = self.session.identity_key() else {
            debug!("Reconciliation tick skipped: session is anonymous");
            return TickOutcome::Idle;
        };

        let store = self.session.store();
        let records = match store.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    store = store.name(),
                    identity_key = %identity_key,
                    error = %e,
                    "Reconciliation fetch failed; keeping held record"
                );
                return TickOutcome::Failed;
            }
        };

        let Some(fresh) = find_by_identity(&records, &identity_key) else {
            warn!(
                identity_key = %identity_key,
                "Record store no longer lists the held identity; keeping held record"
            );
            return TickOutcome::Missing;
        };

        let changed = match self.session.refresh_record(fresh.clone()) {
            Ok(changed) => changed,
            Err(e) => {
                warn!(error = %e, "Discarding refreshed record");
                return TickOutcome::Discarded;
            }
        };

        if changed {
            info!(identity_key = %identity_key, "Held record refreshed from store");
        } else {
            debug!(identity_key = %identity_key, "Held record unchanged");
        }

        TickOutcome::Refreshed { changed }
    }

    /// Start ticking on a background task
    ///
    /// The first tick fires one interval after the call. Ticks missed while a
    /// slow fetch was running are skipped rather than bunched up.
    pub fn spawn(self: Arc<Self>) -> ReconcileHandle {
        let shutdown = Arc::new(Notify::new());
        let stop = shutdown.clone();

        let task = tokio::spawn(async move {
            info!(interval_ms = self.interval.as_millis() as u64, "Starting reconciliation loop");

            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.tick().await;
                    }
                    _ = stop.notified() => {
                        info!("Stopping reconciliation loop");
                        return;
                    }
                }
            }
        });

        ReconcileHandle { shutdown, task }
    }
}

/// Handle to a running reconciliation loop
pub struct ReconcileHandle {
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl ReconcileHandle {
    /// Stop the loop after any in-flight tick completes
    pub async fn stop(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            error!(error = %e, "Reconciliation loop ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
