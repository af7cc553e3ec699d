//! Auto-sync scheduler - decides when the synchronizer runs
//!
//! The [`AutoSyncScheduler`] owns the timers and the manual request channel
//! and spawns a [`Synchronizer`] pass for every trigger that qualifies.
//!
//! ## Triggers
//!
//! ```text
//! startup delay (once) ─┐
//! catch-up delay (once) ─┼──→ enabled && idle? ──→ tokio::spawn(run_pass)
//! periodic interval ─────┘
//! SchedulerHandle::request_sync ─────────────────→ tokio::spawn(run_pass)
//! ```
//!
//! Manual requests skip the enabled check; the synchronizer's own
//! single-flight guard turns overlapping requests into no-ops. Cancelling
//! the shutdown token stops scheduling and waits for passes already running.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mindlog_core::config::SyncConfig;

use crate::engine::Synchronizer;

/// Pending manual requests kept before new ones are dropped
const REQUEST_BUFFER: usize = 8;

// ============================================================================
// SyncTrigger
// ============================================================================

/// Why a pass was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Startup,
    CatchUp,
    Timer,
    Manual,
}

impl SyncTrigger {
    /// Automatic triggers only fire while auto-sync is enabled and idle
    pub fn is_automatic(self) -> bool {
        !matches!(self, SyncTrigger::Manual)
    }
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncTrigger::Startup => "startup",
            SyncTrigger::CatchUp => "catch-up",
            SyncTrigger::Timer => "timer",
            SyncTrigger::Manual => "manual",
        };
        f.write_str(name)
    }
}

// ============================================================================
// SchedulerHandle
// ============================================================================

/// Cloneable handle for asking a running scheduler for a pass
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<SyncTrigger>,
}

impl SchedulerHandle {
    /// Requests an immediate pass
    ///
    /// Returns false if the scheduler has stopped or its queue is full.
    pub fn request_sync(&self) -> bool {
        match self.tx.try_send(SyncTrigger::Manual) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Manual sync request dropped");
                false
            }
        }
    }
}

// ============================================================================
// AutoSyncScheduler
// ============================================================================

/// Timer settings of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTimings {
    pub interval: Duration,
    pub startup_delay: Duration,
    pub catchup_delay: Duration,
}

impl From<&SyncConfig> for SchedulerTimings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs.max(1)),
            startup_delay: Duration::from_secs(config.startup_delay_secs),
            catchup_delay: Duration::from_secs(config.catchup_delay_secs),
        }
    }
}

/// Runs sync passes on a schedule until cancelled
pub struct AutoSyncScheduler {
    synchronizer: Arc<Synchronizer>,
    timings: SchedulerTimings,
    requests: mpsc::Receiver<SyncTrigger>,
    in_flight: Vec<JoinHandle<()>>,
}

impl AutoSyncScheduler {
    /// Creates a scheduler from the `sync` configuration section
    pub fn new(synchronizer: Arc<Synchronizer>, config: &SyncConfig) -> (Self, SchedulerHandle) {
        Self::with_timings(synchronizer, SchedulerTimings::from(config))
    }

    pub fn with_timings(
        synchronizer: Arc<Synchronizer>,
        timings: SchedulerTimings,
    ) -> (Self, SchedulerHandle) {
        let (tx, requests) = mpsc::channel(REQUEST_BUFFER);

        info!(
            interval_secs = timings.interval.as_secs(),
            startup_delay_secs = timings.startup_delay.as_secs(),
            catchup_delay_secs = timings.catchup_delay.as_secs(),
            "Creating auto-sync scheduler"
        );

        let scheduler = Self {
            synchronizer,
            timings,
            requests,
            in_flight: Vec::new(),
        };
        (scheduler, SchedulerHandle { tx })
    }

    /// Main loop
    ///
    /// Waits on the one-shot delays, the periodic timer, manual requests and
    /// the shutdown token via `tokio::select!`. Returns after `shutdown` is
    /// cancelled and every spawned pass has finished.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Auto-sync scheduler starting");

        let startup = tokio::time::sleep(self.timings.startup_delay);
        let catchup = tokio::time::sleep(self.timings.catchup_delay);
        tokio::pin!(startup, catchup);
        let mut startup_pending = true;
        let mut catchup_pending = true;

        let interval = self.timings.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, scheduler stopping");
                    break;
                }

                _ = &mut startup, if startup_pending => {
                    startup_pending = false;
                    self.dispatch(SyncTrigger::Startup).await;
                }

                _ = &mut catchup, if catchup_pending => {
                    catchup_pending = false;
                    self.dispatch(SyncTrigger::CatchUp).await;
                }

                _ = ticker.tick() => {
                    self.dispatch(SyncTrigger::Timer).await;
                }

                Some(trigger) = self.requests.recv() => {
                    self.dispatch(trigger).await;
                }
            }
        }

        let pending = self.in_flight.len();
        for handle in self.in_flight.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Sync task ended abnormally");
            }
        }
        info!(awaited = pending, "Auto-sync scheduler stopped");
    }

    /// Spawns a pass for `trigger` if it qualifies; returns whether it did
    async fn dispatch(&mut self, trigger: SyncTrigger) -> bool {
        self.in_flight.retain(|handle| !handle.is_finished());

        if trigger.is_automatic() {
            if self.synchronizer.is_syncing() {
                debug!(%trigger, "Pass already running, trigger ignored");
                return false;
            }
            match self.synchronizer.store().is_auto_sync_enabled().await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(%trigger, "Auto-sync disabled, trigger ignored");
                    return false;
                }
                Err(e) => {
                    warn!(%trigger, error = %e, "Could not read auto-sync flag");
                    return false;
                }
            }
        }

        debug!(%trigger, "Starting sync pass");
        let synchronizer = Arc::clone(&self.synchronizer);
        self.in_flight.push(tokio::spawn(async move {
            match synchronizer.run_pass().await {
                Ok(outcome) => info!(%trigger, result = %outcome.message(), "Sync finished"),
                Err(e) => warn!(%trigger, error = %e, "Sync failed"),
            }
        }));
        true
    }
}

// ============================================================================
// Unit tests
// ============================================================================
