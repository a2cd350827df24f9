use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::errors::CoreError;
use crate::models::snapshot::is_chronological;
use crate::models::state::{PortfolioData, RefreshState, FETCH_FAILED_MESSAGE};
use crate::providers::traits::SnapshotSource;

/// What happened to one fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Both retrievals succeeded and the state moved to `Ready`.
    Applied,
    /// A retrieval failed and the state moved to `Failed`.
    Failed,
    /// The result arrived after teardown (or was superseded) and was dropped.
    Discarded,
    /// A scheduled tick fired while another cycle was in flight.
    Skipped,
}

/// Drives periodic retrieval of the portfolio history and latest snapshot.
///
/// State starts as `Loading` and is published through a `watch` channel.
/// Cycles never overlap: a scheduled tick that fires while a cycle is in
/// flight is dropped, a manual [`retry`](Self::retry) waits for it. Every
/// cycle carries a sequence number and only a newer result replaces an older
/// one. After [`stop`](Self::stop) no result is applied any more.
pub struct RefreshScheduler {
    shared: Arc<Shared>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    source: Arc<dyn SnapshotSource>,
    interval: Duration,
    state_tx: watch::Sender<RefreshState>,
    issued: AtomicU64,
    stopped: AtomicBool,
    cycle_lock: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("source", &self.shared.source.name())
            .field("interval", &self.shared.interval)
            .field("running", &self.is_running())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl RefreshScheduler {
    pub fn new(source: Arc<dyn SnapshotSource>, interval: Duration) -> Result<Self, CoreError> {
        if interval.is_zero() {
            return Err(CoreError::Config("refresh interval must be non-zero".into()));
        }
        let (state_tx, _) = watch::channel(RefreshState::default());
        Ok(Self {
            shared: Arc::new(Shared {
                source,
                interval,
                state_tx,
                issued: AtomicU64::new(0),
                stopped: AtomicBool::new(false),
                cycle_lock: tokio::sync::Mutex::new(()),
            }),
            timer: Mutex::new(None),
        })
    }

    /// Run a fetch cycle now, then one every interval until stopped.
    ///
    /// Must be called from within a tokio runtime. Calling it again while
    /// running is a no-op; after `stop()` it fails with `SchedulerStopped`.
    pub fn start(&self) -> Result<(), CoreError> {
        if self.is_stopped() {
            return Err(CoreError::SchedulerStopped);
        }
        let mut timer = self.timer.lock().unwrap_or_else(|e| e.into_inner());
        if timer.is_some() {
            debug!(source = self.shared.source.name(), "Refresh scheduler already running");
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CoreError::Config(format!("refresh scheduler needs a tokio runtime: {e}")))?;
        let shared = Arc::clone(&self.shared);
        *timer = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(shared.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                // First tick completes immediately.
                ticker.tick().await;
                if shared.stopped.load(Ordering::SeqCst) {
                    break;
                }
                shared.run_scheduled().await;
            }
        }));
        info!(
            source = self.shared.source.name(),
            interval_secs = self.shared.interval.as_secs_f64(),
            "Refresh scheduler started"
        );
        Ok(())
    }

    /// Cancel the timer and suppress any late-arriving result. Idempotent.
    pub fn stop(&self) {
        // Flip the flag under the state lock so no cycle can be halfway
        // through applying its result.
        let mut first = false;
        self.shared.state_tx.send_if_modified(|_| {
            first = !self.shared.stopped.swap(true, Ordering::SeqCst);
            false
        });

        let handle = self.timer.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            handle.abort();
        }
        if first {
            info!(source = self.shared.source.name(), "Refresh scheduler stopped");
        }
    }

    /// Manual fetch cycle outside the timer cadence.
    pub async fn retry(&self) -> CycleOutcome {
        self.shared.run_manual().await
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.shared.state_tx.subscribe()
    }

    /// Current state (cloned).
    pub fn state(&self) -> RefreshState {
        self.shared.state_tx.borrow().clone()
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn is_running(&self) -> bool {
        !self.is_stopped()
            && self
                .timer
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.stopped.load(Ordering::SeqCst)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    async fn run_scheduled(&self) -> CycleOutcome {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            debug!(source = self.source.name(), "Cycle in flight, skipping scheduled tick");
            return CycleOutcome::Skipped;
        };
        self.run_cycle().await
    }

    async fn run_manual(&self) -> CycleOutcome {
        let _guard = self.cycle_lock.lock().await;
        self.run_cycle().await
    }

    async fn run_cycle(&self) -> CycleOutcome {
        if self.stopped.load(Ordering::SeqCst) {
            return CycleOutcome::Discarded;
        }
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.apply(|state| state.begin_cycle());

        match self.fetch().await {
            Ok(data) => {
                if self.apply(|state| state.apply_success(sequence, data)) {
                    debug!(source = self.source.name(), sequence, "Fetch cycle applied");
                    CycleOutcome::Applied
                } else {
                    debug!(source = self.source.name(), sequence, "Discarding fetch result");
                    CycleOutcome::Discarded
                }
            }
            Err(e) => {
                error!(
                    source = self.source.name(),
                    sequence,
                    error = %e,
                    "Error fetching portfolio data",
                );
                if self.apply(|state| state.apply_failure(sequence, FETCH_FAILED_MESSAGE)) {
                    CycleOutcome::Failed
                } else {
                    debug!(source = self.source.name(), sequence, "Discarding fetch failure");
                    CycleOutcome::Discarded
                }
            }
        }
    }

    /// History first, then latest. Both must succeed.
    async fn fetch(&self) -> Result<PortfolioData, CoreError> {
        let history = self.source.fetch_history().await?;
        if !is_chronological(&history) {
            warn!(
                source = self.source.name(),
                points = history.len(),
                "Portfolio history is not in chronological order"
            );
        }
        let latest = self.source.fetch_latest().await?;
        Ok(PortfolioData {
            history,
            latest,
            fetched_at: Utc::now(),
        })
    }

    /// Mutate state unless the scheduler was stopped; returns whether it changed.
    fn apply(&self, update: impl FnOnce(&mut RefreshState) -> bool) -> bool {
        self.state_tx
            .send_if_modified(|state| !self.stopped.load(Ordering::SeqCst) && update(state))
    }
}
