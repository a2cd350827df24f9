pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use models::{
    baseline::Baseline, dashboard::DashboardView, settings::MonitorSettings,
    state::RefreshState,
};
use providers::{http::HttpSnapshotSource, traits::SnapshotSource};
use services::{
    chart_service::ChartService,
    refresh_scheduler::{CycleOutcome, RefreshScheduler},
    stat_service::StatService,
};
use tokio::sync::watch;

use errors::CoreError;

/// Main entry point for the dashboard core.
/// Owns the refresh loop and the services that turn its state into a view.
///
/// The baseline is fixed at construction and shared by the header stat and
/// the chart, so both always frame profit/loss the same way.
#[must_use]
pub struct PortfolioMonitor {
    scheduler: RefreshScheduler,
    stat_service: StatService,
    chart_service: ChartService,
}

impl std::fmt::Debug for PortfolioMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioMonitor")
            .field("baseline", &self.stat_service.baseline())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl PortfolioMonitor {
    /// Build a monitor over any snapshot source.
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        settings: &MonitorSettings,
    ) -> Result<Self, CoreError> {
        let scheduler = RefreshScheduler::new(source, settings.refresh_interval)?;
        Ok(Self {
            scheduler,
            stat_service: StatService::new(settings.baseline),
            chart_service: ChartService::new(settings.baseline),
        })
    }

    /// Build a monitor polling the portfolio HTTP API.
    pub fn with_http(settings: &MonitorSettings) -> Result<Self, CoreError> {
        let source = HttpSnapshotSource::from_settings(settings)?;
        Self::new(Arc::new(source), settings)
    }

    #[must_use]
    pub fn baseline(&self) -> Baseline {
        self.stat_service.baseline()
    }

    // ── Refresh loop ────────────────────────────────────────────────

    /// Fetch now, then every refresh interval. Requires a tokio runtime.
    pub fn start(&self) -> Result<(), CoreError> {
        self.scheduler.start()
    }

    /// Stop polling. Must be called on teardown; dropping the monitor does it too.
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// User-triggered fetch cycle.
    pub async fn retry(&self) -> CycleOutcome {
        self.scheduler.retry().await
    }

    /// Receiver notified on every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.scheduler.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> RefreshState {
        self.scheduler.state()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    // ── Presentation ────────────────────────────────────────────────

    /// View of the current state.
    #[must_use]
    pub fn view(&self) -> DashboardView {
        self.render(&self.state(), Utc::now())
    }

    /// Build the view for a given state, e.g. one received from `subscribe()`.
    #[must_use]
    pub fn render(&self, state: &RefreshState, now: DateTime<Utc>) -> DashboardView {
        DashboardView {
            status: state.status.clone(),
            stat: self.stat_service.derive(state.latest()),
            chart: self.chart_service.normalize(state.history()),
            data_age_secs: state.data_age(now).map(|age| age.num_seconds()),
            is_stale: state.is_stale(),
        }
    }
}
