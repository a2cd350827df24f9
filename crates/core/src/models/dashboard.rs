use serde::{Deserialize, Serialize};

use super::chart::ChartSeries;
use super::stat::DerivedStat;
use super::state::RefreshStatus;

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub status: RefreshStatus,

    /// Header stat for the latest snapshot, if any
    pub stat: Option<DerivedStat>,

    /// Chart points and axis domain for the full history
    pub chart: ChartSeries,

    /// Seconds since the displayed data was fetched
    pub data_age_secs: Option<i64>,

    /// Displayed data predates a failed cycle
    pub is_stale: bool,
}

impl DashboardView {
    /// Ready, but the agent has not recorded anything yet.
    pub fn is_empty(&self) -> bool {
        self.status == RefreshStatus::Ready && self.chart.is_empty()
    }

    /// Whether the chart has a usable scale.
    pub fn can_render_chart(&self) -> bool {
        !self.chart.is_empty() && !self.chart.domain.is_degenerate()
    }
}
