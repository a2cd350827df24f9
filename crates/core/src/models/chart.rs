use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stat::{ProfitLoss, Trend};

/// A single display-ready point of the portfolio line chart.
///
/// The core computes all the numbers; the frontend only renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Source timestamp, kept for tooltips and ordering
    pub timestamp: DateTime<Utc>,

    /// Timestamp rendered in IST, e.g. "01/15/2025, 05:30:00 PM IST"
    pub display_time: String,

    /// Total portfolio value at this point
    pub total: f64,

    /// Available balance at this point (plotted as a secondary line)
    pub available: f64,

    #[serde(flatten)]
    pub profit_loss: ProfitLoss,
}

/// The numeric range the chart's value axis spans.
///
/// Always symmetric around the baseline. A zero-width domain means there was
/// not enough data to build a meaningful scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisDomain {
    pub min: f64,
    pub max: f64,
}

impl AxisDomain {
    /// True for the collapsed `[baseline, baseline]` domain of an empty series.
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Everything the chart needs for one refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
    pub domain: AxisDomain,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Trend of the most recent point; `None` for an empty series.
    pub fn line_trend(&self) -> Option<Trend> {
        self.points.last().map(|p| p.profit_loss.trend())
    }

    /// Line hue picked from the most recent point's change.
    pub fn line_color(&self) -> Option<&'static str> {
        self.line_trend().map(|t| t.color())
    }
}
