use chrono::{DateTime, FixedOffset, Utc};

use crate::models::baseline::Baseline;
use crate::models::chart::{AxisDomain, ChartPoint, ChartSeries};
use crate::models::snapshot::Snapshot;
use crate::services::stat_service::profit_loss;

/// Indian Standard Time, UTC+05:30.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Headroom added on each side of the baseline-centered domain.
const DOMAIN_MARGIN: f64 = 1.1;

/// Generates chart-ready data sets from a snapshot sequence.
///
/// The core computes all the numbers; the frontend only renders.
/// Chart data includes:
/// - One point per snapshot with its profit/loss against the baseline
/// - A value-axis domain centered on the baseline
#[derive(Debug, Clone, Copy)]
pub struct ChartService {
    baseline: Baseline,
}

impl ChartService {
    pub fn new(baseline: Baseline) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    /// Turn an oldest-first snapshot sequence into display points and an
    /// axis domain.
    ///
    /// Order is taken as given; an unsorted input draws a jagged line but is
    /// otherwise handled like any other.
    pub fn normalize(&self, snapshots: &[Snapshot]) -> ChartSeries {
        let points = snapshots
            .iter()
            .map(|snapshot| ChartPoint {
                timestamp: snapshot.timestamp,
                display_time: format_display_time(snapshot.timestamp),
                total: snapshot.total,
                available: snapshot.available,
                profit_loss: profit_loss(snapshot.total, &self.baseline),
            })
            .collect();

        ChartSeries {
            points,
            domain: axis_domain(snapshots.iter().map(|s| s.total), &self.baseline),
        }
    }
}

/// Symmetric domain around the baseline that contains every total with a
/// 10% margin.
///
/// No totals yields `[baseline, baseline]`, which callers must treat as
/// "no scale yet" (see [`AxisDomain::is_degenerate`]).
pub fn axis_domain(totals: impl IntoIterator<Item = f64>, baseline: &Baseline) -> AxisDomain {
    let base = baseline.value();
    let (min_value, max_value) = totals
        .into_iter()
        .fold((base, base), |(lo, hi), total| (lo.min(total), hi.max(total)));

    let range = (max_value - base).max(base - min_value);
    AxisDomain {
        min: base - range * DOMAIN_MARGIN,
        max: base + range * DOMAIN_MARGIN,
    }
}

/// Render an instant in IST regardless of the viewer's local timezone,
/// e.g. `01/15/2025, 05:30:00 PM IST`.
pub fn format_display_time(timestamp: DateTime<Utc>) -> String {
    let ist =
        FixedOffset::east_opt(IST_OFFSET_SECS).expect("+05:30 is within the valid offset range");
    timestamp
        .with_timezone(&ist)
        .format("%m/%d/%Y, %I:%M:%S %p IST")
        .to_string()
}
