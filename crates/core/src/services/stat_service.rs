use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::baseline::Baseline;
use crate::models::snapshot::Snapshot;
use crate::models::stat::{DerivedStat, ProfitLoss};

/// Derives profit/loss statistics relative to a fixed baseline.
///
/// Pure: no I/O, no state between calls.
#[derive(Debug, Clone, Copy)]
pub struct StatService {
    baseline: Baseline,
}

impl StatService {
    pub fn new(baseline: Baseline) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    /// Summary stat for the latest snapshot; `None` until one is available.
    pub fn derive(&self, latest: Option<&Snapshot>) -> Option<DerivedStat> {
        latest.map(|snapshot| DerivedStat {
            total: snapshot.total,
            profit_loss: profit_loss(snapshot.total, &self.baseline),
        })
    }
}

/// Change of `total` against `baseline`.
///
/// The percentage is rounded to 2 decimals for display; `is_profit` is
/// decided on the unrounded change, so zero counts as profit.
pub fn profit_loss(total: f64, baseline: &Baseline) -> ProfitLoss {
    let change = total - baseline.value();
    let percent = change / baseline.value() * 100.0;
    ProfitLoss {
        change,
        percent_change: format_percent(percent),
        is_profit: change >= 0.0,
    }
}

/// Two decimals, halfway cases rounded away from zero (`0.125` -> `0.13`,
/// `-0.125` -> `-0.13`). The magnitude is rounded and the sign put back, so a tiny
/// negative value keeps its minus sign: `-0.001` -> `-0.00`.
pub fn format_percent(percent: f64) -> String {
    let magnitude = percent.abs();
    let digits = match Decimal::from_f64_retain(magnitude) {
        Some(exact) => {
            let rounded = exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            format!("{rounded:.2}")
        }
        // Outside the decimal range; halfway cases no longer occur there.
        None => format!("{magnitude:.2}"),
    };
    if percent < 0.0 {
        format!("-{digits}")
    } else {
        digits
    }
}
