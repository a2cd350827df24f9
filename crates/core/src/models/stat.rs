use serde::{Deserialize, Serialize};

/// Profit or loss classification; drives the line and header color.
///
/// There is no neutral class: a change of exactly zero counts as profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Profit,
    Loss,
}

impl Trend {
    pub fn from_change(change: f64) -> Self {
        if change >= 0.0 {
            Trend::Profit
        } else {
            Trend::Loss
        }
    }

    /// Hex color the presentation layer paints this trend with.
    pub fn color(&self) -> &'static str {
        match self {
            Trend::Profit => "#48bb78",
            Trend::Loss => "#f56565",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Profit => write!(f, "Profit"),
            Trend::Loss => write!(f, "Loss"),
        }
    }
}

/// Change of one value relative to the baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitLoss {
    /// `total - baseline`
    pub change: f64,

    /// `change / baseline * 100`, fixed to 2 decimal places (e.g. "-2.99")
    pub percent_change: String,

    /// `change >= 0`
    pub is_profit: bool,
}

impl ProfitLoss {
    pub fn trend(&self) -> Trend {
        if self.is_profit {
            Trend::Profit
        } else {
            Trend::Loss
        }
    }

    /// Header label such as `+149.50 (+2.99%)` or `-149.50 (-2.99%)`.
    /// Only profit gets an explicit sign; losses carry their own minus.
    pub fn change_label(&self) -> String {
        let sign = if self.is_profit { "+" } else { "" };
        format!(
            "{sign}{:.2} ({sign}{}%)",
            self.change, self.percent_change
        )
    }
}

/// Summary of the latest snapshot against the baseline.
///
/// Recomputed on every refresh; holds no state across refreshes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStat {
    /// Total portfolio value of the latest snapshot
    pub total: f64,

    #[serde(flatten)]
    pub profit_loss: ProfitLoss,
}

impl DerivedStat {
    pub fn change(&self) -> f64 {
        self.profit_loss.change
    }

    pub fn percent_change(&self) -> &str {
        &self.profit_loss.percent_change
    }

    pub fn is_profit(&self) -> bool {
        self.profit_loss.is_profit
    }

    pub fn trend(&self) -> Trend {
        self.profit_loss.trend()
    }

    pub fn change_label(&self) -> String {
        self.profit_loss.change_label()
    }
}
