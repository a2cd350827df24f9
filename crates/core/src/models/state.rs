use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot::Snapshot;

/// Message shown to the viewer when a fetch cycle fails. The underlying error
/// is only logged.
pub const FETCH_FAILED_MESSAGE: &str =
    "Failed to fetch portfolio data. Make sure the API server is running and reachable.";

/// Status of the most recent fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshStatus {
    Loading,
    Ready,
    Failed { message: String },
}

/// Result of one successful fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioData {
    /// Full history, oldest-first as the API returns it
    pub history: Vec<Snapshot>,

    /// Most recent snapshot; `None` while the agent has recorded nothing
    pub latest: Option<Snapshot>,

    /// When this data was applied
    pub fetched_at: DateTime<Utc>,
}

/// Everything the presentation layer observes about the refresh loop.
///
/// `data` is the last good fetch and survives failed cycles, so a viewer
/// can keep showing stale content under an error banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshState {
    pub status: RefreshStatus,
    pub data: Option<PortfolioData>,
    /// Sequence number of the last cycle whose result was applied
    pub sequence: u64,
}

impl Default for RefreshState {
    fn default() -> Self {
        Self {
            status: RefreshStatus::Loading,
            data: None,
            sequence: 0,
        }
    }
}

impl RefreshState {
    pub fn is_loading(&self) -> bool {
        self.status == RefreshStatus::Loading
    }

    pub fn is_ready(&self) -> bool {
        self.status == RefreshStatus::Ready
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, RefreshStatus::Failed { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            RefreshStatus::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn history(&self) -> &[Snapshot] {
        self.data.as_ref().map(|d| d.history.as_slice()).unwrap_or(&[])
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.data.as_ref().and_then(|d| d.latest.as_ref())
    }

    /// How old the displayed data is at `now`; `None` before the first success.
    pub fn data_age(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.data.as_ref().map(|d| now - d.fetched_at)
    }

    /// True when data is shown but the last attempted cycle did not produce it,
    /// i.e. a cycle is in flight or failed since the last success.
    pub fn is_stale(&self) -> bool {
        self.data.is_some() && !self.is_ready()
    }

    // ── Transitions (driven by the refresh scheduler) ───────────────

    pub(crate) fn begin_cycle(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.status = RefreshStatus::Loading;
        true
    }

    pub(crate) fn apply_success(&mut self, sequence: u64, data: PortfolioData) -> bool {
        if sequence <= self.sequence {
            return false;
        }
        self.sequence = sequence;
        self.status = RefreshStatus::Ready;
        self.data = Some(data);
        true
    }

    pub(crate) fn apply_failure(&mut self, sequence: u64, message: &str) -> bool {
        if sequence <= self.sequence {
            return false;
        }
        self.sequence = sequence;
        self.status = RefreshStatus::Failed {
            message: message.to_string(),
        };
        true
    }
}
