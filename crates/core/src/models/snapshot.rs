use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// One observation of the trading account, as recorded by the agent.
///
/// `timestamp` is the source of truth for ordering. Snapshots are immutable
/// once built; a refresh replaces the whole sequence rather than merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRecord")]
pub struct Snapshot {
    /// When the observation was taken
    pub timestamp: DateTime<Utc>,

    /// Total portfolio value (always finite and non-negative)
    pub total: f64,

    /// Available (uncommitted) balance
    pub available: f64,
}

impl Snapshot {
    /// Build a validated snapshot. Rejects a negative or non-finite `total`
    /// and a non-finite `available`.
    pub fn new(timestamp: DateTime<Utc>, total: f64, available: f64) -> Result<Self, CoreError> {
        if !total.is_finite() || total < 0.0 {
            return Err(CoreError::InvalidSnapshot(format!(
                "total {total} at {timestamp} must be a finite, non-negative number"
            )));
        }
        if !available.is_finite() {
            return Err(CoreError::InvalidSnapshot(format!(
                "available {available} at {timestamp} must be a finite number"
            )));
        }
        Ok(Self {
            timestamp,
            total,
            available,
        })
    }
}

/// Unchecked serialized form; deserialization goes through [`Snapshot::new`].
#[derive(Deserialize)]
struct SnapshotRecord {
    timestamp: DateTime<Utc>,
    total: f64,
    available: f64,
}

impl TryFrom<SnapshotRecord> for Snapshot {
    type Error = CoreError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        Snapshot::new(record.timestamp, record.total, record.available)
    }
}

/// True when timestamps never decrease along the sequence.
pub fn is_chronological(snapshots: &[Snapshot]) -> bool {
    snapshots
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp)
}
