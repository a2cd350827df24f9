use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::snapshot::Snapshot;

/// Where portfolio snapshots come from.
///
/// The dashboard only ever reads; the trading agent that records snapshots
/// and the API serving them live elsewhere. Tests swap in an in-memory source.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Full snapshot history, oldest-first.
    async fn fetch_history(&self) -> Result<Vec<Snapshot>, CoreError>;

    /// The most recent snapshot, or `None` if nothing has been recorded yet.
    async fn fetch_latest(&self) -> Result<Option<Snapshot>, CoreError>;
}
