//! JSON shapes served by the portfolio API.
//!
//! `GET /api/portfolio/history` returns an array of
//! `{timestamp, total, available}` objects, oldest-first;
//! `GET /api/portfolio/latest` returns a single object of the same shape, or
//! `{timestamp: null, total: 0, available: 0}` before anything was recorded.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::errors::CoreError;
use crate::models::snapshot::Snapshot;

/// Offset-less formats the recorder is known to emit; read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Deserialize)]
struct RawSnapshot {
    timestamp: Option<String>,
    total: Option<RawNumber>,
    available: Option<RawNumber>,
}

/// Decimals arrive as numeric strings ("5012.34") or plain JSON numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Text(String),
    Number(f64),
}

impl RawNumber {
    fn to_f64(&self, field: &str) -> Result<f64, CoreError> {
        match self {
            RawNumber::Number(n) => Ok(*n),
            RawNumber::Text(s) => s.trim().parse().map_err(|e| {
                CoreError::InvalidSnapshot(format!("{field} {s:?} is not a number: {e}"))
            }),
        }
    }
}

impl RawSnapshot {
    fn into_snapshot(self) -> Result<Snapshot, CoreError> {
        let raw_ts = self
            .timestamp
            .ok_or_else(|| CoreError::InvalidSnapshot("missing timestamp".into()))?;
        let timestamp = parse_timestamp(&raw_ts)?;
        let total = self
            .total
            .ok_or_else(|| CoreError::InvalidSnapshot(format!("missing total at {raw_ts}")))?
            .to_f64("total")?;
        let available = self
            .available
            .ok_or_else(|| CoreError::InvalidSnapshot(format!("missing available at {raw_ts}")))?
            .to_f64("available")?;
        Snapshot::new(timestamp, total, available)
    }
}

/// Parse an ISO-8601 instant. Timestamps without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| CoreError::InvalidSnapshot(format!("unparsable timestamp {raw:?}")))
}

/// Decode a history payload. One bad entry rejects the whole payload.
pub fn parse_history(body: &str) -> Result<Vec<Snapshot>, CoreError> {
    let raw: Vec<RawSnapshot> = serde_json::from_str(body)?;
    raw.into_iter()
        .enumerate()
        .map(|(i, entry)| {
            entry.into_snapshot().map_err(|e| {
                CoreError::MalformedPayload(format!("history entry {i}: {e}"))
            })
        })
        .collect()
}

/// Decode a latest-snapshot payload. A null body or null timestamp means
/// nothing has been recorded yet.
pub fn parse_latest(body: &str) -> Result<Option<Snapshot>, CoreError> {
    let raw: Option<RawSnapshot> = serde_json::from_str(body)?;
    match raw {
        Some(entry) if entry.timestamp.is_some() => entry
            .into_snapshot()
            .map(Some)
            .map_err(|e| CoreError::MalformedPayload(format!("latest snapshot: {e}"))),
        _ => Ok(None),
    }
}
