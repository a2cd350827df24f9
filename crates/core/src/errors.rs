use thiserror::Error;

/// Unified error type for the entire trader-dashboard-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport ───────────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    // ── Payload ─────────────────────────────────────────────────────
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid baseline: {0}")]
    InvalidBaseline(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // ── Scheduler ───────────────────────────────────────────────────
    #[error("Refresh scheduler has been stopped")]
    SchedulerStopped,
}

impl CoreError {
    /// Network unreachable, timeouts and non-success HTTP statuses.
    pub fn is_transport(&self) -> bool {
        matches!(self, CoreError::Network(_) | CoreError::HttpStatus { .. })
    }

    /// The server answered, but not with something we can read as snapshots.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            CoreError::MalformedPayload(_) | CoreError::InvalidSnapshot(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::MalformedPayload(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return CoreError::HttpStatus {
                url: e.url().map(redact_query).unwrap_or_default(),
                status: status.as_u16(),
            };
        }
        if e.is_decode() {
            return CoreError::MalformedPayload(e.to_string());
        }
        // reqwest errors often contain full URLs; strip query parameters.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

fn redact_query(url: &reqwest::Url) -> String {
    let mut url = url.clone();
    if url.query().is_some() {
        url.set_query(None);
    }
    url.to_string()
}
