use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::baseline::Baseline;
use crate::errors::CoreError;

/// Fixed polling period of the dashboard.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Per-request timeout for the snapshot API.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// API endpoint used outside production deployments.
pub const DEV_API_BASE_URL: &str = "http://localhost:8000";

pub const ENV_API_URL: &str = "TRADER_API_URL";
pub const ENV_DEPLOYMENT: &str = "TRADER_ENV";
pub const ENV_BASELINE: &str = "TRADER_BASELINE";
pub const ENV_HISTORY_LIMIT: &str = "TRADER_HISTORY_LIMIT";

/// Where the dashboard is running; decides the default API base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deployment {
    /// Served behind the same origin as the API; base URL is relative (empty).
    Production,
    /// Local development against a locally running API server.
    Development,
}

impl Deployment {
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Deployment::Production
        } else {
            Deployment::Development
        }
    }
}

/// Resolve the API base URL.
///
/// An explicit override always wins, including an empty one.
pub fn resolve_api_base_url(explicit: Option<&str>, deployment: Deployment) -> String {
    match (explicit, deployment) {
        (Some(url), _) => url.trim().trim_end_matches('/').to_string(),
        (None, Deployment::Production) => String::new(),
        (None, Deployment::Development) => DEV_API_BASE_URL.to_string(),
    }
}

/// Runtime settings of the portfolio monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSettings {
    /// Base URL the `/api/portfolio/*` paths are joined to
    pub api_base_url: String,

    /// Reference value for profit/loss; fixed for the session
    pub baseline: Baseline,

    /// Period between scheduled fetch cycles
    pub refresh_interval: Duration,

    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,

    /// Optional cap on the number of history rows requested
    pub history_limit: Option<u32>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEV_API_BASE_URL.to_string(),
            baseline: Baseline::default(),
            refresh_interval: REFRESH_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
            history_limit: None,
        }
    }
}

impl MonitorSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let deployment = lookup(ENV_DEPLOYMENT)
            .map(|name| Deployment::from_name(&name))
            .unwrap_or(Deployment::Development);
        let explicit = lookup(ENV_API_URL);
        let api_base_url = resolve_api_base_url(explicit.as_deref(), deployment);

        let baseline = match lookup(ENV_BASELINE) {
            Some(raw) => {
                let value: f64 = raw.trim().parse().map_err(|e| {
                    CoreError::Config(format!("{ENV_BASELINE}={raw:?} is not a number: {e}"))
                })?;
                Baseline::new(value)?
            }
            None => Baseline::default(),
        };

        let history_limit = match lookup(ENV_HISTORY_LIMIT) {
            Some(raw) => {
                let limit: u32 = raw.trim().parse().map_err(|e| {
                    CoreError::Config(format!(
                        "{ENV_HISTORY_LIMIT}={raw:?} is not a positive integer: {e}"
                    ))
                })?;
                if limit == 0 {
                    return Err(CoreError::Config(format!(
                        "{ENV_HISTORY_LIMIT} must be greater than zero"
                    )));
                }
                Some(limit)
            }
            None => None,
        };

        Ok(Self {
            api_base_url,
            baseline,
            history_limit,
            ..Self::default()
        })
    }
}
