use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::settings::MonitorSettings;
use crate::models::snapshot::Snapshot;
use super::traits::SnapshotSource;
use super::wire;

pub const HISTORY_PATH: &str = "/api/portfolio/history";
pub const LATEST_PATH: &str = "/api/portfolio/latest";

/// Snapshot source backed by the portfolio HTTP API.
///
/// - **Endpoints**: `/api/portfolio/history`, `/api/portfolio/latest`
/// - **Auth**: none
///
/// The base URL must be absolute: unlike a browser page there is no origin
/// to resolve a relative (empty) base against.
pub struct HttpSnapshotSource {
    client: Client,
    history_url: Url,
    latest_url: Url,
}

impl HttpSnapshotSource {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        history_limit: Option<u32>,
    ) -> Result<Self, CoreError> {
        let base = base_url.trim().trim_end_matches('/');
        let mut history_url = endpoint(base, HISTORY_PATH)?;
        let latest_url = endpoint(base, LATEST_PATH)?;
        if let Some(limit) = history_limit {
            history_url
                .query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Ok(Self {
            client,
            history_url,
            latest_url,
        })
    }

    pub fn from_settings(settings: &MonitorSettings) -> Result<Self, CoreError> {
        Self::new(
            &settings.api_base_url,
            settings.request_timeout,
            settings.history_limit,
        )
    }

    pub fn history_url(&self) -> &Url {
        &self.history_url
    }

    pub fn latest_url(&self) -> &Url {
        &self.latest_url
    }

    async fn get_body(&self, url: &Url) -> Result<String, CoreError> {
        let body = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

fn endpoint(base: &str, path: &str) -> Result<Url, CoreError> {
    if base.is_empty() {
        return Err(CoreError::Config(
            "API base URL is empty; set an absolute http(s) URL".into(),
        ));
    }
    let url = Url::parse(&format!("{base}{path}"))
        .map_err(|e| CoreError::Config(format!("Invalid API base URL {base:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CoreError::Config(format!(
            "Unsupported URL scheme {other:?} in API base URL {base:?}"
        ))),
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    fn name(&self) -> &str {
        "PortfolioApi"
    }

    async fn fetch_history(&self) -> Result<Vec<Snapshot>, CoreError> {
        let body = self.get_body(&self.history_url).await?;
        wire::parse_history(&body)
    }

    async fn fetch_latest(&self) -> Result<Option<Snapshot>, CoreError> {
        let body = self.get_body(&self.latest_url).await?;
        wire::parse_latest(&body)
    }
}
