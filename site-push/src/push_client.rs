#![doc = "HTTP client for the search-engine indexing service: implements the core `Pusher` trait over reqwest."]
//
//! # Indexing client (CLI <-> Core)
//!
//! This module wires the [`Pusher`] trait from `site-push-core` to a real HTTP endpoint.
//!
//! - Construct [`IndexingClient`] from [`PushSettings`] (endpoint, token, timeout).
//! - One call sends one POST: `{endpoint}?site={site}&token={token}`, `Content-Type: text/plain`,
//!   body = URLs joined with `\n`.
//! - The status code and body are returned as-is; interpreting them is the orchestrator's job.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use site_push_core::contract::{PushResponse, Pusher};
use site_push_core::SitePushError;

pub const DEFAULT_ENDPOINT: &str = "http://data.zz.baidu.com/urls";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct PushSettings {
    pub endpoint: String,
    pub token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for PushSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushSettings")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub struct IndexingClient {
    client: reqwest::Client,
    settings: PushSettings,
}

impl IndexingClient {
    pub fn new(settings: PushSettings) -> Result<Self, SitePushError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to build HTTP client");
                SitePushError::Transport(e.to_string())
            })?;
        tracing::info!(
            endpoint = %settings.endpoint,
            timeout_secs = settings.timeout.as_secs(),
            "Initialized IndexingClient"
        );
        Ok(IndexingClient { client, settings })
    }

    /// `{endpoint}?site={site}&token={token}`, values inserted verbatim.
    pub fn request_url(&self, site_url: &str) -> String {
        format!(
            "{}?site={}&token={}",
            self.settings.endpoint, site_url, self.settings.token
        )
    }
}

#[async_trait]
impl Pusher for IndexingClient {
    async fn push(&self, site_url: &str, urls: &[String]) -> Result<PushResponse, SitePushError> {
        let url = reqwest::Url::parse(&self.request_url(site_url)).map_err(|e| {
            tracing::error!(error = ?e, endpoint = %self.settings.endpoint, "Invalid push endpoint");
            SitePushError::Configuration(format!("invalid push endpoint: {e}"))
        })?;
        tracing::info!(
            endpoint = %self.settings.endpoint,
            count = urls.len(),
            "Submitting URLs to indexing service"
        );

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain")
            .body(urls.join("\n"))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        tracing::info!(status, "Indexing service responded");
        Ok(PushResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SitePushError {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    // the request URL carries the token
    let err = err.without_url();
    tracing::error!(error = %err, kind, "Push request did not complete");
    SitePushError::Transport(format!("{kind}: {err}"))
}
