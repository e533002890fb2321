//! Authenticated handle to one Seq server.

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::streaming::EventStreamParser;
use super::types::{EventEntity, EventQuery, RootEntity, SignalEntity};
use crate::auth::ApiKey;
use crate::{Error, Result};

pub const API_KEY_HEADER: &str = "X-Seq-ApiKey";

pub type EventStream = Pin<Box<dyn Stream<Item = Result<EventEntity>> + Send>>;

/// Parse a server address and make sure relative endpoint joins keep its path.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let mut url =
        Url::parse(raw).map_err(|e| Error::config(format!("Invalid Seq server URL {}: {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "Unsupported Seq server URL scheme: {}",
            url.scheme()
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(alias = "error", alias = "Message", alias = "message")]
    #[serde(rename = "Error")]
    error: String,
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Request failed").to_string());

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

/// Connection to a Seq server under one workspace's API key.
///
/// Immutable once created. Rotating the workspace's key does not affect a
/// handle that already exists.
#[derive(Clone)]
pub struct SeqConnection {
    base_url: Url,
    workspace: String,
    api_key: ApiKey,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl SeqConnection {
    pub fn new(
        base_url: Url,
        workspace: impl Into<String>,
        api_key: ApiKey,
        http: reqwest::Client,
        request_timeout: Duration,
    ) -> Self {
        Self {
            base_url,
            workspace: workspace.into(),
            api_key,
            http,
            request_timeout,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::config(format!("Invalid endpoint {}: {}", path, e)))
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header(API_KEY_HEADER, self.api_key.expose())
    }

    /// Timeouts surface as [`Error::Timeout`] so callers can treat them like
    /// cancellation instead of a transport failure.
    fn request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.request_timeout)
        } else {
            Error::Network(e)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json")
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| self.request_error(e))
    }

    /// `GET api/`
    pub async fn root(&self) -> Result<RootEntity> {
        self.get_json(self.endpoint("api/")?, &[]).await
    }

    /// Historical search, newest first, at most `query.count` events.
    pub async fn search(&self, query: &EventQuery) -> Result<Vec<EventEntity>> {
        let mut events: Vec<EventEntity> = self
            .get_json(self.endpoint("api/events")?, &query.query_pairs())
            .await?;
        events.truncate(query.count as usize);

        tracing::debug!(
            workspace = %self.workspace,
            count = events.len(),
            "Search completed"
        );
        Ok(events)
    }

    /// Open the live event stream.
    ///
    /// The stream has no overall timeout; callers bound it themselves. The
    /// HTTP body is released when the stream is dropped.
    pub async fn stream(&self, filter: Option<&str>) -> Result<EventStream> {
        let mut request = self
            .get(self.endpoint("api/events/stream")?)
            .header(ACCEPT, "text/event-stream");
        if let Some(filter) = filter.filter(|f| !f.trim().is_empty()) {
            request = request.query(&[("filter", filter)]);
        }

        let response = request.send().await.map_err(|e| self.request_error(e))?;
        let response = check_status(response).await?;
        tracing::debug!(workspace = %self.workspace, "Live event stream opened");

        Ok(Box::pin(EventStreamParser::new(response.bytes_stream())))
    }

    /// Shared signals only. Signals owned by a user are filtered out.
    pub async fn list_signals(&self) -> Result<Vec<SignalEntity>> {
        let signals: Vec<SignalEntity> = self
            .get_json(
                self.endpoint("api/signals")?,
                &[("shared", "true".to_string())],
            )
            .await?;
        Ok(signals.into_iter().filter(SignalEntity::is_shared).collect())
    }
}

impl std::fmt::Debug for SeqConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeqConnection")
            .field("base_url", &self.base_url.as_str())
            .field("workspace", &self.workspace)
            .field("api_key", &self.api_key.masked())
            .finish()
    }
}
