//! Validated connection creation.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::connection::SeqConnection;
use crate::auth::{CredentialStore, workspace_or_default};
use crate::config::ServerSettings;
use crate::config::settings::DEFAULT_REQUEST_TIMEOUT;
use crate::{Error, Result};

/// Link the root document only lists for keys allowed to read events.
pub const EVENTS_LINK: &str = "Events";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Creates one authenticated [`SeqConnection`] per call.
///
/// Each connection is probed against the root document before it is
/// returned. A key that the server accepts but that lacks permission to
/// read events fails here, instead of producing empty results later.
#[derive(Clone)]
pub struct ConnectionFactory {
    store: Arc<dyn CredentialStore>,
    base_url: Url,
    http: reqwest::Client,
    request_timeout: Duration,
    probe: bool,
}

impl ConnectionFactory {
    pub fn new(store: Arc<dyn CredentialStore>, base_url: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            store,
            base_url,
            http,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            probe: true,
        })
    }

    pub fn from_settings(store: Arc<dyn CredentialStore>, settings: &ServerSettings) -> Result<Self> {
        Ok(Self::new(store, settings.server_url.clone())?.request_timeout(settings.request_timeout))
    }

    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Skip the authentication probe. Keys are then only checked by the
    /// first real request.
    pub fn without_probe(mut self) -> Self {
        self.probe = false;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub async fn create(&self, workspace: Option<&str>) -> Result<SeqConnection> {
        let workspace = workspace_or_default(workspace);
        let api_key = self.store.get_api_key(Some(workspace)).await?;

        tracing::info!(
            workspace,
            server = %self.base_url,
            key = %api_key.masked(),
            store = self.store.name(),
            "Creating Seq connection"
        );

        let conn = SeqConnection::new(
            self.base_url.clone(),
            workspace,
            api_key,
            self.http.clone(),
            self.request_timeout,
        );

        if self.probe {
            Self::probe(&conn).await?;
        }
        Ok(conn)
    }

    async fn probe(conn: &SeqConnection) -> Result<()> {
        let root = conn.root().await.map_err(|e| match e {
            Error::Api {
                status: status @ (401 | 403),
                ..
            } => Error::auth(format!("server rejected API key (HTTP {})", status)),
            other => other,
        })?;

        if !root.has_link(EVENTS_LINK) {
            tracing::warn!(
                workspace = conn.workspace(),
                "API key accepted but lacks permission to read events"
            );
            return Err(Error::auth("API key lacks permission to read events"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConnectionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionFactory")
            .field("store", &self.store.name())
            .field("base_url", &self.base_url.as_str())
            .field("request_timeout", &self.request_timeout)
            .field("probe", &self.probe)
            .finish()
    }
}
