//! Resolved server settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use super::provider::{ConfigProvider, ConfigProviderExt};
use crate::client::parse_base_url;
use crate::version::VersionRange;
use crate::Result;

pub const SERVER_URL_ENV: &str = "SEQ_SERVER_URL";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5341";
pub const DEFAULT_CREDENTIAL_FILE: &str = "secrets.json";
pub const DEFAULT_APPLICATION_NAME: &str = "SeqMcpServer";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CAPTURE_DEADLINE: Duration = Duration::from_secs(5);
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_millis(500);

/// Where API keys come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialSource {
    /// `SEQ_API_KEY` and `SEQ_API_KEY_<WORKSPACE>`, captured once.
    #[default]
    Environment,
    /// A flat JSON file of workspace → key, hot-reloadable.
    File,
}

impl CredentialSource {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "env" | "environment" => Some(Self::Environment),
            "file" => Some(Self::File),
            _ => None,
        }
    }
}

/// Settings for a [`SeqToolServer`](crate::SeqToolServer), resolved from any
/// [`ConfigProvider`].
///
/// | key | also read as | default |
/// |---|---|---|
/// | `seq.server_url` (overridden by `SEQ_SERVER_URL`) | `Seq:ServerUrl` | `http://localhost:5341` |
/// | `seq.timeout_secs` | | `30` |
/// | `seq.capture_deadline_ms` | | `5000` |
/// | `credential_source` (`env` / `file`) | | `env` |
/// | `credential_file` | `CredentialFile` | `secrets.json` |
/// | `credential_watch` | | `true` |
/// | `credential_watch_interval_ms` | | `500` |
/// | `application` | | `SeqMcpServer` |
/// | `seq_version.min` / `seq_version.max` | `SeqVersion:Min` / `SeqVersion:Max` | `2024.1` / `2025.2` |
///
/// The second spelling matches existing `appsettings.json` layouts; the first
/// one wins when both are set.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub server_url: Url,
    pub request_timeout: Duration,
    pub capture_deadline: Duration,
    pub credential_source: CredentialSource,
    pub credential_file: PathBuf,
    pub watch_credentials: bool,
    pub watch_interval: Duration,
    pub application_name: String,
    pub versions: VersionRange,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            server_url: Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid"),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            capture_deadline: DEFAULT_CAPTURE_DEADLINE,
            credential_source: CredentialSource::default(),
            credential_file: PathBuf::from(DEFAULT_CREDENTIAL_FILE),
            watch_credentials: true,
            watch_interval: DEFAULT_WATCH_INTERVAL,
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            versions: VersionRange::default(),
        }
    }
}

impl ServerSettings {
    pub async fn load(config: &dyn ConfigProvider) -> Result<Self> {
        let defaults = Self::default();

        let server_url = resolve_server_url(
            std::env::var(SERVER_URL_ENV).ok(),
            first_of::<String>(config, &["seq.server_url", "Seq:ServerUrl"]).await?,
        )?;

        let credential_source = match config.get::<String>("credential_source").await? {
            Some(raw) => CredentialSource::parse(&raw).ok_or_else(|| {
                crate::Error::config(format!(
                    "Invalid value for credential_source: {} (expected env or file)",
                    raw
                ))
            })?,
            None => defaults.credential_source,
        };

        let versions = VersionRange::from_bounds(
            first_of::<String>(config, &["seq_version.min", "SeqVersion:Min"])
                .await?
                .as_deref(),
            first_of::<String>(config, &["seq_version.max", "SeqVersion:Max"])
                .await?
                .as_deref(),
        )?;

        let settings = Self {
            server_url,
            request_timeout: Duration::from_secs(
                config
                    .get_or("seq.timeout_secs", defaults.request_timeout.as_secs())
                    .await?,
            ),
            capture_deadline: Duration::from_millis(
                config
                    .get_or(
                        "seq.capture_deadline_ms",
                        defaults.capture_deadline.as_millis() as u64,
                    )
                    .await?,
            ),
            credential_source,
            credential_file: first_of::<String>(config, &["credential_file", "CredentialFile"])
                .await?
                .map(PathBuf::from)
                .unwrap_or(defaults.credential_file),
            watch_credentials: config
                .get_or("credential_watch", defaults.watch_credentials)
                .await?,
            watch_interval: Duration::from_millis(
                config
                    .get_or(
                        "credential_watch_interval_ms",
                        defaults.watch_interval.as_millis() as u64,
                    )
                    .await?,
            ),
            application_name: config
                .get_or("application", defaults.application_name)
                .await?,
            versions,
        };

        tracing::debug!(
            server_url = %settings.server_url,
            credential_source = ?settings.credential_source,
            credential_file = %settings.credential_file.display(),
            watch = settings.watch_credentials,
            "Server settings resolved"
        );

        Ok(settings)
    }
}

async fn first_of<T: DeserializeOwned + Send>(
    config: &dyn ConfigProvider,
    keys: &[&str],
) -> Result<Option<T>> {
    for key in keys {
        if let Some(value) = config.get::<T>(key).await? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// Explicit environment override beats configuration, which beats the
/// local default.
pub fn resolve_server_url(env_override: Option<String>, configured: Option<String>) -> Result<Url> {
    let raw = env_override
        .filter(|v| !v.trim().is_empty())
        .or_else(|| configured.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
    parse_base_url(&raw)
}
