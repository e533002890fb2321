//! # seq-mcp
//!
//! Read-only Seq query tools for tool-invoking agents.
//!
//! The crate resolves an API key per logical workspace, validates it against
//! the Seq server before use, hot-reloads credentials without a restart, and
//! classifies remote failures into a small outward error taxonomy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seq_mcp::config::ConfigBuilder;
//! use seq_mcp::tools::ToolContext;
//! use seq_mcp::SeqToolServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), seq_mcp::Error> {
//!     let config = ConfigBuilder::new()
//!         .env_with_prefix("SEQ_MCP_")
//!         .file("appsettings.json")
//!         .build()
//!         .await?;
//!     let server = SeqToolServer::from_config(&config).await?;
//!     server.startup_check().await;
//!
//!     let output = server
//!         .registry()
//!         .execute(
//!             "SeqSearch",
//!             serde_json::json!({ "filter": "@Level = 'Error'", "count": 20 }),
//!             &ToolContext::new(),
//!         )
//!         .await;
//!     println!("{}", output.text());
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod client;
pub mod config;
pub mod observability;
pub mod server;
pub mod tools;
pub mod version;

pub use auth::{
    ApiKey, CredentialMap, CredentialStore, CredentialWatcher, DEFAULT_WORKSPACE,
    EnvironmentCredentialStore, FileCredentialStore, StaticCredentialStore,
};
pub use client::{
    ConnectionFactory, EventEntity, EventQuery, RootEntity, SeqConnection, SignalEntity,
};
pub use config::{ConfigBuilder, ConfigError, ConfigProvider, ServerSettings};
pub use server::SeqToolServer;
pub use tools::{
    SchemaTool, SearchTool, SignalListTool, Tool, ToolContext, ToolError, ToolOutput,
    ToolRegistry, WaitForEventsTool,
};
pub use version::{VersionCheck, VersionRange};

/// Error type for seq-mcp operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No usable credential, or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential present but rejected or under-permissioned.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Seq returned a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Live event stream broke or produced undecodable data.
    #[error("Stream error: {0}")]
    Stream(String),

    /// A request exceeded its timeout. Reported like a cancellation.
    #[error("Operation timed out after {:.1}s", .0.as_secs_f64())]
    Timeout(std::time::Duration),

    /// Request parameters are invalid.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The caller or a deadline cancelled the operation.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected or under-permissioned credentials (401, 403, probe failure)
    Authorization,
    /// Missing credentials, bad settings or bad request parameters
    Configuration,
    /// Network, protocol or server failures unrelated to credentials
    Transport,
    /// Cancellation by the caller, an internal deadline or a request timeout
    Cancelled,
    /// Local IO or serialization failures
    Internal,
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Error::Auth {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Auth { .. }
            | Error::Api {
                status: 401 | 403, ..
            } => ErrorCategory::Authorization,

            Error::Config(_) | Error::InvalidRequest(_) => ErrorCategory::Configuration,

            Error::Network(e) if e.status().is_some_and(|s| s.as_u16() == 401 || s.as_u16() == 403) => {
                ErrorCategory::Authorization
            }
            Error::Network(_) | Error::Api { .. } | Error::Stream(_) => ErrorCategory::Transport,

            Error::Cancelled | Error::Timeout(_) => ErrorCategory::Cancelled,

            Error::Json(_) | Error::Io(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_authorization_error(&self) -> bool {
        self.category() == ErrorCategory::Authorization
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    pub fn is_transport_error(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::InvalidValue { key, message } => {
                Error::Config(format!("Invalid value for {}: {}", key, message))
            }
            config::ConfigError::Serialization(e) => Error::Json(e),
            config::ConfigError::Io(e) => Error::Io(e),
            config::ConfigError::Env(e) => Error::Config(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
