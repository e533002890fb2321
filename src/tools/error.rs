//! Outward tool error taxonomy.

use thiserror::Error;

/// Message every authentication failure reports, whatever the cause.
pub const AUTHENTICATION_FAILED: &str =
    "Authentication failed: invalid or under-permissioned API key";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("{}", AUTHENTICATION_FAILED)]
    Authentication,

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Error: {message}")]
    Transport { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Error: {message}")]
    Unknown { message: String },
}

impl ToolError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}
