//! Environment variable configuration.

use super::provider::ConfigProvider;
use super::{ConfigError, ConfigResult};

/// Reads settings from process environment variables.
///
/// A key becomes a variable name by upper-casing it, turning `.` into `_`
/// and the hierarchical `:` into `__`. With the prefix `SEQ_MCP_`,
/// `seq.timeout_secs` reads `SEQ_MCP_SEQ_TIMEOUT_SECS` and `Seq:ServerUrl`
/// reads `SEQ_MCP_SEQ__SERVERURL`.
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    prefix: String,
}

impl EnvConfigProvider {
    /// Unprefixed variables. Generic keys such as `application` then read
    /// bare variables like `APPLICATION`; prefer [`prefixed`](Self::prefixed).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn variable(&self, key: &str) -> String {
        let mut name = self.prefix.clone();
        for c in key.chars() {
            match c {
                '.' => name.push('_'),
                ':' => name.push_str("__"),
                c => name.extend(c.to_uppercase()),
            }
        }
        name
    }
}

#[async_trait::async_trait]
impl ConfigProvider for EnvConfigProvider {
    fn name(&self) -> &str {
        "env"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        match std::env::var(self.variable(key)) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(e) => Err(ConfigError::Env(e)),
        }
    }
}
