//! Environment variable credential store.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::auth::{ApiKey, CredentialStore, DEFAULT_WORKSPACE, workspace_or_default};
use crate::{Error, Result};

pub const DEFAULT_KEY_VAR: &str = "SEQ_API_KEY";
pub const WORKSPACE_KEY_PREFIX: &str = "SEQ_API_KEY_";

/// Store backed by `SEQ_API_KEY` and `SEQ_API_KEY_<WORKSPACE>` variables.
///
/// Variables are captured once at construction, so `reload` is a no-op.
/// Workspaces without an override resolve to the default key.
pub struct EnvironmentCredentialStore {
    default_key: ApiKey,
    overrides: HashMap<String, ApiKey>,
}

impl EnvironmentCredentialStore {
    /// Capture the current process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Build from an explicit set of variables.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut default_key = None;
        let mut overrides = HashMap::new();

        for (name, value) in vars {
            let name = name.as_ref();
            let value: String = value.into();
            if value.is_empty() {
                continue;
            }
            if name == DEFAULT_KEY_VAR {
                default_key = Some(ApiKey::new(value));
            } else if let Some(suffix) = name.strip_prefix(WORKSPACE_KEY_PREFIX)
                && !suffix.is_empty()
            {
                overrides.insert(Self::variable_suffix(suffix), ApiKey::new(value));
            }
        }

        let default_key = default_key.ok_or_else(|| {
            Error::config(format!(
                "{} environment variable is not set. Set it to a Seq API key with read permission.",
                DEFAULT_KEY_VAR
            ))
        })?;

        tracing::debug!(
            overrides = overrides.len(),
            "Environment credential store initialized"
        );

        Ok(Self {
            default_key,
            overrides,
        })
    }

    /// Variable suffix for a workspace: upper-cased, with every character
    /// that is not ASCII alphanumeric replaced by `_`.
    pub fn variable_suffix(workspace: &str) -> String {
        workspace
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Full variable name consulted for a workspace.
    pub fn variable_name(workspace: &str) -> String {
        format!("{}{}", WORKSPACE_KEY_PREFIX, Self::variable_suffix(workspace))
    }
}

#[async_trait]
impl CredentialStore for EnvironmentCredentialStore {
    fn name(&self) -> &str {
        "environment"
    }

    async fn get_api_key(&self, workspace: Option<&str>) -> Result<ApiKey> {
        let workspace = workspace_or_default(workspace);
        if !workspace.eq_ignore_ascii_case(DEFAULT_WORKSPACE)
            && let Some(key) = self.overrides.get(&Self::variable_suffix(workspace))
        {
            tracing::debug!(workspace, "Resolved workspace-specific API key");
            return Ok(key.clone());
        }
        Ok(self.default_key.clone())
    }
}
