//! Credential types.

use std::collections::HashMap;
use std::fmt;

use secrecy::{ExposeSecret, SecretString};

/// Workspace used when the caller names none.
pub const DEFAULT_WORKSPACE: &str = "default";

/// Normalize an optional workspace name: absent or blank means `"default"`.
pub fn workspace_or_default(workspace: Option<&str>) -> &str {
    match workspace.map(str::trim) {
        Some(ws) if !ws.is_empty() => ws,
        _ => DEFAULT_WORKSPACE,
    }
}

/// Seq API key. `Debug` never prints the secret.
#[derive(Clone)]
pub struct ApiKey(SecretString);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(SecretString::from(key.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// First five characters followed by `...`, for log lines.
    pub fn masked(&self) -> String {
        let prefix: String = self.expose().chars().take(5).collect();
        format!("{}...", prefix)
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([redacted])")
    }
}

impl PartialEq for ApiKey {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// Immutable workspace → key mapping with case-insensitive lookup.
///
/// Stores swap whole maps behind an `Arc`; a map is never mutated after
/// construction.
#[derive(Clone, Default)]
pub struct CredentialMap {
    keys: HashMap<String, ApiKey>,
}

impl CredentialMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object. String values become keys; other values are
    /// ignored as unrecognized fields. Later duplicates (after case folding)
    /// win.
    pub fn from_json(content: &str) -> crate::Result<Self> {
        let value: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;
        Ok(value
            .into_iter()
            .filter_map(|(workspace, v)| match v {
                serde_json::Value::String(key) => Some((workspace, key)),
                _ => None,
            })
            .collect())
    }

    pub fn insert(&mut self, workspace: impl AsRef<str>, key: impl Into<ApiKey>) {
        self.keys
            .insert(workspace.as_ref().to_lowercase(), key.into());
    }

    pub fn get(&self, workspace: &str) -> Option<&ApiKey> {
        self.keys.get(&workspace.to_lowercase())
    }

    pub fn contains(&self, workspace: &str) -> bool {
        self.get(workspace).is_some()
    }

    pub fn has_default(&self) -> bool {
        self.contains(DEFAULT_WORKSPACE)
    }

    pub fn workspaces(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<W: AsRef<str>, K: Into<ApiKey>> FromIterator<(W, K)> for CredentialMap {
    fn from_iter<I: IntoIterator<Item = (W, K)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (workspace, key) in iter {
            map.insert(workspace, key);
        }
        map
    }
}

impl fmt::Debug for CredentialMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut workspaces: Vec<&str> = self.workspaces().collect();
        workspaces.sort_unstable();
        f.debug_struct("CredentialMap")
            .field("workspaces", &workspaces)
            .finish()
    }
}
