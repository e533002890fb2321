//! Explicit credential store.

use async_trait::async_trait;

use crate::auth::{ApiKey, CredentialMap, CredentialStore, workspace_or_default};
use crate::{Error, Result};

/// Store with an explicitly set mapping. Lookup semantics match
/// [`FileCredentialStore`](super::FileCredentialStore): no fallback to
/// `"default"` for unknown workspaces.
pub struct StaticCredentialStore {
    map: CredentialMap,
}

impl StaticCredentialStore {
    pub fn new(map: CredentialMap) -> Self {
        Self { map }
    }

    /// Single default key.
    pub fn api_key(key: impl Into<ApiKey>) -> Self {
        let mut map = CredentialMap::new();
        map.insert(crate::auth::DEFAULT_WORKSPACE, key);
        Self::new(map)
    }

    /// Add a workspace key (builder pattern).
    pub fn with(mut self, workspace: impl AsRef<str>, key: impl Into<ApiKey>) -> Self {
        self.map.insert(workspace, key);
        self
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    fn name(&self) -> &str {
        "static"
    }

    async fn get_api_key(&self, workspace: Option<&str>) -> Result<ApiKey> {
        let workspace = workspace_or_default(workspace);
        self.map
            .get(workspace)
            .cloned()
            .ok_or_else(|| Error::config(format!("No API key for workspace {}", workspace)))
    }
}
