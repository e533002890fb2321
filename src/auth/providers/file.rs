//! File-backed credential store.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock, watch};

use crate::auth::watch::Fingerprint;
use crate::auth::{ApiKey, CredentialMap, CredentialStore, CredentialWatcher, workspace_or_default};
use crate::{Error, Result};

/// Store backed by a flat JSON object of workspace → API key.
///
/// ```json
/// { "default": "key-1", "production": "key-2" }
/// ```
///
/// Keys match case-insensitively. Unknown workspaces are an error; there is
/// no fallback to `"default"`. `reload` swaps the whole mapping in one step
/// and keeps the previous mapping when the file cannot be read or parsed.
pub struct FileCredentialStore {
    path: PathBuf,
    map: RwLock<Arc<CredentialMap>>,
    reload_lock: Mutex<()>,
    loaded: watch::Sender<Fingerprint>,
}

impl FileCredentialStore {
    /// Open the store and perform the initial load.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let (map, fingerprint) = Self::read_map(&path).await?;
        tracing::debug!(
            path = %path.display(),
            workspaces = map.len(),
            "File credential store opened"
        );
        let (loaded, _) = watch::channel(fingerprint);
        Ok(Self {
            path,
            map: RwLock::new(Arc::new(map)),
            reload_lock: Mutex::new(()),
            loaded,
        })
    }

    async fn read_map(path: &Path) -> Result<(CredentialMap, Fingerprint)> {
        let content = tokio::fs::read_to_string(path).await?;
        let fingerprint = Fingerprint::of(content.as_bytes());
        let map = CredentialMap::from_json(&content)?;
        if !map.has_default() {
            tracing::warn!(
                path = %path.display(),
                "Credential file has no \"default\" entry; requests without a workspace will fail"
            );
        }
        Ok((map, fingerprint))
    }

    /// Fingerprint of the content behind the current mapping.
    pub(crate) fn loaded(&self) -> watch::Receiver<Fingerprint> {
        self.loaded.subscribe()
    }

    /// Current mapping. The returned snapshot is never modified.
    pub async fn snapshot(&self) -> Arc<CredentialMap> {
        Arc::clone(&*self.map.read().await)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a background watch that reloads the store when the file changes.
    ///
    /// Returns `None` when the containing directory does not exist or no
    /// tokio runtime is available. The watch stops when the returned handle
    /// is dropped.
    pub fn watch(self: &Arc<Self>, interval: Duration) -> Option<CredentialWatcher> {
        CredentialWatcher::spawn(self, interval)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_api_key(&self, workspace: Option<&str>) -> Result<ApiKey> {
        let workspace = workspace_or_default(workspace);
        self.snapshot()
            .await
            .get(workspace)
            .cloned()
            .ok_or_else(|| Error::config(format!("No API key for workspace {}", workspace)))
    }

    async fn reload(&self) -> Result<()> {
        let _serialized = self.reload_lock.lock().await;
        let (map, fingerprint) = Self::read_map(&self.path).await?;
        let workspaces = map.len();
        *self.map.write().await = Arc::new(map);
        self.loaded.send_replace(fingerprint);
        tracing::debug!(path = %self.path.display(), workspaces, "Credentials reloaded");
        Ok(())
    }
}

impl std::fmt::Debug for FileCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCredentialStore")
            .field("path", &self.path)
            .finish()
    }
}
