//! File-based Configuration Provider
//!
//! Loads configuration from a JSON file. Nested objects are addressed with
//! `.` or `:` separated keys: `{"Seq": {"ServerUrl": "..."}}` answers
//! `Seq:ServerUrl` and `Seq.ServerUrl`.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::OnceCell;

use super::ConfigResult;
use super::provider::ConfigProvider;

/// File-based configuration provider
pub struct FileConfigProvider {
    path: PathBuf,
    data: OnceCell<HashMap<String, serde_json::Value>>,
}

impl FileConfigProvider {
    /// Create a new file provider; the file is read lazily on first access.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: OnceCell::new(),
        }
    }

    /// Load configuration from file. A missing file is an empty configuration.
    async fn load(&self) -> ConfigResult<HashMap<String, serde_json::Value>> {
        if !tokio::fs::try_exists(&self.path).await? {
            tracing::debug!(path = %self.path.display(), "Config file not found, using defaults");
            return Ok(HashMap::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        let data: HashMap<String, serde_json::Value> = serde_json::from_str(&content)?;
        Ok(data)
    }

    async fn data(&self) -> ConfigResult<&HashMap<String, serde_json::Value>> {
        self.data.get_or_try_init(|| self.load()).await
    }

    /// Get the file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

fn lookup<'a>(
    map: &'a HashMap<String, serde_json::Value>,
    key: &str,
) -> Option<&'a serde_json::Value> {
    if let Some(value) = map.get(key) {
        return Some(value);
    }

    let mut parts = key.split(['.', ':']);
    let first = parts.next()?;
    parts.try_fold(map.get(first)?, |current, part| current.get(part))
}

#[async_trait::async_trait]
impl ConfigProvider for FileConfigProvider {
    fn name(&self) -> &str {
        "file"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        let map = self.data().await?;
        match lookup(map, key) {
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(serde_json::Value::Null) | None => Ok(None),
            Some(v) => Ok(Some(v.to_string())),
        }
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("loaded", &self.data.initialized())
            .finish()
    }
}
