//! Credential store trait.

use async_trait::async_trait;

use super::ApiKey;
use crate::Result;

/// Resolves a workspace name to a Seq API key.
///
/// Implementations must be safe for concurrent `get_api_key` callers while a
/// `reload` is in flight: readers observe either the old or the new mapping.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Store name for debugging.
    fn name(&self) -> &str;

    /// Resolve the key for `workspace` (`None` or blank means `"default"`).
    ///
    /// Fails with [`Error::Config`](crate::Error::Config) when no key applies.
    async fn get_api_key(&self, workspace: Option<&str>) -> Result<ApiKey>;

    /// Re-read the backing source and swap the mapping atomically.
    ///
    /// On failure the previous mapping stays in place.
    async fn reload(&self) -> Result<()> {
        Ok(())
    }
}
