//! Workspace credential resolution.
//!
//! Provides three stores behind [`CredentialStore`]:
//! - **Environment**: `SEQ_API_KEY` plus `SEQ_API_KEY_<WORKSPACE>` overrides,
//!   captured once; unknown workspaces fall back to the default key
//! - **File**: a flat JSON object of workspace → key, hot-reloadable and
//!   optionally watched; unknown workspaces are an error
//! - **Static**: an explicit in-memory mapping

mod credential;
mod provider;
mod providers;
mod watch;

pub use credential::{ApiKey, CredentialMap, DEFAULT_WORKSPACE, workspace_or_default};
pub use provider::CredentialStore;
pub use providers::{
    DEFAULT_KEY_VAR, EnvironmentCredentialStore, FileCredentialStore, StaticCredentialStore,
    WORKSPACE_KEY_PREFIX,
};
pub use watch::CredentialWatcher;
