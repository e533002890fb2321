//! Credential store implementations.

mod environment;
mod explicit;
mod file;

pub use environment::{DEFAULT_KEY_VAR, EnvironmentCredentialStore, WORKSPACE_KEY_PREFIX};
pub use explicit::StaticCredentialStore;
pub use file::FileCredentialStore;
