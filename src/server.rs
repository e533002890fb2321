//! Server bootstrap: credential store, connection factory and tools wired
//! together from [`ServerSettings`].

use std::sync::Arc;

use crate::Result;
use crate::auth::{
    CredentialStore, CredentialWatcher, EnvironmentCredentialStore, FileCredentialStore,
};
use crate::client::ConnectionFactory;
use crate::config::{ConfigProvider, CredentialSource, ServerSettings};
use crate::tools::ToolRegistry;
use crate::version::{VersionCheck, check_server_version};

/// Everything a protocol adapter needs to serve the Seq tools.
///
/// Dropping the server stops the credential file watch, if any.
pub struct SeqToolServer {
    settings: ServerSettings,
    store: Arc<dyn CredentialStore>,
    factory: Arc<ConnectionFactory>,
    registry: ToolRegistry,
    watcher: Option<CredentialWatcher>,
}

impl SeqToolServer {
    pub async fn from_config(config: &dyn ConfigProvider) -> Result<Self> {
        let settings = ServerSettings::load(config).await?;
        Self::from_settings(settings).await
    }

    pub async fn from_settings(settings: ServerSettings) -> Result<Self> {
        match settings.credential_source {
            CredentialSource::Environment => {
                let store = Arc::new(EnvironmentCredentialStore::from_env()?);
                Self::build(settings, store, None)
            }
            CredentialSource::File => {
                let store = Arc::new(FileCredentialStore::open(&settings.credential_file).await?);
                let watcher = if settings.watch_credentials {
                    store.watch(settings.watch_interval)
                } else {
                    None
                };
                Self::build(settings, store, watcher)
            }
        }
    }

    /// Use an externally built store. No file watch is installed.
    pub fn with_store(settings: ServerSettings, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::build(settings, store, None)
    }

    fn build(
        settings: ServerSettings,
        store: Arc<dyn CredentialStore>,
        watcher: Option<CredentialWatcher>,
    ) -> Result<Self> {
        let factory = Arc::new(ConnectionFactory::from_settings(Arc::clone(&store), &settings)?);
        let registry = ToolRegistry::seq_tools(Arc::clone(&factory), &settings);

        tracing::info!(
            server = %settings.server_url,
            store = store.name(),
            watching = watcher.is_some(),
            tools = registry.len(),
            "Seq tool server ready"
        );

        Ok(Self {
            settings,
            store,
            factory,
            registry,
            watcher,
        })
    }

    /// Run the version gate against the default workspace. Never fails.
    pub async fn startup_check(&self) -> VersionCheck {
        check_server_version(&self.factory, self.settings.versions).await
    }

    pub async fn reload_credentials(&self) -> Result<()> {
        self.store.reload().await
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn factory(&self) -> &Arc<ConnectionFactory> {
        &self.factory
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn watcher(&self) -> Option<&CredentialWatcher> {
        self.watcher.as_ref()
    }
}
