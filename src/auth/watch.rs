//! Background reload of a file-backed credential store.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::CredentialStore;
use super::providers::FileCredentialStore;

/// Content identity of a credential file.
///
/// Content is compared instead of modification times, so a same-length
/// rewrite inside one timestamp tick is still noticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fingerprint {
    len: usize,
    digest: u64,
}

impl Fingerprint {
    pub(crate) fn of(content: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        Self {
            len: content.len(),
            digest: hasher.finish(),
        }
    }
}

/// Handle to a running credential watch.
///
/// One task polls the credential file and compares it with the content the
/// store last loaded. A second task performs reloads one at a time, so a
/// burst of change notifications collapses into at most one queued reload.
/// Dropping the handle stops both.
#[derive(Debug)]
pub struct CredentialWatcher {
    path: PathBuf,
    cancel: CancellationToken,
}

impl CredentialWatcher {
    pub(crate) fn spawn(store: &Arc<FileCredentialStore>, interval: Duration) -> Option<Self> {
        let path = store.path().to_path_buf();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.is_dir() {
            tracing::warn!(
                dir = %dir.display(),
                "Credential directory does not exist; file watch disabled"
            );
            return None;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No tokio runtime available; credential file watch disabled");
            return None;
        };

        let (tx, rx) = mpsc::channel(1);
        let cancel = CancellationToken::new();

        runtime.spawn(poll_file(
            path.clone(),
            interval,
            store.loaded(),
            tx,
            cancel.clone(),
        ));
        runtime.spawn(apply_reloads(Arc::downgrade(store), rx, cancel.clone()));

        tracing::debug!(path = %path.display(), ?interval, "Watching credential file");
        Some(Self { path, cancel })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for CredentialWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn fingerprint(path: &Path) -> Option<Fingerprint> {
    let content = tokio::fs::read(path).await.ok()?;
    Some(Fingerprint::of(&content))
}

/// Request a reload whenever the file differs from what the store loaded.
///
/// The baseline comes from the store, not from the first poll, so a rewrite
/// that lands before this task runs is still picked up. `notified` keeps a
/// content that failed to load from being retried every tick.
async fn poll_file(
    path: PathBuf,
    interval: Duration,
    loaded: watch::Receiver<Fingerprint>,
    tx: mpsc::Sender<()>,
    cancel: CancellationToken,
) {
    let mut notified: Option<Fingerprint> = None;
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // Deleted: keep serving the previous mapping until the file returns.
        let Some(current) = fingerprint(&path).await else {
            continue;
        };
        if current == *loaded.borrow() || Some(current) == notified {
            continue;
        }
        notified = Some(current);

        match tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => break,
        }
    }
}

async fn apply_reloads(
    store: Weak<FileCredentialStore>,
    mut rx: mpsc::Receiver<()>,
    cancel: CancellationToken,
) {
    loop {
        let notified = tokio::select! {
            _ = cancel.cancelled() => break,
            msg = rx.recv() => msg,
        };
        if notified.is_none() {
            break;
        }
        let Some(store) = store.upgrade() else {
            break;
        };

        match store.reload().await {
            Ok(()) => {
                tracing::info!(path = %store.path().display(), "Credential file changed; keys reloaded");
            }
            Err(e) => {
                tracing::warn!(
                    path = %store.path().display(),
                    error = %e,
                    "Credential reload failed; keeping previous keys"
                );
            }
        }
    }
}
