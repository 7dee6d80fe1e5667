use std::sync::{Arc, PoisonError, RwLock};

use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info};

use super::{
    ConfigChange, ConfigSnapshot,
    diff::{diff_snapshots, key_matches},
};

/// Name the store passes to callbacks when none is given.
pub const DEFAULT_STORE_NAME: &str = "heartbeats-config-vars";

const CHANGE_CHANNEL_CAPACITY: usize = 1000;

/// Observer invoked after every successful replacement.
///
/// Receives the store name and the snapshot that was just installed. Runs
/// synchronously on the writer's stack, so it must not block.
pub type ReplaceCallback = Arc<dyn Fn(&str, &ConfigSnapshot) + Send + Sync>;

/// A thread-safe store holding the current configuration variables.
///
/// The store keeps exactly one [`ConfigSnapshot`] at a time behind a
/// reader-writer lock. Replacement swaps the whole snapshot, so readers see
/// either the old or the new mapping and never a mix of both. Clones share
/// the same state.
#[derive(Clone)]
pub struct ConfigStore {
    name: Arc<str>,
    snapshot: Arc<RwLock<ConfigSnapshot>>,
    callbacks: Arc<RwLock<Vec<ReplaceCallback>>>,
    change_sender: broadcast::Sender<ConfigChange>,
}

impl ConfigStore {
    /// Creates an empty store with the given name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::with_snapshot(name, ConfigSnapshot::default())
    }

    /// Creates a store whose initial snapshot is `snapshot`.
    pub fn with_snapshot(name: impl Into<Arc<str>>, snapshot: ConfigSnapshot) -> Self {
        let (change_sender, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            name: name.into(),
            snapshot: Arc::new(RwLock::new(snapshot)),
            callbacks: Arc::new(RwLock::new(Vec::new())),
            change_sender,
        }
    }

    /// Name passed to callbacks on every replacement.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the currently active snapshot.
    ///
    /// The read lock is held only long enough to clone the handle. A
    /// poisoned lock still guards a fully installed snapshot, so it is
    /// recovered rather than reported.
    pub fn get_snapshot(&self) -> ConfigSnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Atomically installs `snapshot`, then notifies observers.
    ///
    /// Callbacks run after the write lock is released, in registration
    /// order, each receiving the new snapshot. Per-variable changes are
    /// broadcast to [`ConfigStore::subscribe`] streams afterwards.
    pub fn replace(&self, snapshot: ConfigSnapshot) {
        let previous = {
            let mut current = self
                .snapshot
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, snapshot.clone())
        };

        let callbacks = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for callback in &callbacks {
            callback(&self.name, &snapshot);
        }

        let changes = diff_snapshots(&previous, &snapshot);
        info!(
            store = %self.name,
            variables = snapshot.len(),
            changed = changes.len(),
            "Configuration snapshot replaced"
        );

        for change in changes {
            debug!(key = %change.key, "Configuration variable changed");
            let _ = self.change_sender.send(change);
        }
    }

    /// Appends an observer invoked on every future [`ConfigStore::replace`].
    pub fn register_callback<F>(&self, callback: F)
    where
        F: Fn(&str, &ConfigSnapshot) + Send + Sync + 'static,
    {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    /// Creates a stream of per-variable changes matching `pattern`.
    ///
    /// Supports "*" wildcard segments for dotted variable names. Slow
    /// subscribers that fall behind skip the changes they missed.
    ///
    /// # Arguments
    /// * `pattern` - Variable name or pattern such as `"db.*"` or `"*"`
    pub fn subscribe(&self, pattern: &str) -> impl Stream<Item = ConfigChange> + use<> {
        let pattern = pattern.to_string();

        BroadcastStream::new(self.change_sender.subscribe()).filter_map(move |change| {
            let matched = match change {
                Ok(change) if key_matches(&change.key, &pattern) => Some(change),
                _ => None,
            };
            async move { matched }
        })
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_NAME)
    }
}
