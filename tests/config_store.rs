//! Integration tests for the config store and its file-backed source.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use heartbeats::config_store::{ConfigError, ConfigSnapshot, ConfigSource, ConfigStore};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn write_vars(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("vars.toml");
    fs::write(&path, content).unwrap();
    path
}

async fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    condition()
}

mod loading {
    use super::*;

    #[tokio::test]
    async fn load_populates_store_and_runs_callbacks() {
        let dir = TempDir::new().unwrap();
        let path = write_vars(&dir, "name = \"world\"\ncount = 2\n");

        let store = ConfigStore::new("vars");
        let seen: Arc<Mutex<Vec<(String, ConfigSnapshot)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        store.register_callback(move |name, snap| {
            sink.lock().unwrap().push((name.to_string(), snap.clone()));
        });

        let source = ConfigSource::new(&path, store.clone());
        let loaded = source.load().await.unwrap();

        assert_eq!(store.get_snapshot(), loaded);
        assert_eq!(loaded.get("name"), Some("world"));
        assert_eq!(loaded.get("count"), Some("2"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "vars");
        assert_eq!(seen[0].1, loaded);
    }

    #[tokio::test]
    async fn invalid_file_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let path = write_vars(&dir, "[nested]\nkey = \"v\"\n");

        let initial: ConfigSnapshot = [("keep", "me")].into_iter().collect();
        let store = ConfigStore::with_snapshot("vars", initial.clone());
        let source = ConfigSource::new(&path, store.clone());

        let err = source.load().await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(store.get_snapshot(), initial);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new("vars");
        let source = ConfigSource::new(dir.path().join("absent.toml"), store.clone());

        let err = source.load().await.unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
        assert!(store.get_snapshot().is_empty());
    }
}

mod watching {
    use super::*;

    #[tokio::test]
    async fn file_edits_replace_the_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = write_vars(&dir, "x = \"1\"\n");

        let store = ConfigStore::new("vars");
        let source = ConfigSource::new(&path, store.clone());
        source.load().await.unwrap();

        let cancel = CancellationToken::new();
        let task = source.watch(cancel.clone()).unwrap();

        fs::write(&path, "x = \"2\"\n").unwrap();

        let updated = wait_for(|| store.get_snapshot().get("x") == Some("2")).await;
        assert!(updated, "store never picked up the edited file");

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn broken_edit_keeps_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = write_vars(&dir, "x = \"1\"\n");

        let store = ConfigStore::new("vars");
        let source = ConfigSource::new(&path, store.clone());
        source.load().await.unwrap();

        let cancel = CancellationToken::new();
        let task = source.watch(cancel.clone()).unwrap();

        fs::write(&path, "x = [\n").unwrap();
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.get_snapshot().get("x"), Some("1"));

        fs::write(&path, "x = \"3\"\n").unwrap();
        let updated = wait_for(|| store.get_snapshot().get("x") == Some("3")).await;
        assert!(updated, "store never recovered after a valid edit");

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_watch_task_finishes() {
        let dir = TempDir::new().unwrap();
        let path = write_vars(&dir, "x = \"1\"\n");

        let source = ConfigSource::new(&path, ConfigStore::new("vars"));
        let cancel = CancellationToken::new();
        let task = source.watch(cancel.clone()).unwrap();

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
