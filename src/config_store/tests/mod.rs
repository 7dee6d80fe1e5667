//! Unit tests for config_store module
//! No filesystem, timing, or external dependencies.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    thread,
};

use crate::config_store::{
    ConfigChange, ConfigError, ConfigSnapshot, ConfigStore, decode_snapshot, diff_snapshots,
};

use super::diff::key_matches;

fn snapshot(pairs: &[(&str, &str)]) -> ConfigSnapshot {
    pairs.iter().copied().collect()
}

#[test]
fn empty_store_returns_empty_snapshot() {
    let store = ConfigStore::new("test");
    assert!(store.get_snapshot().is_empty());
    assert_eq!(store.name(), "test");
}

#[test]
fn replace_installs_new_snapshot() {
    let store = ConfigStore::new("test");
    store.replace(snapshot(&[("name", "world")]));

    assert_eq!(store.get_snapshot().get("name"), Some("world"));
}

#[test]
fn held_snapshot_is_unaffected_by_later_replace() {
    let store = ConfigStore::with_snapshot("test", snapshot(&[("x", "1")]));
    let held = store.get_snapshot();

    store.replace(snapshot(&[("x", "2"), ("y", "3")]));

    assert_eq!(held.get("x"), Some("1"));
    assert_eq!(held.len(), 1);
    assert_eq!(store.get_snapshot().get("x"), Some("2"));
}

#[test]
fn clones_share_state() {
    let store = ConfigStore::new("test");
    let clone = store.clone();

    clone.replace(snapshot(&[("a", "b")]));

    assert_eq!(store.get_snapshot().get("a"), Some("b"));
}

#[test]
fn callbacks_run_in_registration_order_with_new_snapshot() {
    let store = ConfigStore::new("sample-vars");
    let calls: Arc<Mutex<Vec<(usize, String, ConfigSnapshot)>>> = Arc::default();

    for id in 0..3 {
        let calls = Arc::clone(&calls);
        store.register_callback(move |name, snap| {
            calls
                .lock()
                .unwrap()
                .push((id, name.to_string(), snap.clone()));
        });
    }

    let new = snapshot(&[("k", "v")]);
    store.replace(new.clone());

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 3);
    for (expected_id, (id, name, snap)) in calls.iter().enumerate() {
        assert_eq!(*id, expected_id);
        assert_eq!(name, "sample-vars");
        assert_eq!(snap, &new);
    }
}

#[test]
fn callback_observes_store_already_updated() {
    let store = ConfigStore::new("test");
    let observed = Arc::new(Mutex::new(None));

    let reader = store.clone();
    let slot = Arc::clone(&observed);
    store.register_callback(move |_, snap| {
        *slot.lock().unwrap() = Some(reader.get_snapshot() == *snap);
    });

    store.replace(snapshot(&[("x", "1")]));

    assert_eq!(*observed.lock().unwrap(), Some(true));
}

#[test]
fn callback_registered_later_misses_earlier_replace() {
    let store = ConfigStore::new("test");
    store.replace(snapshot(&[("x", "1")]));

    let count = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&count);
    store.register_callback(move |_, _| *counter.lock().unwrap() += 1);

    store.replace(snapshot(&[("x", "2")]));
    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn concurrent_reads_never_see_a_mixed_snapshot() {
    let store = ConfigStore::with_snapshot("test", snapshot(&[("a", "0"), ("b", "0")]));
    let writers = 4;
    let rounds = 200;

    let mut handles = Vec::new();
    for w in 0..writers {
        let store = store.clone();
        handles.push(thread::spawn(move || {
            for r in 0..rounds {
                let tag = format!("{w}-{r}");
                store.replace(snapshot(&[("a", tag.as_str()), ("b", tag.as_str())]));
            }
        }));
    }

    for _ in 0..4 {
        let store = store.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..(writers * rounds) {
                let snap = store.get_snapshot();
                assert_eq!(snap.get("a"), snap.get("b"));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn diff_reports_added_removed_and_changed() {
    let old = snapshot(&[("keep", "1"), ("change", "a"), ("drop", "x")]);
    let new = snapshot(&[("keep", "1"), ("change", "b"), ("add", "y")]);

    let changes = diff_snapshots(&old, &new);
    let keys: Vec<&str> = changes.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["add", "change", "drop"]);

    assert!(changes[0].is_added());
    assert_eq!(changes[1].old_value.as_deref(), Some("a"));
    assert_eq!(changes[1].new_value.as_deref(), Some("b"));
    assert!(changes[2].is_removed());
}

#[test]
fn diff_of_same_snapshot_is_empty() {
    let snap = snapshot(&[("a", "1")]);
    assert!(diff_snapshots(&snap, &snap.clone()).is_empty());
}

#[test]
fn key_matching() {
    assert!(key_matches("greeting", "greeting"));
    assert!(key_matches("greeting", "*"));
    assert!(key_matches("db.host", "db.*"));
    assert!(key_matches("db.host.port", "db.*"));
    assert!(key_matches("db.host", "*.host"));
    assert!(!key_matches("db", "db.*"));
    assert!(!key_matches("db.host", "db.port"));
    assert!(!key_matches("db.host", "db"));
}

#[test]
fn config_change_new() {
    let change = ConfigChange::new("name".to_string(), None, Some("world".to_string()));

    assert_eq!(change.key, "name");
    assert!(change.is_added());
    assert!(!change.is_removed());
    assert!(change.timestamp.elapsed().as_secs() < 1);
}

#[test]
fn decode_flattens_scalars() {
    let snap = decode_snapshot(
        r#"
name = "world"
count = 3
ratio = 0.5
scale = 1.0
limit = -inf
enabled = true
"#,
        None,
    )
    .unwrap();

    let expected: BTreeMap<String, String> = [
        ("count", "3"),
        ("enabled", "true"),
        ("name", "world"),
        ("limit", "-inf"),
        ("ratio", "0.5"),
        ("scale", "1.0"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    assert_eq!(snap.as_map(), &expected);
}

#[test]
fn decode_rejects_nested_values() {
    let err = decode_snapshot("[section]\nkey = \"v\"\n", None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "section"));

    let err = decode_snapshot("list = [1, 2]\n", None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn decode_rejects_malformed_toml() {
    let err = decode_snapshot("name = ", None).unwrap_err();
    assert!(matches!(err, ConfigError::TomlParseError { ref location, .. } if location == "string"));
}

#[tokio::test]
async fn subscribers_receive_matching_changes() {
    use futures::StreamExt;

    let store = ConfigStore::new("test");
    let mut stream = Box::pin(store.subscribe("db.*"));

    store.replace(snapshot(&[("db.host", "localhost"), ("name", "world")]));

    let change = stream.next().await.unwrap();
    assert_eq!(change.key, "db.host");
    assert_eq!(change.new_value.as_deref(), Some("localhost"));
}
