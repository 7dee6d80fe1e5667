//! Unit tests for config module
//!
//! Tests settings defaults, deserialization and layering.
//! No filesystem dependencies - all in-memory.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::{collections::HashMap, path::PathBuf, time::Duration};

use crate::{
    HeartbeatError,
    config::{
        DEFAULT_EVENT_SOURCE, DEFAULT_EVENT_TYPE, LogFormat, Settings, SettingsOverrides,
        SinkConfig,
    },
};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| map.get(name).cloned()
}

#[test]
fn settings_default() {
    let settings = Settings::default();

    assert_eq!(settings.interval, None);
    assert_eq!(settings.event_type, DEFAULT_EVENT_TYPE);
    assert_eq!(settings.event_source, DEFAULT_EVENT_SOURCE);
    assert_eq!(settings.sink, SinkConfig::Log);
    assert_eq!(settings.log_format, LogFormat::Pretty);
}

#[test]
fn settings_deserialize_toml() {
    let toml_str = r#"
        interval = "250ms"
        message_template = "hello {{.name}}"
        config_source = "/etc/heartbeats/vars.toml"
        send_timeout = "1s"
        log_format = "json"

        [config_vars]
        name = "world"

        [sink]
        kind = "file"
        path = "/tmp/events.jsonl"
    "#;

    let settings: Settings = toml::from_str(toml_str).unwrap();

    assert_eq!(settings.interval, Some(Duration::from_millis(250)));
    assert_eq!(settings.message_template.as_deref(), Some("hello {{.name}}"));
    assert_eq!(
        settings.config_source,
        Some(PathBuf::from("/etc/heartbeats/vars.toml"))
    );
    assert_eq!(settings.send_timeout, Some(Duration::from_secs(1)));
    assert_eq!(settings.log_format, LogFormat::Json);
    assert_eq!(settings.config_vars.get("name").map(String::as_str), Some("world"));
    assert_eq!(
        settings.sink,
        SinkConfig::File {
            path: PathBuf::from("/tmp/events.jsonl")
        }
    );
    assert_eq!(settings.event_type, DEFAULT_EVENT_TYPE);
}

#[test]
fn settings_reject_bad_duration() {
    let result: Result<Settings, _> = toml::from_str(r#"interval = "soon""#);
    assert!(result.is_err());
}

#[test]
fn env_overrides_file_values() {
    let mut settings: Settings = toml::from_str(
        r#"
        interval = "5s"
        message_template = "from file"
        [config_vars]
        a = "1"
        b = "2"
    "#,
    )
    .unwrap();

    settings
        .apply_env_with(env(&[
            ("INTERVAL", "100ms"),
            ("CONFIG_VARS", "b:20,c:30"),
            ("HEARTBEATS_LOG_FORMAT", "compact"),
        ]))
        .unwrap();

    assert_eq!(settings.interval, Some(Duration::from_millis(100)));
    assert_eq!(settings.message_template.as_deref(), Some("from file"));
    assert_eq!(settings.config_vars.get("a").map(String::as_str), Some("1"));
    assert_eq!(settings.config_vars.get("b").map(String::as_str), Some("20"));
    assert_eq!(settings.config_vars.get("c").map(String::as_str), Some("30"));
    assert_eq!(settings.log_format, LogFormat::Compact);
}

#[test]
fn env_rejects_bad_interval() {
    let mut settings = Settings::default();
    let err = settings
        .apply_env_with(env(&[("INTERVAL", "often")]))
        .unwrap_err();

    assert!(matches!(err, HeartbeatError::InvalidSetting { ref field, .. } if field == "INTERVAL"));
}

#[test]
fn overrides_win_over_env() {
    let mut settings = Settings::default();
    settings
        .apply_env_with(env(&[("INTERVAL", "1s"), ("MESSAGE_TEMPLATE", "env")]))
        .unwrap();

    settings.apply_overrides(SettingsOverrides {
        interval: Some(Duration::from_millis(10)),
        sink: Some(SinkConfig::Stdout),
        ..Default::default()
    });

    assert_eq!(settings.interval, Some(Duration::from_millis(10)));
    assert_eq!(settings.message_template.as_deref(), Some("env"));
    assert_eq!(settings.sink, SinkConfig::Stdout);
}

#[test]
fn validate_requires_interval_and_template() {
    let mut settings = Settings::default();
    assert!(settings.validate().is_err());

    settings.interval = Some(Duration::from_secs(1));
    assert!(settings.validate().is_err());

    settings.message_template = Some("tick".to_string());
    let config = settings.validate().unwrap();
    assert_eq!(config.interval, Duration::from_secs(1));
    assert_eq!(config.send_timeout, Duration::from_secs(1));
    assert_eq!(config.message_template, "tick");
}

#[test]
fn validate_rejects_zero_interval() {
    let settings = Settings {
        interval: Some(Duration::ZERO),
        message_template: Some("tick".to_string()),
        ..Default::default()
    };

    assert!(settings.validate().is_err());
}
