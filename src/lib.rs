//! Heartbeats - interval-driven event producer with hot-reloadable variables.
//!
//! On a fixed interval the service renders a message template against a
//! live set of configuration variables and publishes the result as an event
//! to a downstream sink. The main pieces are:
//!
//! - [`config_store::ConfigStore`]: concurrently readable variables,
//!   replaced as whole snapshots, with post-update callbacks
//! - [`config_store::ConfigSource`]: a watched TOML file feeding the store
//! - [`producer::EventProducer`]: the cancellable production loop
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::{sync::Arc, time::Duration};
//!
//! use heartbeats::{
//!     config_store::ConfigStore,
//!     producer::{EventProducer, LogSender, ProducerConfig},
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() {
//! let store = ConfigStore::default();
//! store.replace([("name", "world")].into_iter().collect());
//!
//! let config = ProducerConfig {
//!     interval: Duration::from_secs(5),
//!     message_template: "hello {{.name}}".to_string(),
//!     send_timeout: Duration::from_secs(5),
//!     event_type: "dev.heartbeats.heartbeat".to_string(),
//!     event_source: "heartbeats/heartbeat-source".to_string(),
//! };
//!
//! let mut producer = EventProducer::new(config, store, Arc::new(LogSender));
//! let stats = producer.start(CancellationToken::new()).await;
//! println!("produced {} events", stats.events_produced);
//! # }
//! ```

/// Process settings, duration codec and file locations.
pub mod config;

/// Hot-reloadable configuration variables.
pub mod config_store;

/// Core error types and result aliases.
pub mod core;

/// Event construction, templating, delivery and the production loop.
pub mod producer;

/// Shutdown signal handling.
pub mod signals;

/// Tracing subscriber setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use crate::core::{HeartbeatError, Result};
