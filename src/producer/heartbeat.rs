use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::{Event, EventSender, HeartbeatData, MessageTemplate, SendError};
use crate::{config::duration::format_duration, config_store::ConfigStore};

/// Validated settings for one [`EventProducer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerConfig {
    /// Fixed pause between ticks; never zero.
    pub interval: Duration,
    /// Message text with `{{.name}}` placeholders.
    pub message_template: String,
    /// Upper bound for a single delivery attempt.
    pub send_timeout: Duration,
    /// Type attribute of produced events.
    pub event_type: String,
    /// Source attribute of produced events.
    pub event_source: String,
}

/// Counters reported when the producer shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Events constructed, one per tick.
    pub events_produced: u64,
    /// Events the sender acknowledged.
    pub events_delivered: u64,
    /// Delivery attempts that failed or timed out.
    pub delivery_failures: u64,
    /// Ticks whose message could not be rendered.
    pub render_failures: u64,
}

/// Interval-driven heartbeat producer.
///
/// Each tick renders the message against the store's current snapshot,
/// builds an event with the next sequence number and hands it to the
/// sender. Neither render nor delivery failures stop the loop; only
/// cancellation does.
pub struct EventProducer {
    config: ProducerConfig,
    template: MessageTemplate,
    heartbeat: String,
    store: ConfigStore,
    sender: Arc<dyn EventSender>,
    next_sequence: u64,
    stats: ProducerStats,
}

impl EventProducer {
    /// Creates an idle producer whose sequence starts at 0.
    pub fn new(config: ProducerConfig, store: ConfigStore, sender: Arc<dyn EventSender>) -> Self {
        let template = MessageTemplate::parse(&config.message_template);
        let heartbeat = format_duration(config.interval);

        let snapshot = store.get_snapshot();
        for name in template.placeholders() {
            if !snapshot.contains(name) {
                warn!(variable = name, "Message template references an undefined variable");
            }
        }

        Self {
            config,
            template,
            heartbeat,
            store,
            sender,
            next_sequence: 0,
            stats: ProducerStats::default(),
        }
    }

    /// Sequence number the next event will carry.
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> ProducerStats {
        self.stats
    }

    /// Renders the message and builds the next event.
    ///
    /// A render failure is logged and yields an empty message. The sequence
    /// advances exactly once per call either way.
    pub fn build_event(&mut self) -> Event {
        let snapshot = self.store.get_snapshot();

        let message = match self.template.render(&snapshot) {
            Ok(message) => message,
            Err(e) => {
                error!(error = %e, template = %self.template.source(), "Failed to render message template");
                self.stats.render_failures += 1;
                String::new()
            }
        };

        let event = Event::new(
            &self.config.event_type,
            &self.config.event_source,
            HeartbeatData {
                sequence: self.next_sequence,
                heartbeat: self.heartbeat.clone(),
                message,
            },
        );

        self.next_sequence += 1;
        self.stats.events_produced += 1;
        event
    }

    /// Runs the production loop until `cancel` fires.
    ///
    /// The first tick happens one full interval after the call; each later
    /// wait starts when the previous tick finished. When the interval and
    /// cancellation are ready at the same time, cancellation wins and no
    /// event is produced. An in-flight send is never interrupted, but it is
    /// bounded by the configured send timeout.
    #[instrument(skip_all, fields(interval = %self.heartbeat))]
    pub async fn start(&mut self, cancel: CancellationToken) -> ProducerStats {
        info!("Starting heartbeat");

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            if cancel.is_cancelled() {
                break;
            }

            self.tick().await;
        }

        info!(
            produced = self.stats.events_produced,
            delivered = self.stats.events_delivered,
            delivery_failures = self.stats.delivery_failures,
            render_failures = self.stats.render_failures,
            "Shutting down heartbeat"
        );

        self.stats
    }

    async fn tick(&mut self) {
        let event = self.build_event();
        debug!(sequence = event.data.sequence, id = %event.id, "Sending new event");

        let result = match tokio::time::timeout(self.config.send_timeout, self.sender.send(&event))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SendError::Timeout(self.config.send_timeout)),
        };

        match result {
            Ok(()) => self.stats.events_delivered += 1,
            Err(e) => {
                // Possibly transient; the next interval tries again with a new event.
                warn!(sequence = event.data.sequence, error = %e, "Failed to send event");
                self.stats.delivery_failures += 1;
            }
        }
    }
}
