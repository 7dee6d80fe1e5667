//! Heartbeats - emits a templated event on a fixed interval.
//!
//! Wires settings, the variable store, its watched source and the producer
//! together, and shuts everything down on SIGINT, SIGTERM or SIGQUIT.

use std::{error::Error, path::PathBuf, process, time::Duration};

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span};

use heartbeats::{
    Result,
    config::{
        ConfigPaths, LogFormat, Settings, SettingsOverrides, SinkConfig, duration::parse_duration,
    },
    config_store::{ConfigSnapshot, ConfigSource, ConfigStore, DEFAULT_STORE_NAME},
    producer::{EventProducer, sender_for},
    signals::ShutdownSignals,
    tracing_config,
};

#[derive(Parser)]
#[command(name = "heartbeats")]
#[command(about = "Emit a templated heartbeat event on a fixed interval")]
struct Cli {
    /// Settings file (defaults to $XDG_CONFIG_HOME/heartbeats/heartbeats.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pause between events, e.g. "5s" or "100ms"
    #[arg(short, long, value_parser = parse_duration)]
    interval: Option<Duration>,

    /// Message text with {{.name}} placeholders
    #[arg(short, long)]
    message_template: Option<String>,

    /// TOML file of variables to watch
    #[arg(long)]
    config_source: Option<PathBuf>,

    /// Where to deliver events: log, stdout or file
    #[arg(long)]
    sink: Option<String>,

    /// Target file for the "file" sink
    #[arg(long)]
    sink_path: Option<PathBuf>,

    /// Console log format: pretty, json or compact
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Also write rotated log files to the state directory
    #[arg(long)]
    log_file: bool,

    /// Write rotated log files into this directory instead (implies --log-file)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> std::result::Result<SettingsOverrides, String> {
        let sink = match (self.sink.as_deref(), &self.sink_path) {
            (None, None) => None,
            (Some("log"), _) => Some(SinkConfig::Log),
            (Some("stdout"), _) => Some(SinkConfig::Stdout),
            (Some("file") | None, Some(path)) => Some(SinkConfig::File { path: path.clone() }),
            (Some("file"), None) => return Err("--sink file requires --sink-path".to_string()),
            (Some(other), _) => return Err(format!("unknown sink '{other}'")),
        };

        Ok(SettingsOverrides {
            interval: self.interval,
            message_template: self.message_template.clone(),
            config_source: self.config_source.clone(),
            sink,
            log_format: self.log_format,
        })
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let overrides = match cli.overrides() {
        Ok(overrides) => overrides,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    };

    let settings = match Settings::load(cli.config.as_deref(), overrides) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let log_dir = match cli.log_dir {
        Some(dir) => Some(dir),
        None if cli.log_file => Some(ConfigPaths::log_dir()?),
        None => None,
    };

    let _guard = match &log_dir {
        Some(dir) => Some(tracing_config::init_with_file(settings.log_format, dir)?),
        None => {
            tracing_config::init(settings.log_format)?;
            None
        }
    };

    if let Err(e) = run(settings).instrument(info_span!("heartbeats")).await {
        error!(error = %e, "Heartbeat service failed to start");
        process::exit(1);
    }

    Ok(())
}

async fn run(settings: Settings) -> Result<()> {
    let producer_config = settings.validate()?;
    let mut signals = ShutdownSignals::register()?;

    let initial = ConfigSnapshot::new(settings.config_vars.clone());
    let store = ConfigStore::with_snapshot(DEFAULT_STORE_NAME, initial);
    store.register_callback(|name, snapshot| {
        info!(store = name, variables = snapshot.len(), "Configuration variables updated");
    });

    let cancel = CancellationToken::new();

    let watch_task = match &settings.config_source {
        Some(path) => {
            let source = ConfigSource::new(path, store.clone());
            source.load().await?;
            Some(source.watch(cancel.child_token())?)
        }
        None => None,
    };

    let signal_token = cancel.clone();
    tokio::spawn(
        async move {
            signals.recv().await;
            info!("Shutdown signal received");
            signal_token.cancel();
        }
        .in_current_span(),
    );

    let sender = sender_for(&settings.sink);
    let mut producer = EventProducer::new(producer_config, store, sender);
    let stats = producer.start(cancel.clone()).await;

    cancel.cancel();
    if let Some(task) = watch_task {
        let _ = task.await;
    }

    info!(produced = stats.events_produced, "Heartbeat service stopped");
    Ok(())
}
