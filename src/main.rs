//! Call Informer
//!
//! Headless core of the call popup application: subscribes to the
//! call-control event bus, tracks call sessions, resolves caller identities
//! against the info service, and emits popup notifications (logged here; a
//! GUI consumes the same sink trait).

mod notifier;

use std::env;
use std::sync::Arc;

use anyhow::Context;
use informer_core::AppConfig;
use informer_events::EventChannelClient;
use informer_lookup::LookupClient;
use informer_tracker::CallSessionTracker;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notifier::LogNotifier;

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "call_informer={},informer_core={},informer_events={},informer_lookup={},informer_tracker={}",
            log_level, log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting Call Informer v{}", env!("CARGO_PKG_VERSION"));

    // Settings are read once and injected; a missing field stops us here,
    // before any connection attempt
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("configuration is incomplete")?;

    let sink = Arc::new(LogNotifier::new(&config.popup));
    let lookup = Arc::new(LookupClient::new(&config.lookup)?);
    let tracker = CallSessionTracker::new(sink, lookup, &config.popup);
    let client = EventChannelClient::new(config.connection.clone())?;

    let (updates_tx, updates_rx) = mpsc::channel(256);
    let tracker_handle = tokio::spawn(tracker.run(updates_rx));
    let client_handle = tokio::spawn(client.run(updates_tx));

    info!("connected components, waiting for call events");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    info!("shutting down");

    // Stop the reader; dropping its update sender lets the tracker drain,
    // cancel pending timers, and exit. In-flight lookups complete against a
    // closed channel and are discarded.
    client_handle.abort();
    tracker_handle.await.ok();

    Ok(())
}
