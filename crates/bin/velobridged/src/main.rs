//! # velobridged — velobridge daemon
//!
//! Composition root that wires the broker subscription to the relational
//! store and runs until signalled.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install logging (file + stderr)
//! - Initialize the `SQLite` connection pool and create the telemetry tables
//! - Construct the reading store, writers and dispatcher
//! - Subscribe to the battery and location topics and confirm with the broker
//! - Handle graceful shutdown (SIGTERM/SIGINT): disconnect, close the pool
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;
mod logging;

use std::sync::Arc;

use tokio::sync::watch;
use velobridge_adapter_mqtt::MqttSubscriber;
use velobridge_adapter_storage_sqlite_sqlx::SqliteReadingStore;
use velobridge_app::dispatcher::Dispatcher;
use velobridge_app::services::battery_writer::BatteryWriter;
use velobridge_app::services::location_writer::LocationWriter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    logging::init(&config.logging)?;

    tracing::info!(
        broker = %config.mqtt.broker_url,
        database = %config.database.url,
        "starting velobridged"
    );

    // Database
    let db = config.storage().build().await?;
    let store = SqliteReadingStore::new(db.pool().clone());

    // Services
    let dispatcher = Arc::new(Dispatcher::new(
        BatteryWriter::new(store.clone()),
        LocationWriter::new(store),
    ));

    // Broker
    let mut subscriber = MqttSubscriber::new(&config.mqtt)?;
    dispatcher.bind(&mut subscriber, &config.topics()).await?;
    subscriber.establish().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let broker = tokio::spawn(subscriber.run(shutdown_rx));

    wait_for_signal().await?;

    let _ = shutdown_tx.send(true);
    if let Err(err) = broker.await {
        tracing::error!(error = %err, "subscriber task failed");
    }
    db.close().await;

    tracing::info!("velobridged stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("received Ctrl+C, shutting down");
    Ok(())
}
