//! # sixthsensed: sixthsense daemon
//!
//! Composition root that wires the simulated oven to the oven facade and
//! runs a scripted cooking session.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Construct the attribute store and the virtual oven feeding it
//! - Construct the oven facade, injecting the virtual oven as transport
//! - Drive the session until it finishes or Ctrl-C arrives
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;
mod session;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use sixthsense_adapter_virtual::VirtualOven;
use sixthsense_app::attribute_store::AttributeStore;
use sixthsense_app::oven::Oven;
use sixthsense_domain::time::SystemClock;

use config::Config;

const TICK: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    let info = config.appliance_info()?;
    tracing::info!(said = %info.said, name = %info.name, speedup = config.simulation.speedup, "starting sixthsensed");

    // Store and simulated appliance
    let store = Arc::new(AttributeStore::default());
    let appliance = Arc::new(VirtualOven::new(
        Arc::clone(&store),
        config.simulation.clone(),
    )?);
    appliance.publish();

    // Facade
    let oven = Oven::with_options(
        info,
        Arc::clone(&store),
        Arc::clone(&appliance),
        config.oven_options(),
        Arc::new(SystemClock),
    );
    let _changes = oven.subscribe(|attrs| {
        tracing::debug!(attributes = attrs.len(), "attributes refreshed");
    });

    let ticker = appliance.spawn_ticker(TICK);

    tokio::select! {
        result = session::run(&oven) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("interrupted, stopping"),
    }

    ticker.abort();
    Ok(())
}
