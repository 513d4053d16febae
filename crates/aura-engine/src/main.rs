//! # Aura
//!
//! Headless host for the Aura ambient particle engine.
//!
//! Loads `aura.toml` (or the path given as the first argument), drives the
//! simulation with a scripted session timeline and logs what happens. A
//! missing config file is created with the defaults.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod host;
mod timing;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;
use crate::host::Host;

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("aura=info".parse()?))
        .init();

    info!("Aura starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args()
        .nth(1)
        .map_or_else(AppConfig::default_path, PathBuf::from);
    let mut config = AppConfig::load_from(&path);
    config.validate();

    // First run: leave an editable copy of the defaults behind.
    if !path.exists() {
        if let Err(e) = config.save_to(&path) {
            warn!("Failed to write default config: {e}");
        }
    }

    let mut host = Host::new(config)?;
    let summary = host.run()?;

    info!(
        "Aura finished: {} ticks, peak {} particles, {} collisions, {} events",
        summary.stats.ticks,
        summary.peak_particles,
        summary.stats.total_collisions,
        summary.events
    );
    Ok(())
}
