//! Host configuration.
//!
//! Wraps the simulation parameters together with the settings of the headless
//! driver loop. Configuration can be loaded from and saved to a TOML file.

use aura_kernel::SimConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
const CONFIG_FILE: &str = "aura.toml";

/// Driver loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Ticks per second
    pub tick_rate: u32,
    /// Simulated run length in seconds
    pub duration_secs: f32,
    /// Sleep between ticks to run in real time
    pub paced: bool,
    /// Write the final render snapshot here as JSON
    pub snapshot_path: Option<PathBuf>,
    /// Fraction of the gap to the target intensity closed per reference frame
    pub intensity_smoothing: f32,
    /// Seconds spent in each animation state of the scripted timeline
    pub state_period_secs: f32,
    /// Seconds between scripted reaction events (0 = disabled)
    pub reaction_interval_secs: f32,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30,
            duration_secs: 12.0,
            paced: false,
            snapshot_path: None,
            intensity_smoothing: 0.1,
            state_period_secs: 3.0,
            reaction_interval_secs: 1.5,
        }
    }
}

/// Everything the `aura` binary reads at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Simulation parameters
    pub simulation: SimConfig,
    /// Driver loop settings
    pub host: HostConfig,
}

impl AppConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Default configuration file path.
    pub fn default_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE)
    }

    /// Clamp host settings to sensible ranges. Simulation parameters are
    /// checked by the engine itself.
    pub fn validate(&mut self) {
        let host = &mut self.host;
        host.tick_rate = host.tick_rate.clamp(1, 240);
        if !host.duration_secs.is_finite() {
            host.duration_secs = HostConfig::default().duration_secs;
        }
        host.duration_secs = host.duration_secs.clamp(0.0, 3600.0);
        host.intensity_smoothing = if host.intensity_smoothing.is_finite() {
            host.intensity_smoothing.clamp(0.01, 1.0)
        } else {
            HostConfig::default().intensity_smoothing
        };
        if !(host.state_period_secs.is_finite() && host.state_period_secs > 0.1) {
            host.state_period_secs = HostConfig::default().state_period_secs;
        }
        if !(host.reaction_interval_secs.is_finite() && host.reaction_interval_secs >= 0.0) {
            host.reaction_interval_secs = 0.0;
        }
    }
}
