//! Load-time simulation configuration.
//!
//! Canvas dimensions and pool capacities are fixed when the engine is built;
//! [`ParticleEngine::resize`](crate::engine::ParticleEngine::resize) and
//! [`ParticleEngine::set_palette`](crate::engine::ParticleEngine::set_palette)
//! are the only runtime adjustments.

use aura_common::{ConfigError, Palette};
use serde::{Deserialize, Serialize};

/// Tick rate the per-frame motion constants are expressed in.
pub const REFERENCE_FPS: f32 = 30.0;

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Canvas ===
    /// Canvas width in canvas units
    pub canvas_width: f32,
    /// Canvas height in canvas units
    pub canvas_height: f32,
    /// Distance outside the canvas a particle may drift before removal
    pub bounds_margin: f32,

    // === Capacity ===
    /// Maximum live particles
    pub max_particles: usize,
    /// Maximum live trails (0 = twice `max_particles`)
    pub max_trails: usize,
    /// Maximum live emoji overlays
    pub max_emojis: usize,

    // === Behaviour ===
    /// Particle type/color weighting
    pub palette: Palette,
    /// Random seed (None = entropy)
    pub seed: Option<u64>,
    /// Run the collision pass
    pub enable_collisions: bool,
    /// Spawn emoji overlays
    pub enable_emojis: bool,

    // === Tuning ===
    /// Spatial hash cell size
    pub collision_cell_size: f32,
    /// Flow field cell size
    pub flow_resolution: f32,
    /// Flow force magnitude per reference frame
    pub flow_magnitude: f32,
    /// Minimum seconds between flow field refreshes
    pub flow_refresh_interval: f32,
    /// Minimum seconds between ambient emoji spawns
    pub emoji_min_interval: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            canvas_width: 900.0,
            canvas_height: 600.0,
            bounds_margin: 50.0,

            max_particles: 300,
            max_trails: 0,
            max_emojis: 50,

            palette: Palette::Friendly,
            seed: None,
            enable_collisions: true,
            enable_emojis: true,

            collision_cell_size: 20.0,
            flow_resolution: 30.0,
            flow_magnitude: 0.2,
            flow_refresh_interval: 0.2,
            emoji_min_interval: 0.5,
        }
    }
}

impl SimConfig {
    /// Builder-style seed override.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder-style canvas override.
    #[must_use]
    pub const fn with_canvas(mut self, width: f32, height: f32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    /// Builder-style particle capacity override.
    #[must_use]
    pub const fn with_max_particles(mut self, max_particles: usize) -> Self {
        self.max_particles = max_particles;
        self
    }

    /// Effective trail capacity.
    #[must_use]
    pub const fn trail_capacity(&self) -> usize {
        if self.max_trails == 0 {
            self.max_particles.saturating_mul(2)
        } else {
            self.max_trails
        }
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.canvas_width.is_finite()
            && self.canvas_height.is_finite()
            && self.canvas_width > 0.0
            && self.canvas_height > 0.0)
        {
            return Err(ConfigError::InvalidCanvas {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }
        if self.max_particles == 0 {
            return Err(ConfigError::ZeroCapacity {
                pool: "max_particles",
            });
        }
        if self.max_emojis == 0 {
            return Err(ConfigError::ZeroCapacity { pool: "max_emojis" });
        }
        for (name, value) in [
            ("collision_cell_size", self.collision_cell_size),
            ("flow_resolution", self.flow_resolution),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidSize { name, value });
            }
        }
        for (name, value) in [
            ("bounds_margin", self.bounds_margin),
            ("flow_magnitude", self.flow_magnitude),
            ("flow_refresh_interval", self.flow_refresh_interval),
            ("emoji_min_interval", self.emoji_min_interval),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidSize { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_trail_capacity_defaults_to_double() {
        let config = SimConfig::default().with_max_particles(40);
        assert_eq!(config.trail_capacity(), 80);

        let config = SimConfig {
            max_trails: 7,
            ..SimConfig::default()
        };
        assert_eq!(config.trail_capacity(), 7);
    }

    #[test]
    fn test_rejects_bad_canvas() {
        let config = SimConfig::default().with_canvas(0.0, 600.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCanvas { .. })
        ));

        let config = SimConfig::default().with_canvas(f32::NAN, 600.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = SimConfig::default().with_max_particles(0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCapacity {
                pool: "max_particles"
            })
        );
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        let config = SimConfig {
            collision_cell_size: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSize {
                name: "collision_cell_size",
                ..
            })
        ));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{"max_particles": 12, "palette": "dramatic"}"#).unwrap();
        assert_eq!(config.max_particles, 12);
        assert_eq!(config.palette, Palette::Dramatic);
        assert!((config.canvas_width - 900.0).abs() < f32::EPSILON);
    }
}
