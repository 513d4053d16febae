//! Error types for Aura.

use thiserror::Error;

/// Top-level error type for Aura operations.
#[derive(Debug, Error)]
pub enum AuraError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while validating load-time configuration.
///
/// The simulation itself never fails at runtime; these only surface when an
/// engine is constructed or a config file is checked.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Canvas must have positive, finite dimensions
    #[error("Invalid canvas dimensions {width}x{height}")]
    InvalidCanvas {
        /// Configured width
        width: f32,
        /// Configured height
        height: f32,
    },

    /// A pool capacity was zero
    #[error("Capacity for {pool} must be at least 1")]
    ZeroCapacity {
        /// Name of the pool
        pool: &'static str,
    },

    /// A spatial size (cell size, flow resolution, margin) was not positive
    #[error("Invalid {name}: {value}")]
    InvalidSize {
        /// Name of the setting
        name: &'static str,
        /// Offending value
        value: f32,
    },

    /// A color string could not be parsed
    #[error("Invalid color '{0}', expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),
}

/// Result type alias for Aura operations.
pub type AuraResult<T> = Result<T, AuraError>;
