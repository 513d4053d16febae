//! # Aura Common
//!
//! Common types and shared vocabulary for the Aura ambient particle engine.
//!
//! This crate provides the types exchanged between the simulation kernel and
//! its collaborators:
//! - Error types for configuration and host I/O
//! - RGBA colors and hex parsing
//! - Animation states and palettes supplied by the session controller
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod color;
pub mod error;
pub mod state;

/// Re-exported so downstream crates agree on one vector type.
pub use glam::Vec2;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::color::*;
    pub use crate::error::*;
    pub use crate::state::*;
    pub use glam::Vec2;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_exports() {
        let state = AnimationState::from_name("speaking");
        assert_eq!(state, AnimationState::Speaking);

        let color = parse_hex_color("#ff0000").unwrap_or(colors::WHITE);
        assert!((color[0] - 1.0).abs() < f32::EPSILON);

        let v = Vec2::new(3.0, 4.0);
        assert!((v.length() - 5.0).abs() < f32::EPSILON);
    }
}
