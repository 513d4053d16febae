//! # Aura Kernel
//!
//! Tick-driven 2D particle simulation behind the assistant's ambient visuals.
//!
//! This crate provides:
//! - A bounded particle store with freshness-biased eviction
//! - Per-kind motion rules driven by an ambient flow field
//! - A uniform spatial hash for collision and attraction between nearby particles
//! - Trail deposits and emoji overlays with their own capped pools
//! - State-driven emission and one-shot reaction bursts
//!
//! ## Architecture
//!
//! [`ParticleEngine`] owns every pool and a single seedable random source.
//! The host calls [`ParticleEngine::update`] once per animation frame; each
//! tick runs spawn, collision, integration and expiry in that order and
//! returns a [`FrameSnapshot`] that borrows the engine until the next tick.
//!
//! ## Time
//!
//! Motion constants are tuned per frame at 30 Hz. A tick of `dt` seconds
//! advances `dt * 30` reference frames, so a nominal 33 ms tick applies each
//! rule exactly once and a zero-length tick changes nothing.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod collision;
pub mod config;
pub mod emitter;
pub mod emoji;
pub mod engine;
pub mod flow_field;
pub mod particle;
pub mod reaction;
pub mod rng;
pub mod store;
pub mod trail;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::collision::*;
    pub use crate::config::*;
    pub use crate::emitter::*;
    pub use crate::emoji::*;
    pub use crate::engine::*;
    pub use crate::flow_field::*;
    pub use crate::particle::*;
    pub use crate::reaction::{BurstSpec, KeywordCategory, ReactionTag};
    pub use crate::rng::*;
    pub use crate::store::*;
    pub use crate::trail::*;
}

pub use prelude::*;
