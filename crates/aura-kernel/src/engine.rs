//! Engine facade.
//!
//! [`ParticleEngine`] owns every pool and the random source. The host calls
//! [`ParticleEngine::update`] once per animation frame and draws the returned
//! [`FrameSnapshot`]. Reactions and keyword bursts may be pushed between
//! ticks.
//!
//! # Example
//!
//! ```
//! use aura_common::{AnimationState, Vec2};
//! use aura_kernel::engine::ParticleEngine;
//! use aura_kernel::reaction::ReactionTag;
//! use aura_kernel::SimConfig;
//!
//! let mut engine = ParticleEngine::new(SimConfig::default().with_seed(42))
//!     .expect("default config is valid");
//!
//! // Burst of success particles around a point
//! let spawned = engine.create_reaction(450.0, 300.0, ReactionTag::Success, None);
//! assert!((15..=25).contains(&spawned));
//!
//! // Advance one 30 Hz frame
//! let center = Vec2::new(450.0, 300.0);
//! let frame = engine.update(1.0 / 30.0, center, AnimationState::Speaking, 0.8);
//! assert!(!frame.particles().is_empty());
//! ```

use aura_common::{AnimationState, Color, ConfigError, Palette};
use glam::Vec2;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::collision::{CollisionOutcome, CollisionSystem};
use crate::config::{SimConfig, REFERENCE_FPS};
use crate::emitter::Emitter;
use crate::emoji::{EmojiLayer, EmojiOverlay};
use crate::flow_field::FlowField;
use crate::particle::{Particle, ShapeHint};
use crate::reaction::{self, ReactionTag};
use crate::rng::{seeded, Rng, RngExt};
use crate::store::ParticleStore;
use crate::trail::{Trail, TrailPool};

/// Vertical offset of the glyph that accompanies a reaction.
const REACTION_GLYPH_OFFSET: f32 = 30.0;

/// Counters describing the engine state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EngineStats {
    /// Live particles.
    pub particles: usize,
    /// Live trails.
    pub trails: usize,
    /// Live emoji overlays.
    pub emojis: usize,
    /// Collisions resolved in the last tick.
    pub collisions: usize,
    /// Attraction pulls applied in the last tick.
    pub attractions: usize,
    /// Collisions resolved since construction.
    pub total_collisions: u64,
    /// Particles overwritten by the capacity policy.
    pub evicted_particles: u64,
    /// Trails dropped by the capacity policy.
    pub evicted_trails: u64,
    /// Overlays dropped by the capacity policy.
    pub evicted_emojis: u64,
    /// Non-empty ticks run.
    pub ticks: u64,
    /// Simulated seconds.
    pub elapsed: f32,
}

/// One drawable disc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sprite {
    /// Center in canvas space.
    pub position: Vec2,
    /// Radius.
    pub size: f32,
    /// Color.
    pub color: Color,
    /// Opacity (0-1).
    pub opacity: f32,
    /// Drawing hint.
    pub shape: ShapeHint,
}

/// Read-only view of the engine for one tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot<'a> {
    particles: &'a [Particle],
    trails: &'a TrailPool,
    emojis: &'a EmojiLayer,
}

impl<'a> FrameSnapshot<'a> {
    /// Live particles in store order.
    #[must_use]
    pub const fn particles(&self) -> &'a [Particle] {
        self.particles
    }

    /// Live trails, oldest first.
    pub fn trails(&self) -> impl Iterator<Item = &'a Trail> {
        self.trails.iter()
    }

    /// Live emoji overlays, oldest first.
    pub fn emojis(&self) -> impl Iterator<Item = &'a EmojiOverlay> {
        self.emojis.iter()
    }

    /// Trails then particles, in draw order.
    #[must_use]
    pub fn sprites(&self) -> Vec<Sprite> {
        let mut sprites = Vec::with_capacity(self.trails.len() + self.particles.len());
        sprites.extend(self.trails.iter().map(|t| Sprite {
            position: t.position,
            size: t.size,
            color: t.color,
            opacity: t.opacity,
            shape: ShapeHint::Circle,
        }));
        sprites.extend(self.particles.iter().map(|p| Sprite {
            position: p.position,
            size: p.size,
            color: p.color,
            opacity: p.opacity,
            shape: p.shape(),
        }));
        sprites
    }
}

/// The particle simulation.
#[derive(Debug)]
pub struct ParticleEngine {
    config: SimConfig,
    rng: Rng,
    store: ParticleStore,
    trails: TrailPool,
    emojis: EmojiLayer,
    flow: FlowField,
    collisions: CollisionSystem,
    emitter: Emitter,
    /// Particles produced during a tick, spawned through the store.
    pending: Vec<Particle>,
    elapsed: f32,
    ticks: u64,
    last_outcome: CollisionOutcome,
    total_collisions: u64,
}

impl ParticleEngine {
    /// Builds an engine from a validated configuration.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let flow = FlowField::new(
            config.canvas_width,
            config.canvas_height,
            config.flow_resolution,
            config.flow_magnitude,
            config.flow_refresh_interval,
        );
        info!(
            "Particle engine: {}x{} canvas, {} particles, {} trails, {} emojis, palette {:?}",
            config.canvas_width,
            config.canvas_height,
            config.max_particles,
            config.trail_capacity(),
            config.max_emojis,
            config.palette
        );

        Ok(Self {
            rng: seeded(config.seed),
            store: ParticleStore::with_capacity(config.max_particles),
            trails: TrailPool::with_capacity(config.trail_capacity()),
            emojis: EmojiLayer::new(config.max_emojis, config.emoji_min_interval),
            flow,
            collisions: CollisionSystem::new(config.collision_cell_size),
            emitter: Emitter::new(config.palette),
            pending: Vec::new(),
            elapsed: 0.0,
            ticks: 0,
            last_outcome: CollisionOutcome::default(),
            total_collisions: 0,
            config,
        })
    }

    /// Advances the simulation by `dt` seconds and returns what to draw.
    ///
    /// Negative or non-finite `dt` counts as zero, and a zero-length tick
    /// changes nothing.
    pub fn update(
        &mut self,
        dt: f32,
        center: Vec2,
        state: AnimationState,
        intensity: f32,
    ) -> FrameSnapshot<'_> {
        if !(dt.is_finite() && dt > 0.0) {
            return self.snapshot();
        }
        let frames = dt * REFERENCE_FPS;
        let center = if center.is_finite() {
            center
        } else {
            self.canvas() * 0.5
        };
        self.elapsed += dt;
        self.ticks += 1;

        self.flow.refresh(self.elapsed);

        self.pending.clear();
        let emitted = self
            .emitter
            .emit(state, intensity, center, &mut self.rng, &mut self.pending);
        self.spawn_pending();

        self.last_outcome = if self.config.enable_collisions {
            self.collisions.resolve(
                self.store.as_mut_slice(),
                &mut self.rng,
                &mut self.trails,
                &mut self.pending,
            )
        } else {
            CollisionOutcome::default()
        };
        self.total_collisions += self.last_outcome.collisions as u64;
        let sparks = self.pending.len();
        self.spawn_pending();

        self.integrate(dt, frames);
        let removed = self.store.compact();

        self.trails.update(dt);
        if self.config.enable_emojis {
            self.emojis
                .maybe_spawn(self.elapsed, intensity, center, state, &mut self.rng);
        }
        self.emojis.update(dt, frames);

        trace!(
            "tick {}: emitted {}, sparks {}, collisions {}, attractions {}, removed {}, live {}",
            self.ticks,
            emitted,
            sparks,
            self.last_outcome.collisions,
            self.last_outcome.attractions,
            removed,
            self.store.len()
        );
        self.snapshot()
    }

    /// Steps every live particle and marks the dead and the escaped.
    fn integrate(&mut self, dt: f32, frames: f32) {
        let canvas = self.canvas();
        let margin = self.config.bounds_margin;
        for particle in self.store.as_mut_slice() {
            if !particle.active {
                continue;
            }
            // Escaped particles go before edge reflection can pull them back.
            if particle.is_out_of_bounds(canvas.x, canvas.y, margin) {
                particle.active = false;
                continue;
            }
            let flow = self.flow.force_at(particle.position.x, particle.position.y);
            if let Some(trail) = particle.step(dt, frames, flow, canvas, &mut self.rng) {
                self.trails.push(trail);
            }
            if particle.lifetime <= 0.0 || particle.is_out_of_bounds(canvas.x, canvas.y, margin)
            {
                particle.active = false;
            }
        }
    }

    fn spawn_pending(&mut self) {
        for particle in self.pending.drain(..) {
            self.store.spawn(particle);
        }
    }

    /// Current view without advancing time.
    #[must_use]
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            particles: self.store.as_slice(),
            trails: &self.trails,
            emojis: &self.emojis,
        }
    }

    /// Spawns the burst for `tag` around (`x`, `y`), in `color` if given.
    /// Returns how many particles were spawned.
    pub fn create_reaction(
        &mut self,
        x: f32,
        y: f32,
        tag: ReactionTag,
        color: Option<Color>,
    ) -> usize {
        let Some(origin) = Self::origin(x, y) else {
            warn!("Ignoring {:?} reaction at non-finite position ({}, {})", tag, x, y);
            return 0;
        };

        self.pending.clear();
        let count = reaction::reaction(tag, origin, color, &mut self.rng, &mut self.pending);
        self.spawn_pending();
        self.reaction_glyph(tag, origin);

        debug!("Reaction {:?} at ({:.0}, {:.0}): {} particles", tag, x, y, count);
        count
    }

    /// Spawns the burst matching `keyword` around (`x`, `y`). Returns how many
    /// particles were spawned.
    pub fn create_keyword_burst(&mut self, x: f32, y: f32, keyword: &str) -> usize {
        let Some(origin) = Self::origin(x, y) else {
            warn!(
                "Ignoring keyword burst {:?} at non-finite position ({}, {})",
                keyword, x, y
            );
            return 0;
        };

        self.pending.clear();
        let (tag, count) =
            reaction::keyword_burst(keyword, origin, &mut self.rng, &mut self.pending);
        self.spawn_pending();
        self.reaction_glyph(tag, origin);

        debug!("Keyword {:?} -> {:?}: {} particles", keyword, tag, count);
        count
    }

    fn origin(x: f32, y: f32) -> Option<Vec2> {
        let origin = Vec2::new(x, y);
        origin.is_finite().then_some(origin)
    }

    fn reaction_glyph(&mut self, tag: ReactionTag, origin: Vec2) {
        if !self.config.enable_emojis {
            return;
        }
        if let Some(&glyph) = self.rng.pick(tag.burst().glyphs) {
            let position = origin - Vec2::new(0.0, REACTION_GLYPH_OFFSET);
            self.emojis.spawn(glyph, position, &mut self.rng);
        }
    }

    /// Inserts a particle through the capacity policy. Returns its slot, or
    /// `None` if it was rejected.
    pub fn spawn_particle(&mut self, particle: Particle) -> Option<usize> {
        if !(particle.position.is_finite() && particle.velocity.is_finite()) {
            warn!("Ignoring {:?} particle with non-finite motion", particle.kind);
            return None;
        }
        self.store.spawn(particle)
    }

    /// Switches the emitter palette.
    pub fn set_palette(&mut self, palette: Palette) {
        if palette != self.config.palette {
            debug!("Palette {:?} -> {:?}", self.config.palette, palette);
        }
        self.config.palette = palette;
        self.emitter.set_palette(palette);
    }

    /// Changes the canvas dimensions. Live particles stay where they are and
    /// fall to the usual bounds check on the next tick.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        let resized = self.config.clone().with_canvas(width, height);
        resized.validate()?;
        self.config = resized;
        self.flow.resize(width, height);
        debug!(
            "Canvas resized to {}x{} ({}x{} flow cells)",
            width,
            height,
            self.flow.cols(),
            self.flow.rows()
        );
        Ok(())
    }

    /// Drops every particle, trail and overlay.
    pub fn clear(&mut self) {
        debug!(
            "Clearing {} particles, {} trails, {} emojis",
            self.store.len(),
            self.trails.len(),
            self.emojis.len()
        );
        self.store.clear();
        self.trails.clear();
        self.emojis.clear();
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            particles: self.store.len(),
            trails: self.trails.len(),
            emojis: self.emojis.len(),
            collisions: self.last_outcome.collisions,
            attractions: self.last_outcome.attractions,
            total_collisions: self.total_collisions,
            evicted_particles: self.store.evicted(),
            evicted_trails: self.trails.evicted(),
            evicted_emojis: self.emojis.evicted(),
            ticks: self.ticks,
            elapsed: self.elapsed,
        }
    }

    /// Live particles.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        self.store.as_slice()
    }

    /// Live trails.
    #[must_use]
    pub const fn trails(&self) -> &TrailPool {
        &self.trails
    }

    /// Live emoji overlays.
    #[must_use]
    pub const fn emojis(&self) -> &EmojiLayer {
        &self.emojis
    }

    /// Ambient flow field.
    #[must_use]
    pub const fn flow_field(&self) -> &FlowField {
        &self.flow
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    fn canvas(&self) -> Vec2 {
        Vec2::new(self.config.canvas_width, self.config.canvas_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleKind;
    use aura_common::colors;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 30.0;

    fn engine(config: SimConfig) -> ParticleEngine {
        match ParticleEngine::new(config.with_seed(7)) {
            Ok(engine) => engine,
            Err(e) => panic!("engine construction failed: {e}"),
        }
    }

    fn center() -> Vec2 {
        Vec2::new(450.0, 300.0)
    }

    fn still(kind: ParticleKind, position: Vec2, lifetime: f32) -> Particle {
        Particle::new(kind, position, Vec2::ZERO, 4.0, lifetime, colors::WHITE)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SimConfig::default().with_canvas(0.0, 600.0);
        assert!(ParticleEngine::new(config).is_err());
    }

    #[test]
    fn test_update_spawns_when_intense() {
        let mut e = engine(SimConfig::default());
        for _ in 0..30 {
            e.update(DT, center(), AnimationState::Speaking, 1.0);
        }
        assert!(!e.particles().is_empty());
        assert_eq!(e.stats().ticks, 30);
        assert!((e.stats().elapsed - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_intensity_spawns_nothing() {
        let mut e = engine(SimConfig::default());
        for _ in 0..30 {
            e.update(DT, center(), AnimationState::Speaking, 0.0);
        }
        assert!(e.particles().is_empty());
        assert!(e.emojis().is_empty());
    }

    #[test]
    fn test_capacity_eviction_scenario() {
        let mut e = engine(SimConfig::default().with_max_particles(5));
        for (i, lifetime) in [0.1, 0.2, 0.3, 0.4, 0.5, 0.6].into_iter().enumerate() {
            let p = still(ParticleKind::Normal, Vec2::new(100.0 + i as f32, 100.0), 1.0)
                .with_lifetime(lifetime, 1.0);
            assert!(e.spawn_particle(p).is_some());
        }
        let lifetimes: Vec<f32> = e.particles().iter().map(|p| p.lifetime).collect();
        assert_eq!(lifetimes, vec![0.6, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(e.stats().evicted_particles, 1);
    }

    #[test]
    fn test_particle_past_margin_is_removed() {
        let mut e = engine(SimConfig::default());
        e.spawn_particle(still(ParticleKind::Normal, Vec2::new(-60.0, 300.0), 3.0));
        e.spawn_particle(still(ParticleKind::Normal, Vec2::new(-40.0, 300.0), 3.0));
        let snapshot = e.update(DT, center(), AnimationState::Idle, 0.0);
        assert_eq!(snapshot.particles().len(), 1);
        assert!(snapshot.particles()[0].position.x > -50.0);
    }

    #[test]
    fn test_escaped_particle_of_every_kind_is_removed() {
        for kind in ParticleKind::ALL {
            let mut e = engine(SimConfig::default());
            e.spawn_particle(still(kind, Vec2::new(-60.0, 300.0), 3.0));
            let snapshot = e.update(DT, center(), AnimationState::Idle, 0.0);
            assert!(snapshot.particles().is_empty(), "{kind:?} survived");
        }
    }

    #[test]
    fn test_bounce_still_reflects_inside_margin() {
        let mut e = engine(SimConfig::default());
        let p = Particle::new(
            ParticleKind::Bounce,
            Vec2::new(2.0, 300.0),
            Vec2::new(-3.0, 0.0),
            4.0,
            3.0,
            colors::WHITE,
        );
        e.spawn_particle(p);
        e.update(DT, center(), AnimationState::Idle, 0.0);
        assert_eq!(e.particles().len(), 1);
        assert!(e.particles()[0].position.x >= 0.0);
        assert!(e.particles()[0].velocity.x > 0.0);
    }

    #[test]
    fn test_expired_particle_is_removed() {
        let mut e = engine(SimConfig::default());
        e.spawn_particle(still(ParticleKind::Normal, center(), 0.01));
        e.spawn_particle(still(ParticleKind::Normal, center() + Vec2::X * 100.0, 2.0));
        e.update(DT, center(), AnimationState::Idle, 0.0);
        assert_eq!(e.particles().len(), 1);
        assert!((e.particles()[0].lifetime - (2.0 - DT)).abs() < 1e-5);
    }

    #[test]
    fn test_removal_preserves_order() {
        let mut e = engine(SimConfig::default());
        for i in 0..6 {
            let lifetime = if i % 2 == 0 { 0.01 } else { 1.0 + i as f32 };
            let position = Vec2::new(100.0 + 100.0 * i as f32, 300.0);
            e.spawn_particle(still(ParticleKind::Normal, position, lifetime));
        }
        e.update(DT, center(), AnimationState::Idle, 0.0);
        let maxes: Vec<f32> = e.particles().iter().map(|p| p.max_lifetime).collect();
        assert_eq!(maxes, vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_zero_dt_is_idempotent() {
        let mut e = engine(SimConfig::default());
        for _ in 0..20 {
            e.update(DT, center(), AnimationState::Speaking, 1.0);
        }
        e.create_reaction(300.0, 300.0, ReactionTag::Success, None);

        let particles = e.particles().to_vec();
        let trails: Vec<Trail> = e.trails().iter().copied().collect();
        let emojis: Vec<EmojiOverlay> = e.emojis().iter().copied().collect();
        let stats = e.stats();

        for _ in 0..5 {
            let snapshot = e.update(0.0, center(), AnimationState::Speaking, 1.0);
            assert_eq!(snapshot.particles(), particles.as_slice());
        }
        e.update(-1.0, center(), AnimationState::Speaking, 1.0);
        e.update(f32::NAN, center(), AnimationState::Speaking, 1.0);

        assert_eq!(e.particles(), particles.as_slice());
        assert_eq!(e.trails().iter().copied().collect::<Vec<_>>(), trails);
        assert_eq!(e.emojis().iter().copied().collect::<Vec<_>>(), emojis);
        assert_eq!(e.stats(), stats);
    }

    #[test]
    fn test_lifetime_never_increases() {
        let mut e = engine(SimConfig::default());
        for i in 0..8 {
            let position = Vec2::new(100.0 + 80.0 * i as f32, 300.0);
            e.spawn_particle(still(ParticleKind::Normal, position, 5.0));
        }
        let mut previous: Vec<f32> = e.particles().iter().map(|p| p.lifetime).collect();
        for _ in 0..30 {
            e.update(DT, center(), AnimationState::Idle, 0.0);
            let current: Vec<f32> = e.particles().iter().map(|p| p.lifetime).collect();
            assert_eq!(current.len(), previous.len());
            for (now, before) in current.iter().zip(&previous) {
                assert!(now < before);
            }
            previous = current;
        }
    }

    #[test]
    fn test_error_reaction_scenario() {
        let mut e = engine(SimConfig::default());
        let count = e.create_reaction(200.0, 200.0, ReactionTag::from_name("error"), None);
        assert!((10..=15).contains(&count));
        assert_eq!(e.particles().len(), count);
        assert!(e.particles().iter().all(|p| p.color == colors::ERROR_RED));
        assert_eq!(e.emojis().len(), 1);
    }

    #[test]
    fn test_reaction_respects_capacity() {
        let mut e = engine(SimConfig::default().with_max_particles(10));
        e.create_reaction(200.0, 200.0, ReactionTag::Celebrate, None);
        assert_eq!(e.particles().len(), 10);
        assert!(e.stats().evicted_particles >= 10);
    }

    #[test]
    fn test_non_finite_requests_are_ignored() {
        let mut e = engine(SimConfig::default());
        assert_eq!(e.create_reaction(f32::NAN, 10.0, ReactionTag::Joke, None), 0);
        assert_eq!(e.create_keyword_burst(10.0, f32::INFINITY, "error"), 0);
        let bad = still(ParticleKind::Normal, Vec2::new(f32::NAN, 0.0), 1.0);
        assert!(e.spawn_particle(bad).is_none());
        assert!(e.particles().is_empty());
        assert!(e.emojis().is_empty());
    }

    #[test]
    fn test_speaking_keyword_pulls_particles_in() {
        let config = SimConfig {
            flow_magnitude: 0.0,
            ..SimConfig::default()
        };
        let mut e = engine(config);
        let origin = Vec2::new(410.0, 310.0);
        e.create_keyword_burst(origin.x, origin.y, "speaking");
        assert_eq!(e.particles().iter().filter(|p| p.is_attractor()).count(), 1);

        let mut attractions = 0;
        let mut pulled = false;
        for _ in 0..5 {
            let Some(attractor) = e.particles().iter().find(|p| p.is_attractor()) else {
                break;
            };
            // Follower velocities and the direction to the attractor, keyed by
            // their randomly drawn max lifetime.
            let before: Vec<(f32, Vec2, Vec2)> = e
                .particles()
                .iter()
                .filter(|p| !p.is_attractor())
                .map(|p| {
                    let to_attractor = (attractor.position - p.position).normalize_or_zero();
                    (p.max_lifetime, p.velocity, to_attractor)
                })
                .collect();

            e.update(DT, center(), AnimationState::Idle, 0.0);
            attractions += e.stats().attractions;

            pulled |= before.iter().any(|&(max, velocity, to_attractor)| {
                e.particles()
                    .iter()
                    .find(|p| (p.max_lifetime - max).abs() < 1e-6)
                    .is_some_and(|p| (p.velocity - velocity).dot(to_attractor) > 0.1)
            });
        }
        assert!(attractions > 0);
        assert!(pulled);
    }

    #[test]
    fn test_disabled_subsystems() {
        let config = SimConfig {
            enable_collisions: false,
            enable_emojis: false,
            ..SimConfig::default()
        };
        let mut e = engine(config);
        e.create_reaction(200.0, 200.0, ReactionTag::Joke, None);
        for _ in 0..30 {
            e.update(DT, center(), AnimationState::Speaking, 1.0);
        }
        assert_eq!(e.stats().total_collisions, 0);
        assert!(e.emojis().is_empty());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = || {
            let mut e = engine(SimConfig::default());
            e.create_keyword_burst(300.0, 300.0, "task complete");
            for i in 0..60 {
                let state = AnimationState::ALL[(i / 15) % 4];
                e.update(DT, center(), state, 0.8);
            }
            e.particles().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_sprites_cover_trails_then_particles() {
        let mut e = engine(SimConfig::default());
        e.create_reaction(300.0, 300.0, ReactionTag::Success, None);
        for _ in 0..10 {
            e.update(DT, center(), AnimationState::Speaking, 1.0);
        }
        let snapshot = e.snapshot();
        let sprites = snapshot.sprites();
        let trail_count = snapshot.trails().count();
        assert_eq!(sprites.len(), trail_count + snapshot.particles().len());
        for (sprite, particle) in sprites[trail_count..].iter().zip(snapshot.particles()) {
            assert_eq!(sprite.position, particle.position);
            assert_eq!(sprite.shape, particle.shape());
        }
        assert!(sprites.iter().all(|s| (0.0..=1.0).contains(&s.opacity)));
    }

    #[test]
    fn test_controls() {
        let mut e = engine(SimConfig::default());
        e.set_palette(Palette::Dramatic);
        assert_eq!(e.config().palette, Palette::Dramatic);

        assert!(e.resize(300.0, 150.0).is_ok());
        assert_eq!(e.flow_field().cols(), 10);
        assert_eq!(e.flow_field().rows(), 5);
        assert!(e.resize(-1.0, 150.0).is_err());
        assert!((e.config().canvas_width - 300.0).abs() < f32::EPSILON);

        e.create_reaction(100.0, 100.0, ReactionTag::Greeting, None);
        e.update(DT, Vec2::new(150.0, 75.0), AnimationState::Listening, 1.0);
        e.clear();
        let stats = e.stats();
        assert_eq!((stats.particles, stats.trails, stats.emojis), (0, 0, 0));
    }

    proptest! {
        #[test]
        fn prop_store_never_exceeds_capacity(
            seed in 0u64..1000,
            max_particles in 1usize..40,
            intensity in 0.0f32..1.0,
            bursts in 0usize..4
        ) {
            let config = SimConfig::default()
                .with_max_particles(max_particles)
                .with_seed(seed);
            let mut e = match ParticleEngine::new(config) {
                Ok(e) => e,
                Err(err) => panic!("engine construction failed: {err}"),
            };
            for i in 0..45 {
                if i % 10 == 0 {
                    for _ in 0..bursts {
                        e.create_reaction(450.0, 300.0, ReactionTag::Celebrate, None);
                    }
                }
                let snapshot = e.update(DT, center(), AnimationState::Speaking, intensity);
                prop_assert!(snapshot.particles().len() <= max_particles);
                prop_assert!(snapshot.particles().iter().all(|p| p.active && p.lifetime > 0.0));
            }
            prop_assert!(e.trails().len() <= e.config().trail_capacity());
        }

        #[test]
        fn prop_lifetime_never_increases(
            seed in 0u64..1000,
            kinds in proptest::collection::vec(0usize..8, 1..12)
        ) {
            let config = SimConfig::default()
                .with_max_particles(2000)
                .with_seed(seed);
            let mut e = match ParticleEngine::new(config) {
                Ok(e) => e,
                Err(err) => panic!("engine construction failed: {err}"),
            };

            // Each particle is tagged by a distinct max lifetime. Every mixed
            // kind gets a physics or attractor partner heading into it.
            let mut tracked = Vec::new();
            for (i, &k) in kinds.iter().enumerate() {
                let base = Vec2::new(80.0 + 65.0 * i as f32, 300.0);
                let partner = if i % 2 == 0 {
                    ParticleKind::Physics
                } else {
                    ParticleKind::Attractor
                };
                let own = 4.0 + 0.02 * i as f32;
                let other = own + 0.01;
                let a = Particle::new(ParticleKind::ALL[k], base, Vec2::X, 4.0, own, colors::WHITE);
                let b = Particle::new(
                    partner,
                    base + Vec2::new(6.0, 0.0),
                    -Vec2::X,
                    4.0,
                    other,
                    colors::WHITE,
                );
                prop_assert!(e.spawn_particle(a).is_some());
                prop_assert!(e.spawn_particle(b).is_some());
                tracked.push((own, own));
                tracked.push((other, other));
            }

            for _ in 0..45 {
                e.update(DT, center(), AnimationState::Idle, 0.0);
                prop_assert_eq!(e.stats().evicted_particles, 0);
                for (max, previous) in &mut tracked {
                    let found = e
                        .particles()
                        .iter()
                        .find(|p| (p.max_lifetime - *max).abs() < 1e-6);
                    if let Some(p) = found {
                        prop_assert!(p.lifetime < *previous);
                        *previous = p.lifetime;
                    }
                }
            }
        }
    }
}
