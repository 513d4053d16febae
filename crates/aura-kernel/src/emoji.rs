//! Short-lived glyph overlays.
//!
//! Emojis pop up, tumble under gravity and fade out. They are aged
//! independently of particles and the pool has a hard ceiling.

use std::collections::VecDeque;

use aura_common::AnimationState;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::rng::{Rng, RngExt};

/// Downward acceleration per frame.
const GRAVITY: f32 = 0.15;
/// Horizontal velocity kept per frame.
const FRICTION: f32 = 0.98;
/// Fraction of lifetime spent fading out.
const FADE_FRACTION: f32 = 0.3;
/// Spawn probability at full intensity.
const SPAWN_PROBABILITY: f32 = 0.3;
/// Drawing size of an overlay.
const GLYPH_SIZE: f32 = 24.0;

/// Symbol drawn by an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Glyph {
    /// ✨
    Sparkle,
    /// 💜
    Heart,
    /// ⭐
    Star,
    /// ✅
    Check,
    /// ❌
    Cross,
    /// 💭
    Thought,
    /// 😂
    Laugh,
    /// 🎵
    Music,
    /// 👂
    Ear,
    /// 💬
    Speech,
    /// 🎉
    Party,
    /// 👋
    Wave,
}

impl Glyph {
    /// Unicode text for this glyph.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Sparkle => "\u{2728}",
            Self::Heart => "\u{1F49C}",
            Self::Star => "\u{2B50}",
            Self::Check => "\u{2705}",
            Self::Cross => "\u{274C}",
            Self::Thought => "\u{1F4AD}",
            Self::Laugh => "\u{1F602}",
            Self::Music => "\u{1F3B5}",
            Self::Ear => "\u{1F442}",
            Self::Speech => "\u{1F4AC}",
            Self::Party => "\u{1F389}",
            Self::Wave => "\u{1F44B}",
        }
    }

    /// Glyphs that fit an animation state.
    #[must_use]
    pub const fn for_state(state: AnimationState) -> &'static [Self] {
        match state {
            AnimationState::Idle => &[Self::Sparkle, Self::Star],
            AnimationState::Listening => &[Self::Ear, Self::Sparkle],
            AnimationState::Speaking => &[Self::Speech, Self::Music, Self::Sparkle],
            AnimationState::Conversation => &[Self::Speech, Self::Heart, Self::Star],
        }
    }
}

/// A tumbling, fading glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmojiOverlay {
    /// Position in canvas space.
    pub position: Vec2,
    /// Velocity per reference frame.
    pub velocity: Vec2,
    /// Symbol.
    pub glyph: Glyph,
    /// Rotation in radians.
    pub rotation: f32,
    /// Rotation per reference frame.
    pub rotation_speed: f32,
    /// Seconds since spawn.
    pub age: f32,
    /// Total lifetime in seconds.
    pub lifetime: f32,
    /// Current opacity (0-1).
    pub opacity: f32,
    /// Drawing size.
    pub size: f32,
}

impl EmojiOverlay {
    /// Creates an overlay popping upward from `position`.
    #[must_use]
    pub fn new(glyph: Glyph, position: Vec2, rng: &mut Rng) -> Self {
        Self {
            position,
            velocity: Vec2::new(rng.range(-1.5, 1.5), rng.range(-4.0, -2.0)),
            glyph,
            rotation: 0.0,
            rotation_speed: rng.range(-0.1, 0.1),
            age: 0.0,
            lifetime: rng.range(1.5, 2.5),
            opacity: 1.0,
            size: GLYPH_SIZE,
        }
    }

    /// Seconds left to live.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.lifetime - self.age
    }

    /// Whether the overlay has run out of time.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining() <= 0.0
    }

    fn step(&mut self, dt: f32, frames: f32) {
        self.velocity.y += GRAVITY * frames;
        self.velocity.x *= FRICTION.powf(frames);
        self.position += self.velocity * frames;
        self.rotation += self.rotation_speed * frames;
        self.age += dt;
        self.opacity = Self::fade(self.remaining(), self.lifetime);
    }

    /// Opacity for `remaining` seconds out of `lifetime`: 1 until the final
    /// 30 %, then linear to 0.
    #[must_use]
    pub fn fade(remaining: f32, lifetime: f32) -> f32 {
        let window = lifetime * FADE_FRACTION;
        if window <= 0.0 {
            return 0.0;
        }
        (remaining / window).clamp(0.0, 1.0)
    }
}

/// Bounded overlay pool with a spawn rate limit.
#[derive(Debug, Default)]
pub struct EmojiLayer {
    overlays: VecDeque<EmojiOverlay>,
    capacity: usize,
    min_interval: f32,
    last_spawn: Option<f32>,
    evicted: u64,
}

impl EmojiLayer {
    /// Create a layer holding at most `capacity` overlays, spawning
    /// ambiently no more than once per `min_interval` seconds.
    #[must_use]
    pub fn new(capacity: usize, min_interval: f32) -> Self {
        Self {
            overlays: VecDeque::with_capacity(capacity),
            capacity,
            min_interval,
            last_spawn: None,
            evicted: 0,
        }
    }

    /// Ambient spawn attempt at time `now`. Spawns only if more than
    /// `min_interval` passed since the last spawn and a coin weighted by
    /// `intensity` comes up. Returns whether an overlay was added.
    pub fn maybe_spawn(
        &mut self,
        now: f32,
        intensity: f32,
        origin: Vec2,
        state: AnimationState,
        rng: &mut Rng,
    ) -> bool {
        if let Some(last) = self.last_spawn {
            if now - last <= self.min_interval {
                return false;
            }
        }
        if !rng.chance(intensity * SPAWN_PROBABILITY) {
            return false;
        }
        let Some(&glyph) = rng.pick(Glyph::for_state(state)) else {
            return false;
        };

        let offset = rng.unit_vector() * rng.range(20.0, 60.0);
        self.spawn(glyph, origin + offset, rng);
        self.last_spawn = Some(now);
        true
    }

    /// Add an overlay unconditionally, dropping the oldest when full.
    pub fn spawn(&mut self, glyph: Glyph, position: Vec2, rng: &mut Rng) {
        if self.capacity == 0 {
            return;
        }
        while self.overlays.len() >= self.capacity {
            self.overlays.pop_front();
            self.evicted += 1;
        }
        self.overlays.push_back(EmojiOverlay::new(glyph, position, rng));
    }

    /// Advance every overlay and drop the expired ones.
    pub fn update(&mut self, dt: f32, frames: f32) {
        for overlay in &mut self.overlays {
            overlay.step(dt, frames);
        }
        self.overlays.retain(|o| !o.is_expired());
    }

    /// Live overlays, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &EmojiOverlay> {
        self.overlays.iter()
    }

    /// Number of live overlays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    /// Whether no overlay is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Overlays dropped to make room since creation.
    #[must_use]
    pub const fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Remove all overlays and reset the rate limit.
    pub fn clear(&mut self) {
        self.overlays.clear();
        self.last_spawn = None;
    }
}
