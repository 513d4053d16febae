//! Ambient spawn policy.
//!
//! Maps the assistant's animation state to how many particles appear each
//! tick, which kinds they are, and which colors they wear.

use aura_common::{AnimationState, Color, Palette};
use glam::Vec2;

use crate::particle::{Particle, ParticleKind};
use crate::rng::{Rng, RngExt};

/// Outward push added to freshly spawned particles.
const RADIAL_PUSH: f32 = 0.5;

/// Weighted set of eligible kinds.
pub type KindWeights = &'static [(ParticleKind, u32)];

/// Spawn attempts per tick at full intensity.
#[must_use]
pub const fn base_rate(state: AnimationState) -> f32 {
    match state {
        AnimationState::Idle => 2.0,
        AnimationState::Listening => 4.0,
        AnimationState::Conversation => 5.0,
        AnimationState::Speaking => 7.0,
    }
}

/// Inner and outer radius of the spawn ring around the center.
#[must_use]
pub const fn spawn_ring(state: AnimationState) -> (f32, f32) {
    match state {
        AnimationState::Idle => (30.0, 80.0),
        AnimationState::Listening => (40.0, 90.0),
        AnimationState::Conversation => (40.0, 100.0),
        AnimationState::Speaking => (50.0, 120.0),
    }
}

/// Eligible kinds and their weights.
#[must_use]
pub const fn kind_weights(state: AnimationState, palette: Palette) -> KindWeights {
    use ParticleKind::{Attractor, Bounce, Bubble, Normal, Physics, Pulse, Spark, Trail};

    match (palette, state) {
        (Palette::Friendly, AnimationState::Idle) => &[(Normal, 5), (Pulse, 3), (Bubble, 2)],
        (Palette::Friendly, AnimationState::Listening) => {
            &[(Pulse, 4), (Bubble, 3), (Normal, 2), (Physics, 1)]
        },
        (Palette::Friendly, AnimationState::Conversation) => {
            &[(Bubble, 3), (Physics, 2), (Pulse, 2), (Trail, 1)]
        },
        (Palette::Friendly, AnimationState::Speaking) => &[
            (Physics, 3),
            (Bounce, 2),
            (Trail, 2),
            (Spark, 2),
            (Normal, 1),
        ],
        (Palette::Dramatic, AnimationState::Idle) => {
            &[(Normal, 3), (Pulse, 3), (Spark, 2), (Trail, 2)]
        },
        (Palette::Dramatic, AnimationState::Listening) => {
            &[(Pulse, 3), (Trail, 3), (Spark, 2), (Attractor, 1)]
        },
        (Palette::Dramatic, AnimationState::Conversation) => {
            &[(Trail, 3), (Spark, 2), (Physics, 2), (Attractor, 1)]
        },
        (Palette::Dramatic, AnimationState::Speaking) => {
            &[(Spark, 4), (Trail, 3), (Physics, 2), (Attractor, 1)]
        },
    }
}

/// Colors a state's particles are drawn in.
#[must_use]
pub const fn state_colors(state: AnimationState, palette: Palette) -> &'static [Color] {
    match (palette, state) {
        (Palette::Friendly, AnimationState::Idle) => &[
            [0.55, 0.75, 1.0, 1.0],
            [0.75, 0.65, 1.0, 1.0],
            [1.0, 1.0, 1.0, 1.0],
        ],
        (Palette::Friendly, AnimationState::Listening) => &[
            [0.30, 0.60, 1.0, 1.0],
            [0.40, 0.85, 1.0, 1.0],
            [0.60, 0.70, 1.0, 1.0],
        ],
        (Palette::Friendly, AnimationState::Conversation) => &[
            [0.60, 0.50, 1.0, 1.0],
            [1.0, 0.60, 0.80, 1.0],
            [0.40, 0.85, 1.0, 1.0],
        ],
        (Palette::Friendly, AnimationState::Speaking) => &[
            [0.25, 0.90, 0.95, 1.0],
            [0.45, 1.0, 0.70, 1.0],
            [1.0, 0.85, 0.40, 1.0],
        ],
        (Palette::Dramatic, AnimationState::Idle) => &[
            [0.35, 0.20, 0.60, 1.0],
            [0.15, 0.25, 0.55, 1.0],
        ],
        (Palette::Dramatic, AnimationState::Listening) => &[
            [0.0, 0.55, 1.0, 1.0],
            [0.55, 0.0, 1.0, 1.0],
        ],
        (Palette::Dramatic, AnimationState::Conversation) => &[
            [1.0, 0.0, 0.55, 1.0],
            [0.55, 0.0, 1.0, 1.0],
            [0.0, 0.85, 1.0, 1.0],
        ],
        (Palette::Dramatic, AnimationState::Speaking) => &[
            [1.0, 0.25, 0.0, 1.0],
            [1.0, 0.75, 0.0, 1.0],
            [1.0, 1.0, 1.0, 1.0],
        ],
    }
}

/// Weighted draw from `weights`. Falls back to [`ParticleKind::Normal`] when
/// every weight is zero.
pub fn choose_kind(weights: KindWeights, rng: &mut Rng) -> ParticleKind {
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return ParticleKind::Normal;
    }
    let mut roll = rng.u32(..total);
    for &(kind, weight) in weights {
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    ParticleKind::Normal
}

/// Per-tick ambient spawner.
#[derive(Debug, Clone, Copy, Default)]
pub struct Emitter {
    palette: Palette,
}

impl Emitter {
    /// Create an emitter using `palette`.
    #[must_use]
    pub const fn new(palette: Palette) -> Self {
        Self { palette }
    }

    /// Active palette.
    #[must_use]
    pub const fn palette(&self) -> Palette {
        self.palette
    }

    /// Switch palette.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// `base_rate(state) * intensity`, with intensity clamped to `0..=1`.
    #[must_use]
    pub fn spawn_rate(state: AnimationState, intensity: f32) -> f32 {
        base_rate(state) * clamp_intensity(intensity)
    }

    /// Attempts `floor(spawn_rate)` spawns around `center`, each accepted
    /// with probability `intensity`. Accepted particles are appended to
    /// `out`; returns how many.
    pub fn emit(
        &self,
        state: AnimationState,
        intensity: f32,
        center: Vec2,
        rng: &mut Rng,
        out: &mut Vec<Particle>,
    ) -> usize {
        let intensity = clamp_intensity(intensity);
        let attempts = Self::spawn_rate(state, intensity).floor() as usize;
        let weights = kind_weights(state, self.palette);
        let colors = state_colors(state, self.palette);
        let (inner, outer) = spawn_ring(state);

        let mut spawned = 0;
        for _ in 0..attempts {
            if !rng.chance(intensity) {
                continue;
            }
            let kind = choose_kind(weights, rng);
            let color = rng.pick(colors).copied().unwrap_or([1.0; 4]);
            let direction = rng.unit_vector();
            let position = center + direction * rng.range(inner, outer);

            let mut particle = Particle::random(kind, position, color, rng);
            particle.velocity += direction * RADIAL_PUSH;
            out.push(particle);
            spawned += 1;
        }
        spawned
    }
}

fn clamp_intensity(intensity: f32) -> f32 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    }
}
