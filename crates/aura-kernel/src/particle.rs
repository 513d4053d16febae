//! Particle kinds, their physical constants, and per-tick motion rules.

use aura_common::Color;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::rng::{Rng, RngExt};
use crate::trail::{Trail, TRAIL_LIFETIME};

/// Velocity multiplier per frame for pulse particles.
const PULSE_DAMPING: f32 = 0.8;
/// Pulse phase advance per frame (radians).
const PULSE_RATE: f32 = 0.2;
/// Size swing of a pulse particle relative to its original size.
const PULSE_AMPLITUDE: f32 = 0.3;
/// Velocity multiplier per frame for trail particles.
const TRAIL_GROWTH: f32 = 1.01;
/// Per-axis velocity jitter per frame for sparks.
const SPARK_JITTER: f32 = 0.3;
/// Velocity multiplier per frame for drag-affected kinds.
const DRAG: f32 = 0.99;
/// Upward acceleration per frame for bubbles.
const BUBBLE_BUOYANCY: f32 = 0.03;
/// Horizontal wobble acceleration per frame for bubbles.
const BUBBLE_WOBBLE: f32 = 0.05;
/// Velocity kept after bouncing off a canvas edge.
const EDGE_RESTITUTION: f32 = 0.8;

/// Closed set of particle behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ParticleKind {
    /// Plain drifting dot.
    #[default]
    Normal = 0,
    /// Damped dot whose size breathes.
    Pulse = 1,
    /// Accelerating streak that leaves trails.
    Trail = 2,
    /// Short jittery flash that leaves small trails.
    Spark = 3,
    /// Solid ball that collides elastically.
    Physics = 4,
    /// Heavy ball that pulls its neighbours in.
    Attractor = 5,
    /// Buoyant, wobbling ball.
    Bubble = 6,
    /// Ball that bounces off the canvas edges.
    Bounce = 7,
}

/// How a renderer should draw a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeHint {
    /// Filled circle.
    #[default]
    Circle,
    /// Outlined circle.
    Ring,
    /// Circle with a soft halo.
    Glow,
    /// Small bright star.
    Spark,
    /// Translucent circle with a highlight.
    Bubble,
    /// Filled square.
    Square,
}

/// Physical constants of a [`ParticleKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindProps {
    /// Mass used by the collision impulse.
    pub mass: f32,
    /// Collision radius as a multiple of size (0 = never collides).
    pub collision_scale: f32,
    /// Probability per frame of depositing a trail.
    pub trail_chance: f32,
    /// Pull strength of attractors.
    pub attraction_strength: Option<f32>,
    /// Lifetime range in seconds.
    pub lifetime: (f32, f32),
    /// Size range.
    pub size: (f32, f32),
    /// Initial speed range per frame.
    pub speed: (f32, f32),
    /// Drawing hint.
    pub shape: ShapeHint,
}

impl ParticleKind {
    /// All kinds.
    pub const ALL: [Self; 8] = [
        Self::Normal,
        Self::Pulse,
        Self::Trail,
        Self::Spark,
        Self::Physics,
        Self::Attractor,
        Self::Bubble,
        Self::Bounce,
    ];

    /// Parses a kind name. Unknown names fall back to [`ParticleKind::Normal`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "pulse" => Self::Pulse,
            "trail" => Self::Trail,
            "spark" => Self::Spark,
            "physics" => Self::Physics,
            "attractor" => Self::Attractor,
            "bubble" => Self::Bubble,
            "bounce" => Self::Bounce,
            _ => Self::Normal,
        }
    }

    /// Lowercase name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Pulse => "pulse",
            Self::Trail => "trail",
            Self::Spark => "spark",
            Self::Physics => "physics",
            Self::Attractor => "attractor",
            Self::Bubble => "bubble",
            Self::Bounce => "bounce",
        }
    }

    /// Constants for this kind.
    #[must_use]
    pub const fn props(self) -> KindProps {
        match self {
            Self::Normal => KindProps {
                mass: 1.0,
                collision_scale: 0.0,
                trail_chance: 0.0,
                attraction_strength: None,
                lifetime: (2.0, 4.0),
                size: (2.0, 5.0),
                speed: (0.3, 1.2),
                shape: ShapeHint::Circle,
            },
            Self::Pulse => KindProps {
                mass: 1.0,
                collision_scale: 0.0,
                trail_chance: 0.0,
                attraction_strength: None,
                lifetime: (2.0, 3.5),
                size: (3.0, 6.0),
                speed: (0.5, 1.5),
                shape: ShapeHint::Ring,
            },
            Self::Trail => KindProps {
                mass: 0.5,
                collision_scale: 0.0,
                trail_chance: 0.3,
                attraction_strength: None,
                lifetime: (1.5, 3.0),
                size: (2.0, 4.0),
                speed: (0.8, 2.0),
                shape: ShapeHint::Circle,
            },
            Self::Spark => KindProps {
                mass: 0.2,
                collision_scale: 0.0,
                trail_chance: 0.2,
                attraction_strength: None,
                lifetime: (0.4, 0.9),
                size: (1.0, 2.5),
                speed: (2.0, 4.0),
                shape: ShapeHint::Spark,
            },
            Self::Physics => KindProps {
                mass: 2.0,
                collision_scale: 1.0,
                trail_chance: 0.0,
                attraction_strength: None,
                lifetime: (3.0, 5.0),
                size: (4.0, 7.0),
                speed: (0.5, 1.5),
                shape: ShapeHint::Circle,
            },
            Self::Attractor => KindProps {
                mass: 5.0,
                collision_scale: 1.5,
                trail_chance: 0.0,
                attraction_strength: Some(0.3),
                lifetime: (3.0, 5.0),
                size: (5.0, 8.0),
                speed: (0.1, 0.4),
                shape: ShapeHint::Glow,
            },
            Self::Bubble => KindProps {
                mass: 0.8,
                collision_scale: 1.0,
                trail_chance: 0.0,
                attraction_strength: None,
                lifetime: (3.0, 5.0),
                size: (4.0, 8.0),
                speed: (0.2, 0.8),
                shape: ShapeHint::Bubble,
            },
            Self::Bounce => KindProps {
                mass: 1.5,
                collision_scale: 1.0,
                trail_chance: 0.0,
                attraction_strength: None,
                lifetime: (3.0, 6.0),
                size: (3.0, 6.0),
                speed: (1.5, 3.0),
                shape: ShapeHint::Square,
            },
        }
    }
}

/// A single live particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Position in canvas space.
    pub position: Vec2,
    /// Velocity in canvas units per reference frame.
    pub velocity: Vec2,
    /// Pending acceleration, consumed and cleared on the next step.
    pub acceleration: Vec2,
    /// Current radius.
    pub size: f32,
    /// Radius at spawn.
    pub original_size: f32,
    /// Remaining lifetime in seconds.
    pub lifetime: f32,
    /// Lifetime at spawn in seconds.
    pub max_lifetime: f32,
    /// Current opacity (0-1).
    pub opacity: f32,
    /// Color.
    pub color: Color,
    /// Behaviour.
    pub kind: ParticleKind,
    /// Mass for collision impulses.
    pub mass: f32,
    /// Collision radius (0 = not collidable).
    pub collision_radius: f32,
    /// Oscillator phase for pulse and bubble motion.
    pub pulse_phase: f32,
    /// Probability per frame of depositing a trail.
    pub trail_chance: f32,
    /// Pull strength when this is an attractor.
    pub attraction_strength: Option<f32>,
    /// Cleared when the particle is marked for removal.
    pub active: bool,
}

impl Particle {
    /// Creates a particle with the constants of `kind`.
    #[must_use]
    pub fn new(
        kind: ParticleKind,
        position: Vec2,
        velocity: Vec2,
        size: f32,
        lifetime: f32,
        color: Color,
    ) -> Self {
        let props = kind.props();
        let size = size.max(0.1);
        let lifetime = lifetime.max(f32::EPSILON);
        Self {
            position,
            velocity,
            acceleration: Vec2::ZERO,
            size,
            original_size: size,
            lifetime,
            max_lifetime: lifetime,
            opacity: 1.0,
            color,
            kind,
            mass: props.mass,
            collision_radius: size * props.collision_scale,
            pulse_phase: 0.0,
            trail_chance: props.trail_chance,
            attraction_strength: props.attraction_strength,
            active: true,
        }
    }

    /// Creates a particle with size, lifetime, heading and speed drawn from
    /// the ranges of `kind`.
    #[must_use]
    pub fn random(kind: ParticleKind, position: Vec2, color: Color, rng: &mut Rng) -> Self {
        let props = kind.props();
        let size = rng.range(props.size.0, props.size.1);
        let lifetime = rng.range(props.lifetime.0, props.lifetime.1);
        let speed = rng.range(props.speed.0, props.speed.1);
        let velocity = rng.unit_vector() * speed;
        let mut particle = Self::new(kind, position, velocity, size, lifetime, color);
        particle.pulse_phase = rng.range(0.0, std::f32::consts::TAU);
        particle
    }

    /// Overrides remaining and maximum lifetime.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: f32, max_lifetime: f32) -> Self {
        self.max_lifetime = max_lifetime.max(f32::EPSILON);
        self.lifetime = lifetime.min(self.max_lifetime);
        self
    }

    /// Overrides the attraction strength.
    #[must_use]
    pub const fn with_attraction(mut self, strength: f32) -> Self {
        self.attraction_strength = Some(strength);
        self
    }

    /// Remaining fraction of lifetime, used for eviction and fading.
    #[must_use]
    pub fn life_ratio(&self) -> f32 {
        if self.max_lifetime > 0.0 {
            (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Takes part in collision and attraction.
    #[must_use]
    pub fn is_collidable(&self) -> bool {
        self.collision_radius > 0.0
    }

    /// Pulls other collidable particles toward itself.
    #[must_use]
    pub fn is_attractor(&self) -> bool {
        self.kind == ParticleKind::Attractor
    }

    /// Outside the canvas expanded by `margin` on every side.
    #[must_use]
    pub fn is_out_of_bounds(&self, width: f32, height: f32, margin: f32) -> bool {
        self.position.x < -margin
            || self.position.x > width + margin
            || self.position.y < -margin
            || self.position.y > height + margin
    }

    /// Queues an acceleration for the next step.
    pub fn accelerate(&mut self, acceleration: Vec2) {
        self.acceleration += acceleration;
    }

    /// Drawing hint for this particle.
    #[must_use]
    pub const fn shape(&self) -> ShapeHint {
        self.kind.props().shape
    }

    /// Advances one step of `dt` seconds (`frames` reference frames).
    ///
    /// Applies the ambient `flow` force, consumes pending acceleration, runs
    /// the kind's motion rule and burns lifetime. Returns a trail to deposit,
    /// if the kind left one this step.
    pub fn step(
        &mut self,
        dt: f32,
        frames: f32,
        flow: Vec2,
        canvas: Vec2,
        rng: &mut Rng,
    ) -> Option<Trail> {
        self.velocity += flow * frames;
        self.velocity += self.acceleration * frames;
        self.acceleration = Vec2::ZERO;

        let mut deposit = None;
        match self.kind {
            ParticleKind::Normal => {
                self.position += self.velocity * frames;
            },
            ParticleKind::Pulse => {
                self.velocity *= PULSE_DAMPING.powf(frames);
                self.position += self.velocity * frames;
                self.pulse_phase += PULSE_RATE * frames;
                self.size =
                    self.original_size * (1.0 + PULSE_AMPLITUDE * self.pulse_phase.sin());
            },
            ParticleKind::Trail => {
                self.velocity *= TRAIL_GROWTH.powf(frames);
                self.position += self.velocity * frames;
                if rng.chance(self.trail_chance) {
                    deposit = Some(self.trail(self.size * 0.5));
                }
            },
            ParticleKind::Spark => {
                let jitter = Vec2::new(
                    rng.range(-SPARK_JITTER, SPARK_JITTER),
                    rng.range(-SPARK_JITTER, SPARK_JITTER),
                );
                self.velocity += jitter * frames;
                self.position += self.velocity * frames;
                if rng.chance(self.trail_chance) {
                    deposit = Some(self.trail(self.size * 0.3));
                }
            },
            ParticleKind::Physics | ParticleKind::Attractor => {
                self.position += self.velocity * frames;
                self.velocity *= DRAG.powf(frames);
            },
            ParticleKind::Bubble => {
                self.pulse_phase += PULSE_RATE * frames;
                self.velocity.y -= BUBBLE_BUOYANCY * frames;
                self.velocity.x += self.pulse_phase.sin() * BUBBLE_WOBBLE * frames;
                self.position += self.velocity * frames;
                self.velocity *= DRAG.powf(frames);
            },
            ParticleKind::Bounce => {
                self.position += self.velocity * frames;
                self.bounce_off_edges(canvas);
            },
        }

        self.lifetime -= dt;
        self.opacity = self.life_ratio();

        if !(self.position.is_finite() && self.velocity.is_finite()) {
            self.active = false;
        }
        deposit
    }

    fn trail(&self, size: f32) -> Trail {
        Trail::new(self.position, size, self.color, TRAIL_LIFETIME)
    }

    fn bounce_off_edges(&mut self, canvas: Vec2) {
        let r = self.size.min(canvas.x * 0.5).min(canvas.y * 0.5);
        if self.position.x < r {
            self.position.x = r;
            self.velocity.x = self.velocity.x.abs() * EDGE_RESTITUTION;
        } else if self.position.x > canvas.x - r {
            self.position.x = canvas.x - r;
            self.velocity.x = -self.velocity.x.abs() * EDGE_RESTITUTION;
        }
        if self.position.y < r {
            self.position.y = r;
            self.velocity.y = self.velocity.y.abs() * EDGE_RESTITUTION;
        } else if self.position.y > canvas.y - r {
            self.position.y = canvas.y - r;
            self.velocity.y = -self.velocity.y.abs() * EDGE_RESTITUTION;
        }
    }
}
