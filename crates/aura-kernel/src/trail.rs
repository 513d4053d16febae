//! Trail residue left behind by moving particles.
//!
//! Trails have no physics: they sit where they were deposited and fade out.
//! The pool is a ring with oldest-first eviction.

use std::collections::VecDeque;

use aura_common::Color;
use glam::Vec2;

/// Opacity of a freshly deposited trail.
pub const TRAIL_BASE_OPACITY: f32 = 0.7;

/// Default lifetime of a trail in seconds.
pub const TRAIL_LIFETIME: f32 = 0.5;

/// A fading mark left behind by a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trail {
    /// Position in canvas space.
    pub position: Vec2,
    /// Radius.
    pub size: f32,
    /// Color (alpha is multiplied by `opacity` when drawn).
    pub color: Color,
    /// Current opacity.
    pub opacity: f32,
    /// Remaining lifetime in seconds.
    pub lifetime: f32,
    /// Initial lifetime in seconds.
    pub max_lifetime: f32,
}

impl Trail {
    /// Creates a trail at full opacity.
    #[must_use]
    pub fn new(position: Vec2, size: f32, color: Color, lifetime: f32) -> Self {
        let lifetime = lifetime.max(f32::EPSILON);
        Self {
            position,
            size: size.max(0.0),
            color,
            opacity: TRAIL_BASE_OPACITY,
            lifetime,
            max_lifetime: lifetime,
        }
    }

    /// Whether the trail has faded out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.lifetime <= 0.0
    }

    fn age(&mut self, dt: f32) {
        self.lifetime -= dt;
        self.opacity = (self.lifetime / self.max_lifetime).max(0.0) * TRAIL_BASE_OPACITY;
    }
}

/// Bounded trail storage.
#[derive(Debug, Default)]
pub struct TrailPool {
    trails: VecDeque<Trail>,
    capacity: usize,
    evicted: u64,
}

impl TrailPool {
    /// Create a pool holding at most `capacity` trails.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            trails: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Add a trail, dropping the oldest when full.
    pub fn push(&mut self, trail: Trail) {
        if self.capacity == 0 {
            return;
        }
        while self.trails.len() >= self.capacity {
            self.trails.pop_front();
            self.evicted += 1;
        }
        self.trails.push_back(trail);
    }

    /// Age every trail by `dt` seconds and drop the expired ones.
    pub fn update(&mut self, dt: f32) {
        for trail in &mut self.trails {
            trail.age(dt);
        }
        self.trails.retain(|t| !t.is_expired());
    }

    /// Live trails, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Trail> {
        self.trails.iter()
    }

    /// Number of live trails.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    /// Maximum number of trails.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Trails dropped to make room since creation.
    #[must_use]
    pub const fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Remove all trails.
    pub fn clear(&mut self) {
        self.trails.clear();
    }
}
