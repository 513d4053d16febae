//! Seedable random source shared by every subsystem.
//!
//! The engine owns exactly one [`Rng`] and lends it out per call, so a fixed
//! seed reproduces a whole run.

use glam::Vec2;

pub use fastrand::Rng;

/// Creates the engine's random source, deterministic when `seed` is set.
#[must_use]
pub fn seeded(seed: Option<u64>) -> Rng {
    match seed {
        Some(seed) => Rng::with_seed(seed),
        None => Rng::new(),
    }
}

/// Float helpers on top of [`fastrand::Rng`].
pub trait RngExt {
    /// Uniform value in `[min, max)`. Returns `min` for an empty range.
    fn range(&mut self, min: f32, max: f32) -> f32;

    /// `true` with probability `p` (clamped to `0..=1`).
    fn chance(&mut self, p: f32) -> bool;

    /// Random direction of length 1.
    fn unit_vector(&mut self) -> Vec2;

    /// Uniform pick from a slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>;
}

impl RngExt for Rng {
    fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + self.f32() * (max - min)
    }

    fn chance(&mut self, p: f32) -> bool {
        if p <= 0.0 || p.is_nan() {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.f32() < p
    }

    fn unit_vector(&mut self) -> Vec2 {
        let angle = self.f32() * std::f32::consts::TAU;
        Vec2::new(angle.cos(), angle.sin())
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            items.get(self.usize(..items.len()))
        }
    }
}
