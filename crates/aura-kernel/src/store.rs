//! Bounded particle storage.
//!
//! The store never grows past its capacity. When full, a new particle
//! overwrites the one closest to the end of its life. Removal is two-phase:
//! the update marks particles inactive, then [`ParticleStore::compact`] drops
//! them in one ordered pass.

use crate::particle::Particle;

/// Owner of every live particle.
#[derive(Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    capacity: usize,
    evicted: u64,
}

impl ParticleStore {
    /// Create a store holding at most `capacity` particles.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    /// Insert a particle, evicting the stalest one when full.
    ///
    /// Returns the slot the particle landed in, or `None` when the store has
    /// zero capacity.
    pub fn spawn(&mut self, particle: Particle) -> Option<usize> {
        if self.capacity == 0 {
            return None;
        }
        if self.particles.len() < self.capacity {
            self.particles.push(particle);
            return Some(self.particles.len() - 1);
        }

        let slot = self.stalest()?;
        self.particles[slot] = particle;
        self.evicted += 1;
        Some(slot)
    }

    /// Index of the particle with the lowest remaining life ratio. Ties go to
    /// the earliest slot.
    fn stalest(&self) -> Option<usize> {
        self.particles
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.life_ratio().total_cmp(&b.life_ratio()))
            .map(|(i, _)| i)
    }

    /// Drop every inactive particle, keeping survivors in order. Returns how
    /// many were removed.
    pub fn compact(&mut self) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| p.active);
        before - self.particles.len()
    }

    /// Live particles.
    #[must_use]
    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    /// Live particles, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Number of live particles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Maximum number of particles.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Particles overwritten by eviction since creation.
    #[must_use]
    pub const fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Remove all particles.
    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::ParticleKind;
    use aura_common::colors;
    use glam::Vec2;

    fn particle(lifetime: f32) -> Particle {
        Particle::new(
            ParticleKind::Normal,
            Vec2::ZERO,
            Vec2::ZERO,
            3.0,
            1.0,
            colors::WHITE,
        )
        .with_lifetime(lifetime, 1.0)
    }

    #[test]
    fn test_fills_to_capacity() {
        let mut store = ParticleStore::with_capacity(3);
        assert_eq!(store.spawn(particle(0.5)), Some(0));
        assert_eq!(store.spawn(particle(0.5)), Some(1));
        assert_eq!(store.spawn(particle(0.5)), Some(2));
        assert_eq!(store.len(), 3);
        assert_eq!(store.evicted(), 0);
    }

    #[test]
    fn test_evicts_lowest_life_ratio() {
        let mut store = ParticleStore::with_capacity(5);
        for lifetime in [0.1, 0.2, 0.3, 0.4, 0.5, 0.6] {
            store.spawn(particle(lifetime));
        }

        assert_eq!(store.len(), 5);
        assert_eq!(store.evicted(), 1);
        let lifetimes: Vec<f32> = store.as_slice().iter().map(|p| p.lifetime).collect();
        assert_eq!(lifetimes, vec![0.6, 0.2, 0.3, 0.4, 0.5]);
    }

    #[test]
    fn test_eviction_tie_takes_first_slot() {
        let mut store = ParticleStore::with_capacity(2);
        store.spawn(particle(0.5));
        store.spawn(particle(0.5));
        assert_eq!(store.spawn(particle(0.9)), Some(0));
    }

    #[test]
    fn test_compact_preserves_order() {
        let mut store = ParticleStore::with_capacity(5);
        for lifetime in [0.1, 0.2, 0.3, 0.4, 0.5] {
            store.spawn(particle(lifetime));
        }
        store.as_mut_slice()[1].active = false;
        store.as_mut_slice()[3].active = false;

        assert_eq!(store.compact(), 2);
        let lifetimes: Vec<f32> = store.as_slice().iter().map(|p| p.lifetime).collect();
        assert_eq!(lifetimes, vec![0.1, 0.3, 0.5]);
    }

    #[test]
    fn test_zero_capacity() {
        let mut store = ParticleStore::with_capacity(0);
        assert_eq!(store.spawn(particle(1.0)), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = ParticleStore::with_capacity(2);
        store.spawn(particle(1.0));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 2);
    }
}
