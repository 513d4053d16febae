//! Spatial hash grid and pairwise interaction resolution.
//!
//! ## Overview
//!
//! Each tick the grid is rebuilt from scratch. A collidable particle is
//! indexed into its home cell and into every neighbouring cell whose nearest
//! point lies within its collision radius, so pairs straddling a cell
//! boundary still meet in at least one bucket. Pairs are then resolved once
//! per tick:
//! - Attraction when either particle is an attractor
//! - Elastic impulse plus positional separation otherwise

use ahash::{AHashMap, AHashSet};
use glam::Vec2;

use crate::particle::{Particle, ParticleKind};
use crate::rng::{Rng, RngExt};
use crate::trail::{Trail, TrailPool, TRAIL_LIFETIME};

/// Default spatial hash cell size.
pub const DEFAULT_CELL_SIZE: f32 = 20.0;

/// Coefficient of restitution for elastic collisions.
pub const RESTITUTION: f32 = 0.8;

/// Lower bound of the attraction denominator.
pub const MIN_ATTRACTION_DENOMINATOR: f32 = 0.1;

/// Pull strength used when an attractor carries none.
const DEFAULT_ATTRACTION: f32 = 0.3;
/// Chance an attracted particle leaves a trail.
const ATTRACTION_TRAIL_CHANCE: f32 = 0.1;
/// Chance a collision throws sparks.
const SPARK_CHANCE: f32 = 0.3;
/// Sparks thrown per contact.
const SPARKS_PER_CONTACT: usize = 3;

/// Integer cell coordinate.
pub type CellKey = (i32, i32);

/// Per-tick spatial hash of collidable particle indices.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: AHashMap<CellKey, Vec<usize>>,
}

impl SpatialGrid {
    /// Create an empty grid.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            cells: AHashMap::new(),
        }
    }

    /// Cell containing `position`.
    #[must_use]
    pub fn cell_of(&self, position: Vec2) -> CellKey {
        // `as` saturates and maps NaN to 0.
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Rebuild from `particles`. Particles with `collision_radius == 0` or a
    /// non-finite position are left out.
    pub fn build(&mut self, particles: &[Particle]) {
        self.cells.clear();
        for (index, particle) in particles.iter().enumerate() {
            if particle.is_collidable() && particle.position.is_finite() {
                self.insert(index, particle.position, particle.collision_radius);
            }
        }
    }

    fn insert(&mut self, index: usize, position: Vec2, radius: f32) {
        let home = self.cell_of(position);
        self.cells.entry(home).or_default().push(index);

        let x0 = home.0 as f32 * self.cell_size;
        let y0 = home.1 as f32 * self.cell_size;
        let x1 = x0 + self.cell_size;
        let y1 = y0 + self.cell_size;
        let radius_sq = radius * radius;

        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let gap_x = match dx {
                    -1 => position.x - x0,
                    1 => x1 - position.x,
                    _ => 0.0,
                };
                let gap_y = match dy {
                    -1 => position.y - y0,
                    1 => y1 - position.y,
                    _ => 0.0,
                };
                if gap_x * gap_x + gap_y * gap_y < radius_sq {
                    let key = (home.0.saturating_add(dx), home.1.saturating_add(dy));
                    self.cells.entry(key).or_default().push(index);
                }
            }
        }
    }

    /// Indices stored in a cell.
    #[must_use]
    pub fn bucket(&self, key: CellKey) -> Option<&[usize]> {
        self.cells.get(&key).map(Vec::as_slice)
    }

    /// Whether a particle index appears in any bucket.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.cells.values().any(|bucket| bucket.contains(&index))
    }

    /// Occupied cells in ascending key order.
    #[must_use]
    pub fn sorted_keys(&self) -> Vec<CellKey> {
        let mut keys: Vec<CellKey> = self.cells.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Counters from one collision pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    /// Unique pairs examined.
    pub pairs_tested: usize,
    /// Elastic collisions resolved.
    pub collisions: usize,
    /// Attraction pulls applied.
    pub attractions: usize,
}

/// Collision pass state, reused across ticks to keep allocations warm.
#[derive(Debug, Default)]
pub struct CollisionSystem {
    grid: SpatialGrid,
    visited: AHashSet<(usize, usize)>,
}

impl CollisionSystem {
    /// Create a collision system with the given cell size.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        Self {
            grid: SpatialGrid::new(cell_size),
            visited: AHashSet::new(),
        }
    }

    /// Grid from the most recent pass.
    #[must_use]
    pub const fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Rebuild the grid and resolve every nearby pair once.
    ///
    /// Trails from attraction go straight into `trails`; sparks from
    /// collisions are appended to `sparks` for the caller to spawn.
    pub fn resolve(
        &mut self,
        particles: &mut [Particle],
        rng: &mut Rng,
        trails: &mut TrailPool,
        sparks: &mut Vec<Particle>,
    ) -> CollisionOutcome {
        self.grid.build(particles);
        self.visited.clear();

        let mut outcome = CollisionOutcome::default();
        for key in self.grid.sorted_keys() {
            let Some(bucket) = self.grid.bucket(key) else {
                continue;
            };
            if bucket.len() < 2 {
                continue;
            }
            for (n, &i) in bucket.iter().enumerate() {
                for &j in &bucket[n + 1..] {
                    if i == j || !self.visited.insert((i.min(j), i.max(j))) {
                        continue;
                    }
                    outcome.pairs_tested += 1;
                    resolve_pair(particles, i, j, rng, trails, sparks, &mut outcome);
                }
            }
        }
        outcome
    }
}

fn resolve_pair(
    particles: &mut [Particle],
    i: usize,
    j: usize,
    rng: &mut Rng,
    trails: &mut TrailPool,
    sparks: &mut Vec<Particle>,
    outcome: &mut CollisionOutcome,
) {
    let (mut a, mut b) = (particles[i], particles[j]);
    let delta = b.position - a.position;
    let distance = delta.length();
    if !(distance > 0.0 && distance.is_finite()) {
        return;
    }

    if a.is_attractor() || b.is_attractor() {
        if a.is_attractor() {
            pull_toward(&a, &mut b, distance, rng, trails);
            outcome.attractions += 1;
        }
        if b.is_attractor() {
            pull_toward(&b, &mut a, distance, rng, trails);
            outcome.attractions += 1;
        }
        particles[i] = a;
        particles[j] = b;
        return;
    }

    let min_distance = a.collision_radius + b.collision_radius;
    if distance >= min_distance {
        return;
    }

    let normal = delta / distance;
    let approach = (b.velocity - a.velocity).dot(normal);
    if approach > 0.0 {
        return;
    }

    let inv_a = inverse_mass(a.mass);
    let inv_b = inverse_mass(b.mass);
    let inv_sum = inv_a + inv_b;
    if inv_sum > 0.0 {
        let impulse = -(1.0 + RESTITUTION) * approach / inv_sum;
        a.velocity -= normal * (impulse * inv_a);
        b.velocity += normal * (impulse * inv_b);
    }

    let correction = normal * ((min_distance - distance) * 0.5);
    a.position -= correction;
    b.position += correction;
    outcome.collisions += 1;

    if rng.chance(SPARK_CHANCE) {
        let contact = a.position + normal * a.collision_radius;
        for _ in 0..SPARKS_PER_CONTACT {
            sparks.push(Particle::random(ParticleKind::Spark, contact, a.color, rng));
        }
    }

    particles[i] = a;
    particles[j] = b;
}

fn pull_toward(
    attractor: &Particle,
    target: &mut Particle,
    distance: f32,
    rng: &mut Rng,
    trails: &mut TrailPool,
) {
    let direction = (attractor.position - target.position) / distance;
    let strength = attractor.attraction_strength.unwrap_or(DEFAULT_ATTRACTION);
    let force = strength / (distance * 0.1).max(MIN_ATTRACTION_DENOMINATOR);
    target.accelerate(direction * force);

    if rng.chance(ATTRACTION_TRAIL_CHANCE) {
        trails.push(Trail::new(
            target.position,
            target.size * 0.5,
            target.color,
            TRAIL_LIFETIME,
        ));
    }
}

fn inverse_mass(mass: f32) -> f32 {
    if mass > 0.0 && mass.is_finite() {
        1.0 / mass
    } else {
        0.0
    }
}
