//! One-shot bursts triggered by notable events.
//!
//! A reaction tag maps to a fixed burst recipe. Free-form keywords are
//! matched by substring onto the same recipes, except "speaking", which
//! plants an attractor and a ring of particles for it to pull in.

use aura_common::{colors, Color};
use glam::Vec2;

use crate::emoji::Glyph;
use crate::particle::{Particle, ParticleKind};
use crate::rng::{Rng, RngExt};

/// Upward velocity added to every burst particle.
pub const UPWARD_BIAS: f32 = 1.0;
/// Radius of the cloud burst particles start in.
pub const BURST_RADIUS: f32 = 15.0;
/// Pull strength of the attractor planted by a speaking burst.
pub const SPEAKING_ATTRACTION: f32 = 0.5;
/// Lifetime of the speaking attractor in seconds.
const SPEAKING_ATTRACTOR_LIFETIME: f32 = 4.0;

/// Semantic event tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReactionTag {
    /// Something worked.
    Success,
    /// Something failed.
    Error,
    /// Work in progress.
    Thinking,
    /// The assistant told a joke.
    Joke,
    /// Started listening.
    Listening,
    /// Started speaking.
    Speaking,
    /// Hello / goodbye.
    Greeting,
    /// Big win.
    Celebrate,
    /// Anything unrecognised.
    #[default]
    Default,
}

/// Recipe for a burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstSpec {
    /// Kind of every particle in the burst.
    pub kind: ParticleKind,
    /// Inclusive particle count range.
    pub count: (usize, usize),
    /// Initial speed range per frame.
    pub speed: (f32, f32),
    /// Color used when the caller gives none.
    pub color: Color,
    /// Glyphs that may accompany the burst.
    pub glyphs: &'static [Glyph],
}

impl ReactionTag {
    /// Parses a tag case-insensitively. Unknown tags become
    /// [`ReactionTag::Default`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "error" => Self::Error,
            "thinking" => Self::Thinking,
            "joke" => Self::Joke,
            "listening" => Self::Listening,
            "speaking" => Self::Speaking,
            "greeting" => Self::Greeting,
            "celebrate" => Self::Celebrate,
            _ => Self::Default,
        }
    }

    /// Burst recipe for this tag.
    #[must_use]
    pub const fn burst(self) -> BurstSpec {
        match self {
            Self::Success => BurstSpec {
                kind: ParticleKind::Trail,
                count: (15, 25),
                speed: (2.0, 4.0),
                color: colors::SUCCESS_GREEN,
                glyphs: &[Glyph::Check, Glyph::Sparkle],
            },
            Self::Error => BurstSpec {
                kind: ParticleKind::Spark,
                count: (10, 15),
                speed: (2.0, 5.0),
                color: colors::ERROR_RED,
                glyphs: &[Glyph::Cross],
            },
            Self::Thinking => BurstSpec {
                kind: ParticleKind::Bubble,
                count: (8, 12),
                speed: (0.5, 1.5),
                color: colors::THINKING_PURPLE,
                glyphs: &[Glyph::Thought],
            },
            Self::Joke => BurstSpec {
                kind: ParticleKind::Bounce,
                count: (12, 20),
                speed: (2.0, 4.0),
                color: colors::JOKE_YELLOW,
                glyphs: &[Glyph::Laugh],
            },
            Self::Listening => BurstSpec {
                kind: ParticleKind::Pulse,
                count: (6, 10),
                speed: (0.5, 1.5),
                color: colors::LISTENING_BLUE,
                glyphs: &[Glyph::Ear],
            },
            Self::Speaking => BurstSpec {
                kind: ParticleKind::Trail,
                count: (10, 16),
                speed: (1.5, 3.0),
                color: colors::SPEAKING_CYAN,
                glyphs: &[Glyph::Speech, Glyph::Music],
            },
            Self::Greeting => BurstSpec {
                kind: ParticleKind::Bubble,
                count: (10, 14),
                speed: (1.0, 2.0),
                color: colors::GREETING_PINK,
                glyphs: &[Glyph::Wave, Glyph::Heart],
            },
            Self::Celebrate => BurstSpec {
                kind: ParticleKind::Spark,
                count: (20, 30),
                speed: (3.0, 6.0),
                color: colors::CELEBRATE_GOLD,
                glyphs: &[Glyph::Party, Glyph::Star],
            },
            Self::Default => BurstSpec {
                kind: ParticleKind::Normal,
                count: (8, 12),
                speed: (1.0, 2.5),
                color: colors::WHITE,
                glyphs: &[Glyph::Sparkle],
            },
        }
    }
}

/// Keyword families recognised by [`keyword_burst`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    /// error, warning, fail...
    Error,
    /// success, complete, done...
    Success,
    /// processing, thinking, loading...
    Thinking,
    /// listening, hearing.
    Listening,
    /// speaking, talking, saying.
    Speaking,
}

const KEYWORDS: &[(KeywordCategory, &[&str])] = &[
    (
        KeywordCategory::Error,
        &["error", "warning", "fail", "problem"],
    ),
    (
        KeywordCategory::Success,
        &["success", "complete", "done", "finished"],
    ),
    (
        KeywordCategory::Thinking,
        &["processing", "thinking", "loading", "searching"],
    ),
    (KeywordCategory::Listening, &["listening", "hearing"]),
    (KeywordCategory::Speaking, &["speaking", "talking", "saying"]),
];

impl KeywordCategory {
    /// First category with a pattern contained in `keyword`
    /// (case-insensitive).
    #[must_use]
    pub fn classify(keyword: &str) -> Option<Self> {
        let keyword = keyword.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| keyword.contains(p)))
            .map(|(category, _)| *category)
    }

    /// Reaction tag whose recipe this category uses.
    #[must_use]
    pub const fn tag(self) -> ReactionTag {
        match self {
            Self::Error => ReactionTag::Error,
            Self::Success => ReactionTag::Success,
            Self::Thinking => ReactionTag::Thinking,
            Self::Listening => ReactionTag::Listening,
            Self::Speaking => ReactionTag::Speaking,
        }
    }
}

/// Spawns `spec` around `origin` into `out`. Returns the particle count.
pub fn burst(
    spec: &BurstSpec,
    origin: Vec2,
    color: Color,
    rng: &mut Rng,
    out: &mut Vec<Particle>,
) -> usize {
    let (min, max) = (spec.count.0, spec.count.1.max(spec.count.0));
    let count = rng.usize(min..=max);
    for _ in 0..count {
        let offset = rng.unit_vector() * rng.range(0.0, BURST_RADIUS);
        let mut particle = Particle::random(spec.kind, origin + offset, color, rng);
        let speed = rng.range(spec.speed.0, spec.speed.1);
        particle.velocity = rng.unit_vector() * speed - Vec2::new(0.0, UPWARD_BIAS);
        out.push(particle);
    }
    count
}

/// Spawns the burst for `tag` in `color`, or the tag's own color.
pub fn reaction(
    tag: ReactionTag,
    origin: Vec2,
    color: Option<Color>,
    rng: &mut Rng,
    out: &mut Vec<Particle>,
) -> usize {
    let spec = tag.burst();
    burst(&spec, origin, color.unwrap_or(spec.color), rng, out)
}

/// Spawns the burst matching `keyword`. Returns the tag whose recipe was
/// used and the particle count.
pub fn keyword_burst(
    keyword: &str,
    origin: Vec2,
    rng: &mut Rng,
    out: &mut Vec<Particle>,
) -> (ReactionTag, usize) {
    match KeywordCategory::classify(keyword) {
        Some(KeywordCategory::Speaking) => {
            (ReactionTag::Speaking, speaking_burst(origin, rng, out))
        },
        Some(category) => {
            let tag = category.tag();
            (tag, reaction(tag, origin, None, rng, out))
        },
        None => (
            ReactionTag::Default,
            reaction(ReactionTag::Default, origin, None, rng, out),
        ),
    }
}

/// One attractor at `origin` plus collidable particles close enough to be
/// pulled toward it.
fn speaking_burst(origin: Vec2, rng: &mut Rng, out: &mut Vec<Particle>) -> usize {
    let color = colors::SPEAKING_CYAN;
    let props = ParticleKind::Attractor.props();
    let size = rng.range(props.size.0, props.size.1);
    out.push(
        Particle::new(
            ParticleKind::Attractor,
            origin,
            Vec2::ZERO,
            size,
            SPEAKING_ATTRACTOR_LIFETIME,
            color,
        )
        .with_attraction(SPEAKING_ATTRACTION),
    );

    let count = rng.usize(8..=12);
    for _ in 0..count {
        let direction = rng.unit_vector();
        let position = origin + direction * rng.range(6.0, 14.0);
        let mut particle = Particle::random(ParticleKind::Physics, position, color, rng);
        // Tangential start so the pull curls them around the attractor.
        particle.velocity = direction.perp() * rng.range(1.0, 2.5);
        out.push(particle);
    }
    count + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn test_tag_parsing() {
        assert_eq!(ReactionTag::from_name("ERROR"), ReactionTag::Error);
        assert_eq!(ReactionTag::from_name("celebrate"), ReactionTag::Celebrate);
        assert_eq!(ReactionTag::from_name("???"), ReactionTag::Default);
        assert_eq!(ReactionTag::Default.burst().kind, ParticleKind::Normal);
    }

    #[test]
    fn test_error_reaction_uses_error_color_and_range() {
        let mut rng = seeded(Some(3));
        for _ in 0..50 {
            let mut out = Vec::new();
            let origin = Vec2::new(100.0, 100.0);
            let n = reaction(ReactionTag::Error, origin, None, &mut rng, &mut out);
            assert!((10..=15).contains(&n));
            assert_eq!(out.len(), n);
            assert!(out.iter().all(|p| p.color == colors::ERROR_RED));
        }
    }

    #[test]
    fn test_explicit_color_overrides() {
        let mut rng = seeded(Some(3));
        let mut out = Vec::new();
        reaction(
            ReactionTag::Success,
            Vec2::ZERO,
            Some(colors::WHITE),
            &mut rng,
            &mut out,
        );
        assert!(out.iter().all(|p| p.color == colors::WHITE));
    }

    #[test]
    fn test_burst_is_clustered_and_biased_up() {
        let mut rng = seeded(Some(12));
        let origin = Vec2::new(50.0, 50.0);
        let mut out = Vec::new();
        for _ in 0..20 {
            reaction(ReactionTag::Celebrate, origin, None, &mut rng, &mut out);
        }
        for p in &out {
            assert!(p.position.distance(origin) <= BURST_RADIUS + 1e-3);
        }
        let mean_vy: f32 = out.iter().map(|p| p.velocity.y).sum::<f32>() / out.len() as f32;
        assert!(mean_vy < -0.5);
    }

    #[test]
    fn test_keyword_classification() {
        assert_eq!(
            KeywordCategory::classify("Fatal ERROR occurred"),
            Some(KeywordCategory::Error)
        );
        assert_eq!(
            KeywordCategory::classify("task completed"),
            Some(KeywordCategory::Success)
        );
        assert_eq!(
            KeywordCategory::classify("still processing"),
            Some(KeywordCategory::Thinking)
        );
        assert_eq!(
            KeywordCategory::classify("now talking"),
            Some(KeywordCategory::Speaking)
        );
        assert_eq!(KeywordCategory::classify("banana"), None);
    }

    #[test]
    fn test_keyword_burst_falls_back() {
        let mut rng = seeded(Some(3));
        let mut out = Vec::new();
        let (tag, n) = keyword_burst("banana", Vec2::ZERO, &mut rng, &mut out);
        assert_eq!(tag, ReactionTag::Default);
        assert!(n >= 8);
        assert!(out.iter().all(|p| p.kind == ParticleKind::Normal));
    }

    #[test]
    fn test_speaking_keyword_plants_attractor() {
        let mut rng = seeded(Some(3));
        let mut out = Vec::new();
        let origin = Vec2::new(200.0, 200.0);
        let (tag, n) = keyword_burst("speaking", origin, &mut rng, &mut out);
        assert_eq!(tag, ReactionTag::Speaking);
        assert_eq!(out.len(), n);

        let attractors: Vec<&Particle> = out.iter().filter(|p| p.is_attractor()).collect();
        assert_eq!(attractors.len(), 1);
        assert_eq!(attractors[0].position, Vec2::new(200.0, 200.0));
        assert_eq!(attractors[0].attraction_strength, Some(SPEAKING_ATTRACTION));

        let followers = out.iter().filter(|p| !p.is_attractor());
        for p in followers {
            assert!(p.is_collidable());
            assert!(p.position.distance(Vec2::new(200.0, 200.0)) <= 14.0 + 1e-3);
        }
    }
}
