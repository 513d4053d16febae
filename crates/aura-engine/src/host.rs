//! Headless driver loop.
//!
//! Plays the collaborators the particle engine expects: a session controller
//! cycling through animation states, an intensity smoother, and command
//! handling that pushes reaction events. Reports statistics once per
//! simulated second and can dump the final frame as JSON.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use aura_common::{parse_hex_color, AnimationState, AuraError, AuraResult, Vec2};
use aura_kernel::{
    EmojiOverlay, EngineStats, ParticleEngine, ReactionTag, Sprite, REFERENCE_FPS,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, HostConfig};
use crate::timing::FrameTiming;

/// Target intensity held during each scripted state.
const TIMELINE: [(AnimationState, f32); 4] = [
    (AnimationState::Idle, 0.3),
    (AnimationState::Listening, 0.6),
    (AnimationState::Speaking, 1.0),
    (AnimationState::Conversation, 0.7),
];

/// Event pushed by the scripted command handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptedEvent {
    Reaction {
        tag: &'static str,
        color: Option<&'static str>,
    },
    Keyword(&'static str),
}

const SCRIPT: [ScriptedEvent; 7] = [
    ScriptedEvent::Reaction {
        tag: "greeting",
        color: None,
    },
    ScriptedEvent::Keyword("thinking about it"),
    ScriptedEvent::Reaction {
        tag: "success",
        color: None,
    },
    ScriptedEvent::Keyword("speaking"),
    ScriptedEvent::Reaction {
        tag: "joke",
        color: Some("#ffb347"),
    },
    ScriptedEvent::Keyword("error: file not found"),
    ScriptedEvent::Reaction {
        tag: "celebrate",
        color: None,
    },
];

/// Exponential smoother for the animation intensity.
#[derive(Debug, Clone, Copy)]
pub struct IntensitySmoother {
    value: f32,
    factor: f32,
}

impl IntensitySmoother {
    /// `factor` is the fraction of the gap closed per reference frame.
    #[must_use]
    pub fn new(factor: f32) -> Self {
        Self {
            value: 0.0,
            factor: factor.clamp(0.0, 1.0),
        }
    }

    /// Move toward `target` over `frames` reference frames.
    pub fn update(&mut self, target: f32, frames: f32) -> f32 {
        let target = target.clamp(0.0, 1.0);
        let keep = (1.0 - self.factor).powf(frames.max(0.0));
        self.value = (target + (self.value - target) * keep).clamp(0.0, 1.0);
        self.value
    }

    /// Current intensity.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }
}

/// Scripted session controller cycling through every animation state.
#[derive(Debug, Clone, Copy)]
pub struct StateTimeline {
    period: f32,
}

impl StateTimeline {
    /// Spend `period` seconds in each state.
    #[must_use]
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(0.1),
        }
    }

    /// State and target intensity at `time` seconds.
    #[must_use]
    pub fn at(&self, time: f32) -> (AnimationState, f32) {
        let slot = (time.max(0.0) / self.period).floor() as usize % TIMELINE.len();
        TIMELINE[slot]
    }
}

/// Outcome of a complete run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    /// Final engine counters.
    pub stats: EngineStats,
    /// Most particles alive at once.
    pub peak_particles: usize,
    /// Scripted events fired.
    pub events: usize,
}

#[derive(Serialize)]
struct SnapshotDump<'a> {
    state: AnimationState,
    intensity: f32,
    stats: EngineStats,
    sprites: Vec<Sprite>,
    emojis: Vec<&'a EmojiOverlay>,
}

/// Owns the engine and its scripted collaborators.
#[derive(Debug)]
pub struct Host {
    config: HostConfig,
    engine: ParticleEngine,
    timing: FrameTiming,
    smoother: IntensitySmoother,
    timeline: StateTimeline,
    center: Vec2,
    clock: f32,
    state: AnimationState,
    next_event: usize,
    next_event_at: f32,
    next_report_at: f32,
    peak_particles: usize,
}

impl Host {
    /// Builds the engine from `config`.
    pub fn new(config: AppConfig) -> AuraResult<Self> {
        let AppConfig { simulation, host } = config;
        let center = Vec2::new(simulation.canvas_width, simulation.canvas_height) * 0.5;
        let engine = ParticleEngine::new(simulation)?;

        Ok(Self {
            timing: FrameTiming::new(host.tick_rate),
            smoother: IntensitySmoother::new(host.intensity_smoothing),
            timeline: StateTimeline::new(host.state_period_secs),
            center,
            clock: 0.0,
            state: AnimationState::Idle,
            next_event: 0,
            next_event_at: host.reaction_interval_secs,
            next_report_at: 1.0,
            peak_particles: 0,
            engine,
            config: host,
        })
    }

    /// Runs for the configured duration, then writes the snapshot if a path
    /// was configured.
    pub fn run(&mut self) -> AuraResult<RunSummary> {
        let total_ticks =
            (self.config.duration_secs * self.timing.tick_rate() as f32).round() as u64;
        info!(
            "Running {} ticks at {} Hz ({})",
            total_ticks,
            self.timing.tick_rate(),
            if self.config.paced { "paced" } else { "unpaced" }
        );

        let dt = self.timing.fixed_dt();
        let mut ticks = 0;
        self.timing.reset();
        while ticks < total_ticks {
            if self.config.paced {
                self.timing.sleep_remainder();
                let delta = self.timing.delta_time();
                let due = self.timing.accumulate(delta);
                for _ in 0..due {
                    if ticks == total_ticks {
                        break;
                    }
                    self.step(dt);
                    ticks += 1;
                }
            } else {
                self.step(dt);
                ticks += 1;
            }
        }

        if let Some(path) = self.config.snapshot_path.clone() {
            self.write_snapshot(&path)?;
        }
        Ok(self.summary())
    }

    /// Advances the scripted collaborators and the engine by one tick.
    pub fn step(&mut self, dt: f32) {
        self.clock += dt;
        let (state, target) = self.timeline.at(self.clock);
        if state != self.state {
            debug!("State {} -> {}", self.state.name(), state.name());
            self.state = state;
        }
        let intensity = self.smoother.update(target, dt * REFERENCE_FPS);

        if self.config.reaction_interval_secs > 0.0 && self.clock >= self.next_event_at {
            self.fire_event();
            self.next_event_at += self.config.reaction_interval_secs;
        }

        let live = self
            .engine
            .update(dt, self.center, state, intensity)
            .particles()
            .len();
        self.peak_particles = self.peak_particles.max(live);

        if self.clock >= self.next_report_at {
            self.report();
            self.next_report_at += 1.0;
        }
    }

    fn fire_event(&mut self) {
        let event = SCRIPT[self.next_event % SCRIPT.len()];
        self.next_event += 1;

        let offset = Vec2::new(
            (self.next_event as f32 * 1.7).sin(),
            (self.next_event as f32 * 2.3).cos(),
        ) * 120.0;
        let at = self.center + offset;
        match event {
            ScriptedEvent::Reaction { tag, color } => {
                let color = color.and_then(|hex| match parse_hex_color(hex) {
                    Ok(color) => Some(color),
                    Err(e) => {
                        warn!("Ignoring reaction color: {e}");
                        None
                    },
                });
                self.engine
                    .create_reaction(at.x, at.y, ReactionTag::from_name(tag), color);
            },
            ScriptedEvent::Keyword(keyword) => {
                self.engine.create_keyword_burst(at.x, at.y, keyword);
            },
        }
    }

    fn report(&self) {
        let stats = self.engine.stats();
        info!(
            "t={:.1}s state={} intensity={:.2} particles={} trails={} emojis={} collisions={} evicted={} frame={:.2}ms",
            stats.elapsed,
            self.state.name(),
            self.smoother.value(),
            stats.particles,
            stats.trails,
            stats.emojis,
            stats.total_collisions,
            stats.evicted_particles,
            self.timing.average_frame_time_ms()
        );
    }

    /// Writes the current frame as pretty JSON, creating parent directories.
    pub fn write_snapshot(&self, path: &Path) -> AuraResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let snapshot = self.engine.snapshot();
        let dump = SnapshotDump {
            state: self.state,
            intensity: self.smoother.value(),
            stats: self.engine.stats(),
            sprites: snapshot.sprites(),
            emojis: snapshot.emojis().collect(),
        };
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &dump)
            .map_err(|e| AuraError::Serialization(e.to_string()))?;

        info!(
            "Wrote snapshot with {} sprites to {}",
            dump.sprites.len(),
            path.display()
        );
        Ok(())
    }

    /// Counters so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            stats: self.engine.stats(),
            peak_particles: self.peak_particles,
            events: self.next_event,
        }
    }
}
