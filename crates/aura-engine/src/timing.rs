//! Frame timing.
//!
//! Turns wall-clock time into fixed simulation ticks and paces the loop to
//! the configured tick rate.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Largest wall-clock delta accepted in one frame.
const MAX_DT: f32 = 0.25;
/// Cap on fixed ticks per frame.
const MAX_TICKS_PER_FRAME: u32 = 10;
/// Samples kept for the rolling frame time.
const MAX_SAMPLES: usize = 120;

/// Fixed-step frame timing manager.
#[derive(Debug)]
pub struct FrameTiming {
    /// Ticks per second
    tick_rate: u32,
    /// Wall-clock budget per tick
    frame_budget: Duration,
    /// Start of the current frame
    last_frame: Instant,
    /// Unconsumed wall-clock time
    accumulator: f32,
    /// Seconds per tick
    fixed_dt: f32,
    /// Recent frame times for averaging
    frame_times: VecDeque<f32>,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(30)
    }
}

impl FrameTiming {
    /// Create a timing manager for `tick_rate` ticks per second.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        let tick_rate = tick_rate.max(1);
        Self {
            tick_rate,
            frame_budget: Duration::from_secs_f64(1.0 / f64::from(tick_rate)),
            last_frame: Instant::now(),
            accumulator: 0.0,
            fixed_dt: 1.0 / tick_rate as f32,
            frame_times: VecDeque::with_capacity(MAX_SAMPLES),
        }
    }

    /// Seconds per tick.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Ticks per second.
    #[must_use]
    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Wall-clock seconds since the previous call, clamped to prevent a
    /// spiral of death.
    pub fn delta_time(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        let clamped_dt = dt.min(MAX_DT);
        self.record(clamped_dt);
        clamped_dt
    }

    fn record(&mut self, dt: f32) {
        self.frame_times.push_back(dt);
        if self.frame_times.len() > MAX_SAMPLES {
            self.frame_times.pop_front();
        }
    }

    /// Accumulate time and return how many fixed ticks are due.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_TICKS_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind: drop the backlog.
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Sleep for the remainder of the tick budget.
    pub fn sleep_remainder(&self) {
        let elapsed = self.last_frame.elapsed();
        if elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
    }

    /// Average frame time in milliseconds.
    #[must_use]
    pub fn average_frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        (self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32) * 1000.0
    }

    /// Restart timing, e.g. before entering the loop.
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.accumulator = 0.0;
        self.frame_times.clear();
    }
}
