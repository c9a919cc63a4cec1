//! Loop timing statistics for the HUD and debug logs.

use std::time::Duration;

const FPS_SMOOTHING: f64 = 0.8;
const MIN_FRAME_SECS: f64 = 0.001;

#[derive(Debug, Clone, Default)]
pub struct LoopStats {
    last_cycle: Option<Duration>,
    fps: f64,
    instant_fps: f64,
    cycles: u64,
}

impl LoopStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the timestamp of a new cycle.
    pub fn record(&mut self, now: Duration) {
        self.cycles += 1;
        if let Some(prev) = self.last_cycle {
            let dt = now.saturating_sub(prev).as_secs_f64().max(MIN_FRAME_SECS);
            self.instant_fps = 1.0 / dt;
            self.fps = FPS_SMOOTHING * self.fps + (1.0 - FPS_SMOOTHING) * self.instant_fps;
        }
        self.last_cycle = Some(now);
    }

    /// Exponentially smoothed frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Time between the last two cycles, in milliseconds.
    pub fn latency_ms(&self) -> f64 {
        1000.0 / self.instant_fps.max(MIN_FRAME_SECS)
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}
