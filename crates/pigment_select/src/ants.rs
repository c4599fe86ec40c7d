//! Marching ants
//!
//! The animated dashed outline of an active selection. The animation owns
//! one repeating timer on the host's [`IntervalScheduler`]; each firing
//! advances the dash offset by one pixel. Stopping cancels the timer, so no
//! further offsets are produced.

use pigment_core::{Fired, IntervalScheduler, TimerId};

/// Default animation period
pub const ANTS_INTERVAL_MS: f64 = 100.0;

/// Length of one dash plus one gap, in pixels
pub const DASH_PERIOD: u32 = 8;

#[derive(Debug, Clone)]
pub struct MarchingAnts {
    interval_ms: f64,
    timer: Option<TimerId>,
    offset: u32,
}

impl Default for MarchingAnts {
    fn default() -> Self {
        Self::new(ANTS_INTERVAL_MS)
    }
}

impl MarchingAnts {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            timer: None,
            offset: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Current dash offset in `0..DASH_PERIOD`
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Start animating. Restarting keeps the current offset.
    pub fn start(&mut self, scheduler: &mut IntervalScheduler, now_ms: f64) {
        if let Some(timer) = self.timer {
            if scheduler.is_active(timer) {
                return;
            }
        }
        self.timer = Some(scheduler.start(self.interval_ms, now_ms));
    }

    /// Stop animating. Returns whether a timer was running.
    pub fn stop(&mut self, scheduler: &mut IntervalScheduler) -> bool {
        match self.timer.take() {
            Some(timer) => scheduler.cancel(timer),
            None => false,
        }
    }

    /// Apply a scheduler firing; returns the new offset when it was ours
    pub fn on_fired(&mut self, fired: &Fired) -> Option<u32> {
        if self.timer != Some(fired.id) {
            return None;
        }
        self.offset = (self.offset + fired.count % DASH_PERIOD) % DASH_PERIOD;
        Some(self.offset)
    }

    /// Whether the outline pixel at `index` along the path is drawn dark.
    /// Half of every period is dash, the other half gap.
    pub fn is_dash(&self, index: u32) -> bool {
        (index.wrapping_add(DASH_PERIOD - self.offset) % DASH_PERIOD) < DASH_PERIOD / 2
    }
}
