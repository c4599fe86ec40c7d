//! Stroke stabilizer
//!
//! Smooths raw pointer positions with a 0.25 / 0.5 / 0.25 weighted average
//! of each point and its two neighbours. Because the average needs the
//! following point, output lags input by one sample:
//!
//! - the first point of a stroke is emitted unchanged as soon as it arrives
//! - every later point is emitted, smoothed, when its successor arrives
//! - [`Stabilizer::flush`] emits the last raw point when the stroke ends
//!
//! Across a whole stroke the number of emitted points therefore equals the
//! number of raw points.
//!
//! Optional stages, applied to each smoothed point in order:
//!
//! 1. Adaptive smoothing: the point is pulled toward the previous output by
//!    an effective window that grows from 1 to `smoothing_level` as pointer
//!    speed rises.
//! 2. Prediction: the point is pushed forward along the recent output
//!    velocity by `prediction_strength` to hide display latency. With
//!    `velocity_smoothing` that velocity is averaged over the output history
//!    instead of taken from the last two outputs.
//!
//! Predicted offsets are not fed back into the history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::point::StrokePoint;

/// Number of emitted points kept for prediction
const HISTORY_LEN: usize = 8;

/// Pointer speed (px/ms) at which adaptive smoothing reaches its full window
const ADAPTIVE_REFERENCE_SPEED: f32 = 2.0;

/// Stabilizer options
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Largest window used by adaptive smoothing, and the capacity of the
    /// raw point ring. Has no effect on output unless `adaptive_smoothing`
    /// is on; the fixed kernel always spans three points.
    pub smoothing_level: usize,
    /// Fraction of the output velocity added ahead of each point, `[0, 1]`
    pub prediction_strength: f32,
    pub velocity_smoothing: bool,
    pub adaptive_smoothing: bool,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            smoothing_level: 10,
            prediction_strength: 0.0,
            velocity_smoothing: false,
            adaptive_smoothing: false,
        }
    }
}

impl StabilizerConfig {
    fn sanitized(mut self) -> Self {
        self.smoothing_level = self.smoothing_level.max(3);
        self.prediction_strength = if self.prediction_strength.is_finite() {
            self.prediction_strength.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}

/// Per-stroke smoothing state
#[derive(Clone, Debug)]
pub struct Stabilizer {
    config: StabilizerConfig,
    raw: VecDeque<StrokePoint>,
    emitted: VecDeque<StrokePoint>,
    received: usize,
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new(StabilizerConfig::default())
    }
}

impl Stabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        let config = config.sanitized();
        Self {
            raw: VecDeque::with_capacity(config.smoothing_level),
            emitted: VecDeque::with_capacity(HISTORY_LEN),
            config,
            received: 0,
        }
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    /// Replace the options. Takes effect from the next stroke.
    pub fn set_config(&mut self, config: StabilizerConfig) {
        self.config = config.sanitized();
        self.reset();
    }

    /// Forget the current stroke
    pub fn reset(&mut self) {
        self.raw.clear();
        self.emitted.clear();
        self.received = 0;
    }

    /// Raw points received since the last reset
    pub fn received(&self) -> usize {
        self.received
    }

    /// Feed one raw point, returning the point that became ready, if any
    pub fn add_point(&mut self, point: StrokePoint) -> Option<StrokePoint> {
        if self.raw.len() == self.config.smoothing_level {
            self.raw.pop_front();
        }
        self.raw.push_back(point);
        self.received += 1;

        if self.received == 1 {
            self.remember(point);
            return Some(point);
        }
        if self.raw.len() < 3 {
            return None;
        }

        let n = self.raw.len();
        let (prev, curr, next) = (self.raw[n - 3], self.raw[n - 2], self.raw[n - 1]);
        let mut smoothed = curr;
        smoothed.x = 0.25 * prev.x + 0.5 * curr.x + 0.25 * next.x;
        smoothed.y = 0.25 * prev.y + 0.5 * curr.y + 0.25 * next.y;
        smoothed.pressure =
            (0.25 * prev.pressure + 0.5 * curr.pressure + 0.25 * next.pressure).clamp(0.0, 1.0);

        if self.config.adaptive_smoothing {
            smoothed = self.adapt(smoothed, prev, curr);
        }
        self.remember(smoothed);
        Some(self.predict(smoothed))
    }

    /// End the stroke: emit the last raw point if it has not been emitted
    /// yet, then reset
    pub fn flush(&mut self) -> Option<StrokePoint> {
        let pending = if self.received > 1 {
            self.raw.back().copied()
        } else {
            None
        };
        tracing::trace!(received = self.received, flushed = pending.is_some(), "stabilizer flush");
        self.reset();
        pending
    }

    fn remember(&mut self, point: StrokePoint) {
        if self.emitted.len() == HISTORY_LEN {
            self.emitted.pop_front();
        }
        self.emitted.push_back(point);
    }

    fn adapt(&self, smoothed: StrokePoint, prev: StrokePoint, curr: StrokePoint) -> StrokePoint {
        let Some(last) = self.emitted.back() else {
            return smoothed;
        };
        let dt = (curr.timestamp_ms - prev.timestamp_ms) as f32;
        let speed = if dt > 0.0 {
            curr.position().distance_to(prev.position()) / dt
        } else {
            0.0
        };
        let level = self.config.smoothing_level as f32;
        let window = 1.0 + (level - 1.0) * (speed / ADAPTIVE_REFERENCE_SPEED).clamp(0.0, 1.0);

        let mut out = smoothed;
        out.x = last.x + (smoothed.x - last.x) / window;
        out.y = last.y + (smoothed.y - last.y) / window;
        out
    }

    fn predict(&self, point: StrokePoint) -> StrokePoint {
        let strength = self.config.prediction_strength;
        if strength <= 0.0 || self.emitted.len() < 2 {
            return point;
        }
        let n = self.emitted.len();
        let (vx, vy) = if self.config.velocity_smoothing {
            let first = self.emitted[0];
            let last = self.emitted[n - 1];
            let steps = (n - 1) as f32;
            ((last.x - first.x) / steps, (last.y - first.y) / steps)
        } else {
            let a = self.emitted[n - 2];
            let b = self.emitted[n - 1];
            (b.x - a.x, b.y - a.y)
        };
        let mut out = point;
        out.x += vx * strength;
        out.y += vy * strength;
        out
    }
}
