//! Pressure shaping
//!
//! Devices that report force get it passed through a response curve.
//! Devices that do not (mouse, most touch screens) get a synthetic pressure
//! that falls as the pointer speeds up, so quick flicks draw thinner lines.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::point::InputSample;

/// Samples kept for velocity estimation
const HISTORY_LEN: usize = 8;

/// Pressure reported before any velocity is known
const INITIAL_PRESSURE: f32 = 0.5;

/// Lowest synthetic pressure; a fast stroke never vanishes entirely
const MIN_SYNTHETIC_PRESSURE: f32 = 0.1;

/// Weight of the previous value in the synthetic pressure average
const SMOOTHING_RETAIN: f32 = 0.7;

/// Steepness of the logistic S-curve
const S_CURVE_STEEPNESS: f32 = 10.0;

/// Response curve applied to device pressure
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PressureCurve {
    #[default]
    Linear,
    /// `p²`, soft touches stay light
    EaseIn,
    /// `1 - (1 - p)²`, light touches register strongly
    EaseOut,
    EaseInOut,
    /// Logistic curve normalized to pass through 0 and 1
    SCurve,
}

impl PressureCurve {
    /// Map a pressure in `[0, 1]` through the curve
    pub fn apply(&self, p: f32) -> f32 {
        let p = p.clamp(0.0, 1.0);
        match self {
            PressureCurve::Linear => p,
            PressureCurve::EaseIn => p * p,
            PressureCurve::EaseOut => 1.0 - (1.0 - p) * (1.0 - p),
            PressureCurve::EaseInOut => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    1.0 - (-2.0 * p + 2.0).powi(2) / 2.0
                }
            }
            PressureCurve::SCurve => {
                let logistic = |x: f32| 1.0 / (1.0 + (-S_CURVE_STEEPNESS * (x - 0.5)).exp());
                let low = logistic(0.0);
                let high = logistic(1.0);
                ((logistic(p) - low) / (high - low)).clamp(0.0, 1.0)
            }
        }
    }

    /// Parse a curve name such as `"ease-in"` or `"s-curve"`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "linear" => Some(PressureCurve::Linear),
            "ease-in" => Some(PressureCurve::EaseIn),
            "ease-out" => Some(PressureCurve::EaseOut),
            "ease-in-out" => Some(PressureCurve::EaseInOut),
            "s-curve" | "scurve" => Some(PressureCurve::SCurve),
            _ => None,
        }
    }
}

/// Pressure options
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureConfig {
    pub curve: PressureCurve,
    /// Pointer speed in px/ms at which synthetic pressure bottoms out
    pub max_velocity: f32,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            curve: PressureCurve::Linear,
            max_velocity: 5.0,
        }
    }
}

/// Resolves a pressure for every sample of a stroke
#[derive(Clone, Debug)]
pub struct PressureSimulator {
    config: PressureConfig,
    samples: VecDeque<(f32, f32, f64)>,
    pressures: VecDeque<f32>,
}

impl Default for PressureSimulator {
    fn default() -> Self {
        Self::new(PressureConfig::default())
    }
}

impl PressureSimulator {
    pub fn new(mut config: PressureConfig) -> Self {
        if !(config.max_velocity.is_finite() && config.max_velocity > 0.0) {
            tracing::warn!(
                max_velocity = config.max_velocity,
                "invalid max velocity, using default"
            );
            config.max_velocity = PressureConfig::default().max_velocity;
        }
        Self {
            config,
            samples: VecDeque::with_capacity(HISTORY_LEN),
            pressures: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn config(&self) -> &PressureConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.pressures.clear();
    }

    /// Most recently resolved pressure
    pub fn last_pressure(&self) -> f32 {
        self.pressures.back().copied().unwrap_or(INITIAL_PRESSURE)
    }

    /// Recently resolved pressures, oldest first
    pub fn recent_pressures(&self) -> impl Iterator<Item = f32> + '_ {
        self.pressures.iter().copied()
    }

    /// Resolve the pressure for `sample`
    pub fn process(&mut self, sample: &InputSample) -> f32 {
        push_bounded(
            &mut self.samples,
            (sample.x, sample.y, sample.timestamp_ms),
        );

        let pressure = match sample.pressure.filter(|p| p.is_finite()) {
            Some(device) => self.config.curve.apply(device),
            None => self.synthetic(),
        };
        push_bounded(&mut self.pressures, pressure);
        pressure
    }

    fn synthetic(&self) -> f32 {
        let previous = self.last_pressure();
        let n = self.samples.len();
        if n < 2 {
            return previous;
        }
        let (x0, y0, t0) = self.samples[n - 2];
        let (x1, y1, t1) = self.samples[n - 1];
        let dt = (t1 - t0) as f32;
        if dt <= 0.0 {
            return previous;
        }
        let velocity = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt() / dt;
        let target =
            (1.0 - velocity / self.config.max_velocity).clamp(MIN_SYNTHETIC_PRESSURE, 1.0);
        SMOOTHING_RETAIN * previous + (1.0 - SMOOTHING_RETAIN) * target
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, value: T) {
    if queue.len() == HISTORY_LEN {
        queue.pop_front();
    }
    queue.push_back(value);
}
