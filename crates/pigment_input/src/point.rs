//! Pointer samples and stroke points

use pigment_core::Point;

/// A raw pointer event in document coordinates.
///
/// Optional fields are absent when the input device does not report them;
/// a missing `pressure` means the pressure simulator derives one from
/// pointer velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSample {
    pub x: f32,
    pub y: f32,
    pub pressure: Option<f32>,
    pub tilt_x: Option<f32>,
    pub tilt_y: Option<f32>,
    pub rotation: Option<f32>,
    pub timestamp_ms: f64,
}

impl InputSample {
    /// A mouse-style sample with no stylus data
    pub fn new(x: f32, y: f32, timestamp_ms: f64) -> Self {
        Self {
            x,
            y,
            timestamp_ms,
            ..Default::default()
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_tilt(mut self, tilt_x: f32, tilt_y: f32) -> Self {
        self.tilt_x = Some(tilt_x);
        self.tilt_y = Some(tilt_y);
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A pressure-shaped point of a stroke
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    /// Always within `[0, 1]`
    pub pressure: f32,
    pub tilt_x: f32,
    pub tilt_y: f32,
    pub rotation: f32,
    pub timestamp_ms: f64,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32, pressure: f32, timestamp_ms: f64) -> Self {
        Self {
            x,
            y,
            pressure: pressure.clamp(0.0, 1.0),
            timestamp_ms,
            ..Default::default()
        }
    }

    /// Build from a raw sample with an already resolved pressure
    pub fn from_sample(sample: &InputSample, pressure: f32) -> Self {
        Self {
            x: sample.x,
            y: sample.y,
            pressure: pressure.clamp(0.0, 1.0),
            tilt_x: sample.tilt_x.unwrap_or(0.0),
            tilt_y: sample.tilt_y.unwrap_or(0.0),
            rotation: sample.rotation.unwrap_or(0.0),
            timestamp_ms: sample.timestamp_ms,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
