//! Stroke input pipeline
//!
//! Raw samples are resolved to a pressure first, then stabilized. The
//! pipeline returns, per call, the stroke points that became ready:
//!
//! - `on_stroke_start` resets both stages and returns nothing; the first
//!   point is delivered with the next move or end
//! - `on_stroke_move` returns zero or more points
//! - `on_stroke_end` returns the remaining points, flush included

use smallvec::SmallVec;

use crate::point::{InputSample, StrokePoint};
use crate::pressure::{PressureConfig, PressureSimulator};
use crate::stabilizer::{Stabilizer, StabilizerConfig};

/// Points produced by one pipeline call
pub type StrokeBatch = SmallVec<[StrokePoint; 4]>;

/// Pressure simulation followed by stabilization
#[derive(Clone, Debug, Default)]
pub struct StrokeInputPipeline {
    stabilizer: Stabilizer,
    pressure: PressureSimulator,
    pending_start: Option<StrokePoint>,
    active: bool,
}

impl StrokeInputPipeline {
    pub fn new(stabilizer: StabilizerConfig, pressure: PressureConfig) -> Self {
        Self {
            stabilizer: Stabilizer::new(stabilizer),
            pressure: PressureSimulator::new(pressure),
            pending_start: None,
            active: false,
        }
    }

    pub fn stabilizer(&self) -> &Stabilizer {
        &self.stabilizer
    }

    pub fn pressure(&self) -> &PressureSimulator {
        &self.pressure
    }

    /// Whether a stroke is in progress
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn on_stroke_start(&mut self, sample: &InputSample) {
        self.stabilizer.reset();
        self.pressure.reset();
        self.active = true;
        let point = self.resolve(sample);
        self.pending_start = self.stabilizer.add_point(point);
        tracing::trace!(x = sample.x, y = sample.y, "stroke start");
    }

    pub fn on_stroke_move(&mut self, sample: &InputSample) -> StrokeBatch {
        let mut batch = StrokeBatch::new();
        if !self.active {
            return batch;
        }
        batch.extend(self.pending_start.take());
        let point = self.resolve(sample);
        batch.extend(self.stabilizer.add_point(point));
        batch
    }

    /// Finish the stroke. `sample` is the pointer-up position and counts as
    /// the final raw point.
    pub fn on_stroke_end(&mut self, sample: &InputSample) -> StrokeBatch {
        let mut batch = StrokeBatch::new();
        if !self.active {
            return batch;
        }
        batch.extend(self.pending_start.take());
        let point = self.resolve(sample);
        batch.extend(self.stabilizer.add_point(point));
        batch.extend(self.stabilizer.flush());
        self.active = false;
        tracing::trace!(x = sample.x, y = sample.y, "stroke end");
        batch
    }

    /// Abandon the stroke without emitting anything further
    pub fn cancel(&mut self) {
        self.stabilizer.reset();
        self.pressure.reset();
        self.pending_start = None;
        self.active = false;
    }

    fn resolve(&mut self, sample: &InputSample) -> StrokePoint {
        let pressure = self.pressure.process(sample);
        StrokePoint::from_sample(sample, pressure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: usize) -> InputSample {
        InputSample::new(i as f32 * 2.0, 10.0, i as f64 * 16.0)
    }

    #[test]
    fn test_stroke_emits_one_point_per_sample() {
        let mut pipeline = StrokeInputPipeline::default();
        pipeline.on_stroke_start(&sample(0));
        let mut total = 0;
        for i in 1..9 {
            total += pipeline.on_stroke_move(&sample(i)).len();
        }
        total += pipeline.on_stroke_end(&sample(9)).len();
        assert_eq!(total, 10);
        assert!(!pipeline.is_active());
    }

    #[test]
    fn test_first_move_delivers_start_point() {
        let mut pipeline = StrokeInputPipeline::default();
        pipeline.on_stroke_start(&sample(0).with_pressure(0.9));
        let batch = pipeline.on_stroke_move(&sample(1));
        assert_eq!(batch.len(), 1);
        assert_eq!((batch[0].x, batch[0].y), (0.0, 10.0));
        assert!((batch[0].pressure - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_tap_without_moves() {
        let mut pipeline = StrokeInputPipeline::default();
        pipeline.on_stroke_start(&sample(0));
        let batch = pipeline.on_stroke_end(&sample(0));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_moves_outside_a_stroke_are_ignored() {
        let mut pipeline = StrokeInputPipeline::default();
        assert!(pipeline.on_stroke_move(&sample(1)).is_empty());
        assert!(pipeline.on_stroke_end(&sample(2)).is_empty());

        pipeline.on_stroke_start(&sample(0));
        pipeline.cancel();
        assert!(pipeline.on_stroke_move(&sample(1)).is_empty());
    }

    #[test]
    fn test_pressure_stays_in_range() {
        let mut pipeline = StrokeInputPipeline::default();
        pipeline.on_stroke_start(&sample(0).with_pressure(7.0));
        let mut points: Vec<StrokePoint> = Vec::new();
        for i in 1..6 {
            points.extend(pipeline.on_stroke_move(&InputSample::new(i as f32 * 90.0, 0.0, i as f64)));
        }
        points.extend(pipeline.on_stroke_end(&sample(6)));
        assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.pressure)));
    }
}
