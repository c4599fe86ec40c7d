//! Pigment Input
//!
//! Freehand stroke processing and brush rendering.
//!
//! # Features
//!
//! - Weighted-average stroke stabilization with optional prediction
//! - Pressure response curves and velocity-based synthetic pressure
//! - A start / move / end pipeline producing stabilized stroke points
//! - Brush, pencil, eraser, airbrush and calligraphy dab rendering
//!
//! # Example
//!
//! ```rust
//! use pigment_input::{InputSample, StrokeInputPipeline};
//!
//! let mut pipeline = StrokeInputPipeline::default();
//! pipeline.on_stroke_start(&InputSample::new(0.0, 0.0, 0.0));
//! let mut points = pipeline.on_stroke_move(&InputSample::new(4.0, 0.0, 16.0)).to_vec();
//! points.extend(pipeline.on_stroke_end(&InputSample::new(8.0, 0.0, 32.0)));
//! assert_eq!(points.len(), 3);
//! ```

pub mod brush;
pub mod pipeline;
pub mod point;
pub mod pressure;
pub mod stabilizer;

pub use brush::{AirbrushSettings, BrushKind, BrushRenderer, BrushSettings, SegmentDynamics};
pub use pipeline::{StrokeBatch, StrokeInputPipeline};
pub use point::{InputSample, StrokePoint};
pub use pressure::{PressureConfig, PressureCurve, PressureSimulator};
pub use stabilizer::{Stabilizer, StabilizerConfig};
