//! Pigment Core
//!
//! Foundational types shared by every Pigment crate:
//!
//! - **Geometry**: points, rectangles and 2D affine transforms in document space
//! - **Color**: straight-alpha colors and 8-bit pixels
//! - **Blend modes**: the separable compositing operators and their per-pixel math
//! - **Events**: a typed publish/subscribe bus
//! - **State machines**: flat statecharts for tool interaction phases
//! - **Timers**: cooperative interval timers driven by the host's frame loop

pub mod blend;
pub mod color;
pub mod events;
pub mod fsm;
pub mod geometry;
pub mod timer;

pub use blend::{blend_pixel, BlendMode};
pub use color::{rgba_distance, Color, Pixel, TRANSPARENT_PIXEL};
pub use events::{Event, EventBus, ListenerId};
pub use fsm::{StateMachine, StateMachineBuilder};
pub use geometry::{Affine2D, Point, Rect, Size, Vec2};
pub use timer::{Fired, IntervalScheduler, TimerId};
