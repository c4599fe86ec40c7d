//! Pigment Select
//!
//! Selection regions and the tools that create them.
//!
//! # Features
//!
//! - Rectangle, polygon and pixel-mask selections with containment queries
//! - Even-odd polygon containment
//! - Contiguous and global flood fill with an RGBA tolerance
//! - Rectangle, lasso and click-polygon tools driven by a phase machine
//! - Marching-ants animation state
//!
//! # Example
//!
//! ```rust
//! use pigment_core::Point;
//! use pigment_select::{Selection, SelectionEngine};
//!
//! let mut engine = SelectionEngine::new();
//! engine.set_selection(Selection::Polygon {
//!     points: vec![
//!         Point::new(0.0, 0.0),
//!         Point::new(10.0, 0.0),
//!         Point::new(10.0, 10.0),
//!         Point::new(0.0, 10.0),
//!     ],
//!     closed: true,
//! });
//! assert!(engine.is_point_in_selection(5.0, 5.0));
//! assert!(!engine.is_point_in_selection(15.0, 5.0));
//! ```

pub mod ants;
pub mod flood;
pub mod polygon;
pub mod selection;
pub mod tools;

pub use ants::{MarchingAnts, ANTS_INTERVAL_MS, DASH_PERIOD};
pub use flood::flood_fill;
pub use polygon::{point_in_polygon, polygon_area};
pub use selection::{MaskRegion, Selection, SelectionEngine};
pub use tools::{
    tool_for, FreehandSelectTool, PhaseEvent, PolygonSelectTool, RectSelectTool, SelectKind,
    SelectionOutcome, SelectionPhase, SelectionTool,
};
