//! Pigment
//!
//! Raster image editing engine. This crate ties the lower layers together
//! into one [`EditorContext`] per document:
//!
//! - **pigment_core**: geometry, colors, blend modes, events, timers
//! - **pigment_paint**: surfaces, layers, compositing, gradients
//! - **pigment_input**: stroke stabilization, pressure, brushes
//! - **pigment_select**: selections, flood fill, selection tools
//!
//! # Example
//!
//! ```rust
//! use pigment::{EditorConfig, EditorContext, ToolKind};
//! use pigment::pigment_input::InputSample;
//! use pigment::pigment_paint::{RasterSurface, Surface};
//!
//! let mut config = EditorConfig::default();
//! config.canvas.width = 32;
//! config.canvas.height = 32;
//!
//! let mut editor = EditorContext::with_seed(config, 7);
//! editor.add_background_layer();
//! editor.set_tool(ToolKind::Pencil);
//! editor.pointer_down(&InputSample::new(4.0, 4.0, 0.0).with_pressure(1.0));
//! editor.pointer_up(&InputSample::new(4.0, 4.0, 16.0).with_pressure(1.0));
//!
//! let mut out = Surface::new(32, 32);
//! editor.composite(&mut out);
//! assert_eq!(out.get_pixel(4, 4), [0, 0, 0, 255]);
//! ```

pub mod config;
pub mod context;
pub mod events;
pub mod logging;
pub mod tools;

pub use config::{BrushConfig, CanvasConfig, ConfigError, EditorConfig, SelectionConfig};
pub use context::EditorContext;
pub use events::{EditorEvent, EditorEventKind, LayerChange};
pub use tools::{ToolBehavior, ToolKind};

pub use pigment_core;
pub use pigment_input;
pub use pigment_paint;
pub use pigment_select;
