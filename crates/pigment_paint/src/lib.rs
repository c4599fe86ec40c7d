//! Pigment Paint
//!
//! Raster storage and the layer compositor.
//!
//! # Features
//!
//! - RGBA8 surfaces with bounds-checked pixel access
//! - Layers with opacity, blend mode, visibility, lock and transform
//! - Bottom-to-top compositing of a layer stack into any surface
//! - Linear, radial and conic gradients
//!
//! # Example
//!
//! ```rust
//! use pigment_paint::{composite, LayerProperty, LayerStack, RasterSurface, Surface};
//! use pigment_core::BlendMode;
//!
//! let mut stack = LayerStack::new(64, 64);
//! stack.add_layer("Background");
//! stack.active_layer_mut().unwrap().surface_mut().clear([255, 255, 255, 255]);
//!
//! let ink = stack.add_layer("Ink");
//! stack.set_layer_property(ink, LayerProperty::BlendMode(BlendMode::Multiply));
//!
//! let mut out = Surface::new(64, 64);
//! composite(&stack, &mut out);
//! assert_eq!(out.get_pixel(0, 0), [255, 255, 255, 255]);
//! ```

pub mod compositor;
pub mod error;
pub mod gradient;
pub mod layer;
pub mod surface;

pub use compositor::{composite, composite_layer};
pub use error::{Result, SurfaceError};
pub use gradient::{render, render_conic, sample, ColorStop, GradientDefinition, GradientKind};
pub use layer::{
    Layer, LayerId, LayerIdGenerator, LayerPixels, LayerProperty, LayerPropertyKey, LayerStack,
    LayerTransform,
};
pub use surface::{RasterSurface, Surface};
