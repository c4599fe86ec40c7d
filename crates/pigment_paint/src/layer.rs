//! Layer model
//!
//! A document is a [`LayerStack`]: an ordered list of raster layers (bottom
//! to top) plus the id of the active layer that paint and fill operations
//! target. Every layer surface always matches the canvas size.
//!
//! Operations that receive an unknown [`LayerId`] are no-ops that report
//! failure through their return value.

use std::ops::Deref;

use pigment_core::{Affine2D, BlendMode, Pixel};

use crate::error::Result;
use crate::surface::{RasterSurface, Surface};

// ─────────────────────────────────────────────────────────────────────────────
// Layer Identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier for a layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

impl LayerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Generator for unique layer IDs. Ids are never reused.
#[derive(Debug)]
pub struct LayerIdGenerator {
    next: u64,
}

impl LayerIdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next(&mut self) -> LayerId {
        let id = LayerId(self.next);
        self.next += 1;
        id
    }
}

impl Default for LayerIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layer Properties
// ─────────────────────────────────────────────────────────────────────────────

/// Placement of a layer's surface on the canvas
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerTransform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Radians, about the document origin
    pub rotation: f32,
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl LayerTransform {
    pub const IDENTITY: LayerTransform = LayerTransform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        rotation: 0.0,
    };

    pub fn translated(x: f32, y: f32) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::IDENTITY
        }
    }

    /// Layer space to document space: translate, then scale, then rotate,
    /// composed into a single matrix
    pub fn to_affine(&self) -> Affine2D {
        Affine2D::translation(self.translate_x, self.translate_y)
            .then(&Affine2D::scale(self.scale_x, self.scale_y))
            .then(&Affine2D::rotation(self.rotation))
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// A settable layer attribute
#[derive(Clone, Debug, PartialEq)]
pub enum LayerProperty {
    Name(String),
    Opacity(f32),
    BlendMode(BlendMode),
    Visible(bool),
    Locked(bool),
    Transform(LayerTransform),
}

/// Discriminant of [`LayerProperty`], used in change notifications
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerPropertyKey {
    Name,
    Opacity,
    BlendMode,
    Visible,
    Locked,
    Transform,
}

impl LayerProperty {
    pub fn key(&self) -> LayerPropertyKey {
        match self {
            LayerProperty::Name(_) => LayerPropertyKey::Name,
            LayerProperty::Opacity(_) => LayerPropertyKey::Opacity,
            LayerProperty::BlendMode(_) => LayerPropertyKey::BlendMode,
            LayerProperty::Visible(_) => LayerPropertyKey::Visible,
            LayerProperty::Locked(_) => LayerPropertyKey::Locked,
            LayerProperty::Transform(_) => LayerPropertyKey::Transform,
        }
    }

    /// Parse a string-keyed property as sent by layer panels.
    ///
    /// Returns `None` for unknown keys or unparsable values. Unknown blend
    /// mode names resolve to [`BlendMode::Normal`].
    pub fn parse(key: &str, value: &str) -> Option<Self> {
        let value = value.trim();
        match key {
            "name" => Some(LayerProperty::Name(value.to_string())),
            "opacity" => value.parse().ok().map(LayerProperty::Opacity),
            "blendMode" | "blend_mode" | "blend" => {
                Some(LayerProperty::BlendMode(BlendMode::from_name(value)))
            }
            "visible" => value.parse().ok().map(LayerProperty::Visible),
            "locked" => value.parse().ok().map(LayerProperty::Locked),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layer
// ─────────────────────────────────────────────────────────────────────────────

/// A raster layer: one owned surface plus its compositing attributes
#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerId,
    pub name: String,
    surface: Surface,
    opacity: f32,
    pub blend_mode: BlendMode,
    pub visible: bool,
    pub locked: bool,
    pub transform: LayerTransform,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id,
            name: name.into(),
            surface: Surface::new(width, height),
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            visible: true,
            locked: false,
            transform: LayerTransform::IDENTITY,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Store opacity clamped to `[0, 1]`; NaN becomes fully opaque
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Write access to the layer's pixels. The surface keeps its size.
    pub fn surface_mut(&mut self) -> LayerPixels<'_> {
        LayerPixels {
            surface: &mut self.surface,
        }
    }

    /// Whether paint and fill operations may modify this layer
    pub fn is_paintable(&self) -> bool {
        !self.locked
    }

    pub fn apply(&mut self, property: LayerProperty) {
        match property {
            LayerProperty::Name(name) => self.name = name,
            LayerProperty::Opacity(opacity) => self.set_opacity(opacity),
            LayerProperty::BlendMode(mode) => self.blend_mode = mode,
            LayerProperty::Visible(visible) => self.visible = visible,
            LayerProperty::Locked(locked) => self.locked = locked,
            LayerProperty::Transform(transform) => self.transform = transform,
        }
    }
}

/// Pixel writer for one layer surface.
///
/// Dimensions follow the canvas and only change through
/// [`LayerStack::resize_canvas`]; [`resize`](RasterSurface::resize) on this
/// handle is ignored.
#[derive(Debug)]
pub struct LayerPixels<'a> {
    surface: &'a mut Surface,
}

impl LayerPixels<'_> {
    /// Overwrite every pixel for which `predicate(x, y)` holds
    pub fn fill_where(&mut self, pixel: Pixel, predicate: impl FnMut(i32, i32) -> bool) {
        self.surface.fill_where(pixel, predicate);
    }
}

impl Deref for LayerPixels<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        self.surface
    }
}

impl RasterSurface for LayerPixels<'_> {
    fn width(&self) -> u32 {
        self.surface.width()
    }

    fn height(&self) -> u32 {
        self.surface.height()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) != (self.surface.width(), self.surface.height()) {
            tracing::debug!(width, height, "layer resize ignored; resize the canvas instead");
        }
    }

    fn get_pixel(&self, x: i32, y: i32) -> Pixel {
        self.surface.get_pixel(x, y)
    }

    fn set_pixel(&mut self, x: i32, y: i32, pixel: Pixel) {
        self.surface.set_pixel(x, y, pixel);
    }

    fn clear(&mut self, pixel: Pixel) {
        self.surface.clear(pixel);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Layer Stack
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered layers of one document, bottom to top
#[derive(Debug)]
pub struct LayerStack {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    active: Option<LayerId>,
    id_generator: LayerIdGenerator,
}

impl LayerStack {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
            active: None,
            id_generator: LayerIdGenerator::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers from bottom to top
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    /// Add an empty canvas-sized layer on top of the stack and make it active
    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        let id = self.id_generator.next();
        let layer = Layer::new(id, name, self.width, self.height);
        tracing::debug!(?id, name = %layer.name, "layer added");
        self.layers.push(layer);
        self.active = Some(id);
        id
    }

    /// Copy a layer (pixels and attributes) directly above the original and
    /// make the copy active
    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        let index = self.index_of(id)?;
        let new_id = self.id_generator.next();
        let mut copy = self.layers[index].clone();
        copy.id = new_id;
        copy.name = format!("{} copy", copy.name);
        tracing::debug!(source = ?id, id = ?new_id, "layer duplicated");
        self.layers.insert(index + 1, copy);
        self.active = Some(new_id);
        Some(new_id)
    }

    /// Remove a layer. When it was active, the layer below it becomes active
    /// (or the new bottom layer if it was the bottom one).
    pub fn remove_layer(&mut self, id: LayerId) -> bool {
        let Some(index) = self.index_of(id) else {
            tracing::debug!(?id, "remove_layer: unknown layer");
            return false;
        };
        self.layers.remove(index);
        if self.active == Some(id) {
            self.active = if self.layers.is_empty() {
                None
            } else {
                Some(self.layers[index.saturating_sub(1)].id)
            };
        }
        tracing::debug!(?id, active = ?self.active, "layer removed");
        true
    }

    /// Move a layer to `index` (clamped to the top of the stack)
    pub fn move_layer(&mut self, id: LayerId, index: usize) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let layer = self.layers.remove(from);
        let to = index.min(self.layers.len());
        self.layers.insert(to, layer);
        true
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        if self.index_of(id).is_none() {
            tracing::debug!(?id, "set_active_layer: unknown layer");
            return false;
        }
        self.active = Some(id);
        true
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.active
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.active.and_then(|id| self.layer(id))
    }

    pub fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        let id = self.active?;
        self.layer_mut(id)
    }

    pub fn set_layer_property(&mut self, id: LayerId, property: LayerProperty) -> bool {
        let Some(layer) = self.layer_mut(id) else {
            tracing::debug!(?id, "set_layer_property: unknown layer");
            return false;
        };
        tracing::trace!(?id, ?property, "layer property set");
        layer.apply(property);
        true
    }

    /// Resize the canvas and every layer surface with it
    pub fn resize_canvas(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        for layer in &mut self.layers {
            layer.surface.resize(width, height);
        }
    }

    /// Raw RGBA8 pixels of a layer, for an external history list
    pub fn snapshot_layer(&self, id: LayerId) -> Option<Vec<u8>> {
        self.layer(id).map(|layer| layer.surface.to_raw())
    }

    /// Replace a layer's pixels with a snapshot taken by
    /// [`snapshot_layer`](Self::snapshot_layer). `Ok(false)` for an unknown id.
    pub fn restore_layer(&mut self, id: LayerId, bytes: Vec<u8>) -> Result<bool> {
        let (width, height) = (self.width, self.height);
        let Some(layer) = self.layer_mut(id) else {
            return Ok(false);
        };
        layer.surface = Surface::from_raw(width, height, bytes)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(stack: &LayerStack) -> Vec<&str> {
        stack.layers().iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_add_layer_goes_on_top_and_activates() {
        let mut stack = LayerStack::new(8, 8);
        let a = stack.add_layer("A");
        let b = stack.add_layer("B");
        assert_ne!(a, b);
        assert_eq!(names(&stack), vec!["A", "B"]);
        assert_eq!(stack.active_layer_id(), Some(b));
        assert_eq!(stack.layer(a).unwrap().surface().width(), 8);
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut stack = LayerStack::new(1, 1);
        let id = stack.add_layer("L");
        for (input, stored) in [(1.5, 1.0), (-0.2, 0.0), (0.25, 0.25), (f32::NAN, 1.0)] {
            assert!(stack.set_layer_property(id, LayerProperty::Opacity(input)));
            assert_eq!(stack.layer(id).unwrap().opacity(), stored);
        }
    }

    #[test]
    fn test_unknown_id_is_failure_not_panic() {
        let mut stack = LayerStack::new(1, 1);
        let ghost = LayerId::new(99);
        assert!(!stack.remove_layer(ghost));
        assert!(!stack.set_active_layer(ghost));
        assert!(!stack.set_layer_property(ghost, LayerProperty::Visible(false)));
        assert!(!stack.move_layer(ghost, 0));
        assert_eq!(stack.duplicate_layer(ghost), None);
        assert_eq!(stack.snapshot_layer(ghost), None);
        assert_eq!(stack.restore_layer(ghost, vec![]), Ok(false));
    }

    #[test]
    fn test_remove_active_reassigns_to_lower_layer() {
        let mut stack = LayerStack::new(1, 1);
        let a = stack.add_layer("A");
        let b = stack.add_layer("B");
        let c = stack.add_layer("C");

        assert!(stack.remove_layer(c));
        assert_eq!(stack.active_layer_id(), Some(b));

        // removing a non-active layer keeps the active one
        assert!(stack.remove_layer(a));
        assert_eq!(stack.active_layer_id(), Some(b));

        assert!(stack.remove_layer(b));
        assert_eq!(stack.active_layer_id(), None);
        assert!(stack.active_layer().is_none());
    }

    #[test]
    fn test_remove_bottom_active_layer_activates_new_bottom() {
        let mut stack = LayerStack::new(1, 1);
        let a = stack.add_layer("A");
        let b = stack.add_layer("B");
        stack.set_active_layer(a);
        stack.remove_layer(a);
        assert_eq!(stack.active_layer_id(), Some(b));
    }

    #[test]
    fn test_duplicate_and_move() {
        let mut stack = LayerStack::new(2, 2);
        let a = stack.add_layer("A");
        stack.add_layer("B");
        stack.layer_mut(a).unwrap().surface_mut().set_pixel(1, 1, [1, 2, 3, 4]);

        let copy = stack.duplicate_layer(a).unwrap();
        assert_eq!(names(&stack), vec!["A", "A copy", "B"]);
        assert_eq!(stack.active_layer_id(), Some(copy));
        assert_eq!(stack.layer(copy).unwrap().surface().get_pixel(1, 1), [1, 2, 3, 4]);

        assert!(stack.move_layer(a, 10));
        assert_eq!(names(&stack), vec!["A copy", "B", "A"]);
    }

    #[test]
    fn test_parse_property() {
        assert_eq!(
            LayerProperty::parse("opacity", "0.5"),
            Some(LayerProperty::Opacity(0.5))
        );
        assert_eq!(
            LayerProperty::parse("blendMode", "unheard-of"),
            Some(LayerProperty::BlendMode(BlendMode::Normal))
        );
        assert_eq!(
            LayerProperty::parse("visible", "false"),
            Some(LayerProperty::Visible(false))
        );
        assert_eq!(LayerProperty::parse("opacity", "lots"), None);
        assert_eq!(LayerProperty::parse("color", "red"), None);
    }

    #[test]
    fn test_resize_canvas_keeps_layers_in_sync() {
        let mut stack = LayerStack::new(4, 4);
        let a = stack.add_layer("A");
        stack.resize_canvas(6, 3);
        let surface = stack.layer(a).unwrap().surface();
        assert_eq!((surface.width(), surface.height()), (6, 3));
        let b = stack.add_layer("B");
        assert_eq!(stack.layer(b).unwrap().surface().width(), 6);
    }

    #[test]
    fn test_layer_surface_keeps_canvas_size() {
        let mut stack = LayerStack::new(4, 4);
        let id = stack.add_layer("A");
        {
            let mut pixels = stack.layer_mut(id).unwrap().surface_mut();
            pixels.resize(16, 1);
            pixels.blit(&Surface::filled(8, 8, [7, 7, 7, 255]), 2, 2);
            assert_eq!((pixels.width(), pixels.height()), (4, 4));
        }
        let surface = stack.layer(id).unwrap().surface();
        assert_eq!((surface.width(), surface.height()), (4, 4));
        assert_eq!(surface.get_pixel(3, 3), [7, 7, 7, 255]);
        assert_eq!(surface.get_pixel(1, 1), [0, 0, 0, 0]);

        let before = stack.snapshot_layer(id).unwrap();
        stack.resize_canvas(6, 2);
        assert_eq!(stack.layer(id).unwrap().surface().width(), 6);
        assert!(stack.restore_layer(id, before).is_err());
    }

    #[test]
    fn test_snapshot_restore() {
        let mut stack = LayerStack::new(2, 1);
        let id = stack.add_layer("A");
        let before = stack.snapshot_layer(id).unwrap();
        stack.active_layer_mut().unwrap().surface_mut().clear([9, 9, 9, 255]);
        assert_eq!(stack.restore_layer(id, before), Ok(true));
        assert_eq!(stack.layer(id).unwrap().surface().get_pixel(0, 0), [0, 0, 0, 0]);
        assert!(stack.restore_layer(id, vec![0; 3]).is_err());
    }

    #[test]
    fn test_transform_order() {
        let t = LayerTransform {
            translate_x: 10.0,
            translate_y: 0.0,
            scale_x: 2.0,
            scale_y: 2.0,
            rotation: 0.0,
        };
        let p = t.to_affine().transform_point(pigment_core::Point::new(1.0, 1.0));
        assert_eq!((p.x, p.y), (12.0, 2.0));
        assert!(LayerTransform::default().is_identity());
    }
}
