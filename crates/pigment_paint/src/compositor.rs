//! Layer compositing
//!
//! Flattens a [`LayerStack`] into an output surface: the output is cleared,
//! then every visible layer is blended in from bottom to top with its
//! opacity, blend mode and transform. Layer surfaces are only read.

use pigment_core::{blend_pixel, Point, TRANSPARENT_PIXEL};

use crate::layer::{Layer, LayerStack};
use crate::surface::RasterSurface;

/// Recomposite `stack` into `output`
pub fn composite<S: RasterSurface>(stack: &LayerStack, output: &mut S) {
    output.clear(TRANSPARENT_PIXEL);
    let visible = stack.layers().iter().filter(|l| l.visible).count();
    tracing::trace!(
        layers = stack.len(),
        visible,
        width = output.width(),
        height = output.height(),
        "compositing"
    );
    for layer in stack.layers().iter().filter(|l| l.visible) {
        composite_layer(layer, output);
    }
}

/// Blend one layer onto `output`. Locked layers render like any other.
pub fn composite_layer<S: RasterSurface>(layer: &Layer, output: &mut S) {
    if layer.opacity() <= 0.0 {
        return;
    }
    let surface = layer.surface();
    let (width, height) = (output.width() as i32, output.height() as i32);

    if layer.transform.is_identity() {
        for y in 0..height {
            for x in 0..width {
                let src = surface.get_pixel(x, y);
                if src[3] == 0 {
                    continue;
                }
                let dst = output.get_pixel(x, y);
                output.set_pixel(x, y, blend_pixel(layer.blend_mode, src, dst, layer.opacity()));
            }
        }
        return;
    }

    // Sample the layer at the inverse-mapped centre of each output pixel
    let Some(inverse) = layer.transform.to_affine().invert() else {
        tracing::debug!(id = ?layer.id(), "skipping layer with singular transform");
        return;
    };
    for y in 0..height {
        for x in 0..width {
            let p = inverse.transform_point(Point::new(x as f32 + 0.5, y as f32 + 0.5));
            let src = surface.get_pixel(p.x.floor() as i32, p.y.floor() as i32);
            if src[3] == 0 {
                continue;
            }
            let dst = output.get_pixel(x, y);
            output.set_pixel(x, y, blend_pixel(layer.blend_mode, src, dst, layer.opacity()));
        }
    }
}
