//! Layer stack compositing end to end

use pigment_core::{BlendMode, Pixel};
use pigment_paint::{
    composite, GradientDefinition, LayerProperty, LayerStack, LayerTransform, RasterSurface,
    Surface,
};

const SIZE: u32 = 16;
const BACKGROUND: Pixel = [200, 120, 40, 255];
const WHITE: Pixel = [255, 255, 255, 255];

fn background_stack() -> LayerStack {
    let mut stack = LayerStack::new(SIZE, SIZE);
    stack.add_layer("Background");
    stack
        .active_layer_mut()
        .unwrap()
        .surface_mut()
        .clear(BACKGROUND);
    stack
}

fn flatten(stack: &LayerStack) -> Surface {
    let mut out = Surface::new(stack.width(), stack.height());
    composite(stack, &mut out);
    out
}

#[test]
fn multiply_white_at_half_opacity_leaves_background_unchanged() {
    let mut stack = background_stack();
    let overlay = stack.add_layer("Overlay");
    stack.set_layer_property(overlay, LayerProperty::BlendMode(BlendMode::Multiply));
    stack.set_layer_property(overlay, LayerProperty::Opacity(0.5));
    stack
        .layer_mut(overlay)
        .unwrap()
        .surface_mut()
        .fill_where(WHITE, |x, _| x < SIZE as i32 / 2);

    let out = flatten(&stack);
    for y in 0..SIZE as i32 {
        for x in 0..SIZE as i32 {
            assert_eq!(out.get_pixel(x, y), BACKGROUND, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn opaque_normal_layer_occludes_what_is_below() {
    let mut stack = background_stack();
    let top = stack.add_layer("Top");
    stack
        .layer_mut(top)
        .unwrap()
        .surface_mut()
        .clear([0, 0, 255, 255]);

    let out = flatten(&stack);
    assert_eq!(out.get_pixel(3, 3), [0, 0, 255, 255]);

    stack.set_layer_property(top, LayerProperty::Visible(false));
    assert_eq!(flatten(&stack).get_pixel(3, 3), BACKGROUND);

    stack.set_layer_property(top, LayerProperty::Visible(true));
    stack.set_layer_property(top, LayerProperty::Opacity(0.0));
    assert_eq!(flatten(&stack).get_pixel(3, 3), BACKGROUND);
}

#[test]
fn reordering_changes_which_layer_wins() {
    let mut stack = background_stack();
    let background = stack.layers()[0].id();
    let red = stack.add_layer("Red");
    stack.layer_mut(red).unwrap().surface_mut().clear([255, 0, 0, 255]);

    assert_eq!(flatten(&stack).get_pixel(0, 0), [255, 0, 0, 255]);
    assert!(stack.move_layer(background, 5));
    assert_eq!(flatten(&stack).get_pixel(0, 0), BACKGROUND);
}

#[test]
fn translated_layer_is_sampled_at_its_offset() {
    let mut stack = LayerStack::new(SIZE, SIZE);
    let id = stack.add_layer("Dot");
    stack.layer_mut(id).unwrap().surface_mut().set_pixel(0, 0, WHITE);
    stack.set_layer_property(id, LayerProperty::Transform(LayerTransform::translated(4.0, 2.0)));

    let out = flatten(&stack);
    assert_eq!(out.get_pixel(4, 2), WHITE);
    assert_eq!(out.get_pixel(0, 0)[3], 0);
}

#[test]
fn snapshot_restore_roundtrips_layer_pixels() {
    let mut stack = background_stack();
    let id = stack.layers()[0].id();
    let before = stack.snapshot_layer(id).unwrap();

    stack.layer_mut(id).unwrap().surface_mut().clear(WHITE);
    assert_eq!(flatten(&stack).get_pixel(1, 1), WHITE);

    assert!(stack.restore_layer(id, before).unwrap());
    assert_eq!(flatten(&stack).get_pixel(1, 1), BACKGROUND);
    assert!(stack.restore_layer(id, vec![0; 3]).is_err());
}

#[test]
fn gradient_layer_composites_over_background() {
    let mut stack = background_stack();
    let id = stack.add_layer("Gradient");
    let definition = GradientDefinition::linear_simple(
        pigment_core::Point::new(0.0, 0.0),
        pigment_core::Point::new(SIZE as f32, 0.0),
        pigment_core::Color::BLACK,
        pigment_core::Color::WHITE,
    );
    let fill = pigment_paint::render(&definition, SIZE, SIZE);
    stack.layer_mut(id).unwrap().surface_mut().blit(&fill, 0, 0);

    let out = flatten(&stack);
    let left = out.get_pixel(0, 8);
    let right = out.get_pixel(SIZE as i32 - 1, 8);
    assert!(left[0] < 20, "left edge should be near black: {left:?}");
    assert!(right[0] > 235, "right edge should be near white: {right:?}");
    assert_eq!(left[3], 255);
}
