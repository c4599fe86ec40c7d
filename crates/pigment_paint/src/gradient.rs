//! Gradient fills
//!
//! A gradient is a list of color stops interpolated along one parameter
//! `t ∈ [0, 1]`. Linear and radial gradients derive `t` geometrically for
//! any point, so they can be sampled lazily. Conic gradients map the angle
//! around their center to `t` and are pre-rendered into a surface, since
//! most 2D drawing back ends only take linear and radial fills natively.
//!
//! Stops are expected sorted by position. For unsorted input every adjacent
//! pair is tested in order and the *last* pair that brackets `t` wins, so
//! results depend on stop order.

use std::f32::consts::TAU;

use pigment_core::{Color, Pixel, Point, TRANSPARENT_PIXEL};

use crate::surface::{RasterSurface, Surface};

/// A gradient stop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// 0.0 to 1.0
    pub position: f32,
    /// Color; its alpha channel is the stop's alpha
    pub color: Color,
}

impl ColorStop {
    pub fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// Gradient geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientKind {
    Linear { start: Point, end: Point },
    Radial { center: Point, radius: f32 },
    Conic { center: Point, start_angle: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct GradientDefinition {
    pub kind: GradientKind,
    pub stops: Vec<ColorStop>,
}

impl GradientDefinition {
    pub fn new(kind: GradientKind, stops: Vec<ColorStop>) -> Self {
        Self { kind, stops }
    }

    /// Create a simple linear gradient between two colors
    pub fn linear_simple(start: Point, end: Point, from: Color, to: Color) -> Self {
        Self::new(
            GradientKind::Linear { start, end },
            vec![ColorStop::new(0.0, from), ColorStop::new(1.0, to)],
        )
    }

    /// Create a simple radial gradient between two colors
    pub fn radial_simple(center: Point, radius: f32, from: Color, to: Color) -> Self {
        Self::new(
            GradientKind::Radial { center, radius },
            vec![ColorStop::new(0.0, from), ColorStop::new(1.0, to)],
        )
    }

    /// Gradient parameter for a document-space point
    pub fn position_at(&self, point: Point) -> f32 {
        match self.kind {
            GradientKind::Linear { start, end } => {
                let axis = end - start;
                let len_sq = axis.x * axis.x + axis.y * axis.y;
                if len_sq <= f32::EPSILON {
                    return 0.0;
                }
                let rel = point - start;
                ((rel.x * axis.x + rel.y * axis.y) / len_sq).clamp(0.0, 1.0)
            }
            GradientKind::Radial { center, radius } => {
                if radius <= 0.0 {
                    return 1.0;
                }
                (point.distance_to(center) / radius).clamp(0.0, 1.0)
            }
            GradientKind::Conic {
                center,
                start_angle,
            } => {
                let d = point - center;
                let angle = d.y.atan2(d.x) - start_angle;
                let t = angle.rem_euclid(TAU) / TAU;
                // rem_euclid can round up to exactly TAU
                if t >= 1.0 {
                    0.0
                } else {
                    t
                }
            }
        }
    }

    /// Color at a document-space point
    pub fn sample_at(&self, point: Point) -> Pixel {
        sample(self, self.position_at(point))
    }
}

/// Interpolated color at `t`.
///
/// No stops yields transparent black; a single stop yields that stop's
/// color everywhere.
pub fn sample(definition: &GradientDefinition, t: f32) -> Pixel {
    sample_color(&definition.stops, t).map_or(TRANSPARENT_PIXEL, |c| c.to_rgba8())
}

/// Interpolate `stops` at `t`, `None` when there are no stops
pub fn sample_color(stops: &[ColorStop], t: f32) -> Option<Color> {
    let first = stops.first()?;
    let last = stops.last()?;
    if stops.len() == 1 {
        return Some(first.color);
    }

    let mut bracket = None;
    for pair in stops.windows(2) {
        if pair[0].position <= t && t <= pair[1].position {
            bracket = Some((pair[0], pair[1]));
        }
    }

    let Some((before, after)) = bracket else {
        let all_below = stops.iter().all(|s| s.position < t);
        return Some(if all_below { last.color } else { first.color });
    };

    let span = after.position - before.position;
    let factor = if span == 0.0 {
        0.0
    } else {
        (t - before.position) / span
    };
    Some(before.color.lerp(after.color, factor))
}

/// Render any gradient into a `width × height` surface
pub fn render(definition: &GradientDefinition, width: u32, height: u32) -> Surface {
    let mut surface = Surface::new(width, height);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            surface.set_pixel(x, y, definition.sample_at(center));
        }
    }
    surface
}

/// Pre-render a conic gradient around `center` into a `size` buffer.
///
/// The definition's own geometry is ignored apart from a conic start angle.
pub fn render_conic(definition: &GradientDefinition, center: Point, size: (u32, u32)) -> Surface {
    let start_angle = match definition.kind {
        GradientKind::Conic { start_angle, .. } => start_angle,
        _ => 0.0,
    };
    let conic = GradientDefinition {
        kind: GradientKind::Conic {
            center,
            start_angle,
        },
        stops: definition.stops.clone(),
    };
    tracing::trace!(width = size.0, height = size.1, "rendering conic gradient");
    render(&conic, size.0, size.1)
}
