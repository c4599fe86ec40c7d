//! Brush rendering
//!
//! Turns stroke points into dabs on a raster surface. Every brush derives a
//! per-dab width and opacity from pressure:
//!
//! | kind        | width                    | opacity                     |
//! |-------------|--------------------------|-----------------------------|
//! | brush       | `size · (0.3 + 0.7p)`    | `opacity · flow · p`        |
//! | eraser      | same as brush            | same as brush, removes alpha|
//! | calligraphy | same as brush, elliptical| same as brush               |
//! | pencil      | `size`                   | `1.0`                       |
//! | airbrush    | scattered 1px dabs       | `airbrush.opacity · p`      |
//!
//! With pressure sensitivity off, `p` is treated as 1.0 everywhere.
//!
//! Every pixel write goes through a caller-supplied clip predicate, which
//! is how an active selection restricts painting.

use std::f32::consts::{FRAC_PI_4, TAU};

use pigment_core::{blend_pixel, BlendMode, Color, Pixel, Point};
use pigment_paint::RasterSurface;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::point::StrokePoint;

/// Paint tool variants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrushKind {
    #[default]
    Brush,
    Pencil,
    Eraser,
    Airbrush,
    Calligraphy,
}

/// Width and opacity of a dab
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentDynamics {
    pub width: f32,
    pub opacity: f32,
}

/// Brush options shared by all kinds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushSettings {
    pub size: f32,
    pub opacity: f32,
    pub flow: f32,
    pub color: Color,
    pub pressure_sensitive: bool,
    /// Nib angle in radians
    pub calligraphy_angle: f32,
    /// Nib minor axis as a fraction of the major axis
    pub calligraphy_ratio: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            size: 10.0,
            opacity: 1.0,
            flow: 1.0,
            color: Color::BLACK,
            pressure_sensitive: true,
            calligraphy_angle: FRAC_PI_4,
            calligraphy_ratio: 0.3,
        }
    }
}

impl BrushSettings {
    /// Clamp every field into its valid range
    pub fn sanitized(mut self) -> Self {
        self.size = finite_or(self.size, 10.0).max(1.0);
        self.opacity = finite_or(self.opacity, 1.0).clamp(0.0, 1.0);
        self.flow = finite_or(self.flow, 1.0).clamp(0.0, 1.0);
        self.calligraphy_angle = finite_or(self.calligraphy_angle, FRAC_PI_4);
        self.calligraphy_ratio = finite_or(self.calligraphy_ratio, 0.3).clamp(0.05, 1.0);
        self
    }
}

/// Airbrush scatter options
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirbrushSettings {
    /// Repeat period while the pointer is held down
    pub interval_ms: f64,
    pub radius: f32,
    /// Dabs per spray
    pub density: u32,
    pub opacity: f32,
}

impl Default for AirbrushSettings {
    fn default() -> Self {
        Self {
            interval_ms: 30.0,
            radius: 20.0,
            density: 12,
            opacity: 0.1,
        }
    }
}

impl AirbrushSettings {
    pub fn sanitized(mut self) -> Self {
        self.interval_ms = if self.interval_ms.is_finite() {
            self.interval_ms.max(1.0)
        } else {
            30.0
        };
        self.radius = finite_or(self.radius, 20.0).max(0.5);
        self.opacity = finite_or(self.opacity, 0.1).clamp(0.0, 1.0);
        self
    }
}

/// Upper bound on dabs stamped for one segment
const MAX_SEGMENT_STEPS: usize = 4096;

/// Parameter range `[t0, t1]` of `start → end` inside the box `min..max`
/// (Liang-Barsky), or `None` when the segment misses it
fn clip_segment(start: Point, end: Point, min: Point, max: Point) -> Option<(f32, f32)> {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;
    for (p, q) in [
        (-dx, start.x - min.x),
        (dx, max.x - start.x),
        (-dy, start.y - min.y),
        (dy, max.y - start.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

impl BrushKind {
    /// Dab width and opacity at `pressure`
    pub fn dynamics(&self, settings: &BrushSettings, pressure: f32) -> SegmentDynamics {
        let p = if settings.pressure_sensitive {
            pressure.clamp(0.0, 1.0)
        } else {
            1.0
        };
        match self {
            BrushKind::Pencil => SegmentDynamics {
                width: settings.size,
                opacity: 1.0,
            },
            BrushKind::Brush | BrushKind::Eraser | BrushKind::Calligraphy | BrushKind::Airbrush => {
                SegmentDynamics {
                    width: settings.size * (0.3 + 0.7 * p),
                    opacity: settings.opacity * settings.flow * p,
                }
            }
        }
    }
}

/// Stamps dabs for one brush kind
#[derive(Clone, Copy, Debug, Default)]
pub struct BrushRenderer {
    pub kind: BrushKind,
    pub settings: BrushSettings,
    pub airbrush: AirbrushSettings,
}

impl BrushRenderer {
    pub fn new(kind: BrushKind, settings: BrushSettings, airbrush: AirbrushSettings) -> Self {
        Self {
            kind,
            settings: settings.sanitized(),
            airbrush: airbrush.sanitized(),
        }
    }

    /// Stamp a single dab at `point`. Returns the number of pixels written.
    pub fn dab<S, C>(&self, surface: &mut S, point: &StrokePoint, clip: C) -> usize
    where
        S: RasterSurface,
        C: Fn(i32, i32) -> bool,
    {
        let dynamics = self.kind.dynamics(&self.settings, point.pressure);
        self.stamp(surface, point.position(), dynamics, &clip)
    }

    /// Stamp dabs along `from → to`, excluding `from` itself, spaced a
    /// quarter of the dab width apart. Pressure is interpolated along the
    /// segment. Stretches that cannot touch the surface are skipped, and a
    /// segment with non-finite endpoints paints nothing. Returns the number
    /// of pixels written.
    pub fn stroke_segment<S, C>(
        &self,
        surface: &mut S,
        from: &StrokePoint,
        to: &StrokePoint,
        clip: C,
    ) -> usize
    where
        S: RasterSurface,
        C: Fn(i32, i32) -> bool,
    {
        let start = from.position();
        let end = to.position();
        if ![start.x, start.y, end.x, end.y].iter().all(|v| v.is_finite()) {
            return 0;
        }
        let widest = self
            .kind
            .dynamics(&self.settings, from.pressure.max(to.pressure))
            .width;
        let spacing = (widest / 4.0).max(1.0);

        // Only the part of the segment whose dabs can reach the surface
        let margin = widest / 2.0 + 2.0;
        let Some((t0, t1)) = clip_segment(
            start,
            end,
            Point::new(-margin, -margin),
            Point::new(surface.width() as f32 + margin, surface.height() as f32 + margin),
        ) else {
            return 0;
        };
        let distance = start.lerp(end, t0).distance_to(start.lerp(end, t1));
        if !distance.is_finite() {
            return 0;
        }
        let steps = (distance / spacing)
            .ceil()
            .clamp(1.0, MAX_SEGMENT_STEPS as f32) as usize;

        let mut written = 0;
        for i in 1..=steps {
            let t = t0 + (t1 - t0) * (i as f32 / steps as f32);
            let pressure = from.pressure + (to.pressure - from.pressure) * t;
            let dynamics = self.kind.dynamics(&self.settings, pressure);
            written += self.stamp(surface, start.lerp(end, t), dynamics, &clip);
        }
        written
    }

    /// Scatter `density` single-pixel dabs uniformly inside the airbrush
    /// radius around `center`. Returns the number of pixels written.
    pub fn spray<S, R, C>(
        &self,
        surface: &mut S,
        center: Point,
        pressure: f32,
        rng: &mut R,
        clip: C,
    ) -> usize
    where
        S: RasterSurface,
        R: Rng,
        C: Fn(i32, i32) -> bool,
    {
        let p = if self.settings.pressure_sensitive {
            pressure.clamp(0.0, 1.0)
        } else {
            1.0
        };
        let opacity = self.airbrush.opacity * p;
        if opacity <= 0.0 {
            return 0;
        }
        let color = self.settings.color.to_rgba8();
        let mut written = 0;
        for _ in 0..self.airbrush.density {
            // sqrt keeps the distribution uniform over the disc area
            let r = self.airbrush.radius * rng.gen::<f32>().sqrt();
            let theta = rng.gen::<f32>() * TAU;
            let x = (center.x + r * theta.cos()).floor() as i32;
            let y = (center.y + r * theta.sin()).floor() as i32;
            if surface.contains(x, y) && clip(x, y) {
                let dst = surface.get_pixel(x, y);
                surface.set_pixel(x, y, blend_pixel(BlendMode::Normal, color, dst, opacity));
                written += 1;
            }
        }
        written
    }

    fn stamp<S, C>(&self, surface: &mut S, center: Point, dynamics: SegmentDynamics, clip: &C) -> usize
    where
        S: RasterSurface,
        C: Fn(i32, i32) -> bool,
    {
        if dynamics.opacity <= 0.0 {
            return 0;
        }
        let radius = (dynamics.width / 2.0).max(0.5);
        let footprint = match self.kind {
            BrushKind::Calligraphy => Footprint::ellipse(
                radius,
                (radius * self.settings.calligraphy_ratio).max(0.5),
                self.settings.calligraphy_angle,
            ),
            _ => Footprint::Round { radius },
        };
        if !center.x.is_finite() || !center.y.is_finite() {
            return 0;
        }
        // Saturating casts; the loops only visit pixels on the surface
        let reach = (radius.ceil() as i64).saturating_add(1);
        let (cx, cy) = (center.x.floor() as i64, center.y.floor() as i64);
        let xs = cx.saturating_sub(reach).max(0)
            ..=cx.saturating_add(reach).min(surface.width() as i64 - 1);
        let ys = cy.saturating_sub(reach).max(0)
            ..=cy.saturating_add(reach).min(surface.height() as i64 - 1);
        let color = self.settings.color.to_rgba8();

        let mut written = 0;
        for y in ys {
            for x in xs.clone() {
                let covered = (x == cx && y == cy)
                    || footprint.contains(x as f32 + 0.5 - center.x, y as f32 + 0.5 - center.y);
                let (x, y) = (x as i32, y as i32);
                if !covered || !clip(x, y) {
                    continue;
                }
                let dst = surface.get_pixel(x, y);
                surface.set_pixel(x, y, self.apply(color, dst, dynamics.opacity));
                written += 1;
            }
        }
        written
    }

    fn apply(&self, color: Pixel, dst: Pixel, opacity: f32) -> Pixel {
        match self.kind {
            BrushKind::Eraser => {
                let alpha = dst[3] as f32 * (1.0 - opacity);
                [dst[0], dst[1], dst[2], alpha.round().clamp(0.0, 255.0) as u8]
            }
            _ => blend_pixel(BlendMode::Normal, color, dst, opacity),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Footprint {
    Round {
        radius: f32,
    },
    Ellipse {
        major: f32,
        minor: f32,
        cos: f32,
        sin: f32,
    },
}

impl Footprint {
    fn ellipse(major: f32, minor: f32, angle: f32) -> Self {
        Footprint::Ellipse {
            major,
            minor,
            cos: angle.cos(),
            sin: angle.sin(),
        }
    }

    fn contains(&self, dx: f32, dy: f32) -> bool {
        match *self {
            Footprint::Round { radius } => dx * dx + dy * dy <= radius * radius,
            Footprint::Ellipse {
                major,
                minor,
                cos,
                sin,
            } => {
                let u = (dx * cos + dy * sin) / major;
                let v = (-dx * sin + dy * cos) / minor;
                u * u + v * v <= 1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigment_paint::Surface;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn point(x: f32, y: f32, pressure: f32) -> StrokePoint {
        StrokePoint::new(x, y, pressure, 0.0)
    }

    fn painted(surface: &Surface) -> usize {
        surface.as_image().pixels().filter(|p| p.0[3] > 0).count()
    }

    #[test]
    fn test_pressure_dynamics() {
        let settings = BrushSettings {
            size: 20.0,
            opacity: 0.8,
            flow: 0.5,
            ..Default::default()
        };
        let d = BrushKind::Brush.dynamics(&settings, 0.5);
        assert!((d.width - 20.0 * 0.65).abs() < 1e-5);
        assert!((d.opacity - 0.2).abs() < 1e-6);

        let pencil = BrushKind::Pencil.dynamics(&settings, 0.1);
        assert_eq!(pencil, SegmentDynamics { width: 20.0, opacity: 1.0 });

        let flat = BrushSettings {
            pressure_sensitive: false,
            ..settings
        };
        let d = BrushKind::Eraser.dynamics(&flat, 0.1);
        assert_eq!(d.width, 20.0);
        assert!((d.opacity - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_segment_covers_the_path() {
        let renderer = BrushRenderer::new(
            BrushKind::Pencil,
            BrushSettings {
                size: 2.0,
                ..Default::default()
            },
            AirbrushSettings::default(),
        );
        let mut surface = Surface::new(20, 5);
        renderer.stroke_segment(&mut surface, &point(1.0, 2.0, 1.0), &point(18.0, 2.0, 1.0), |_, _| true);
        for x in 2..18 {
            assert_eq!(surface.get_pixel(x, 2), [0, 0, 0, 255], "x = {x}");
        }
        assert_eq!(surface.get_pixel(10, 4), [0, 0, 0, 0]);
    }

    #[test]
    fn test_far_segment_paints_only_the_visible_stretch() {
        let renderer = BrushRenderer::new(
            BrushKind::Pencil,
            BrushSettings {
                size: 1.0,
                ..Default::default()
            },
            AirbrushSettings::default(),
        );
        let mut surface = Surface::new(16, 8);
        let written = renderer.stroke_segment(
            &mut surface,
            &point(0.5, 4.5, 1.0),
            &point(1e30, 4.5, 1.0),
            |_, _| true,
        );
        assert!(written > 0);
        for x in 1..16 {
            assert_eq!(surface.get_pixel(x, 4), [0, 0, 0, 255], "x = {x}");
        }
        assert_eq!(painted(&surface), 15);

    }

    #[test]
    fn test_segment_crossing_the_surface_is_clipped() {
        let renderer = BrushRenderer::new(
            BrushKind::Pencil,
            BrushSettings {
                size: 8.0,
                ..Default::default()
            },
            AirbrushSettings::default(),
        );
        let mut surface = Surface::new(16, 8);
        let written = renderer.stroke_segment(
            &mut surface,
            &point(-1e7, 1.5, 1.0),
            &point(1e7, 1.5, 1.0),
            |_, _| true,
        );
        assert!(written > 0);
        for x in 0..16 {
            assert_eq!(surface.get_pixel(x, 1), [0, 0, 0, 255], "x = {x}");
        }
        assert_eq!(surface.get_pixel(8, 7), [0, 0, 0, 0]);
    }

    #[test]
    fn test_non_finite_segment_paints_nothing() {
        let renderer = BrushRenderer::default();
        let mut surface = Surface::new(8, 8);
        let start = point(2.0, 2.0, 1.0);
        for end in [point(f32::NAN, 3.0, 1.0), point(f32::INFINITY, 3.0, 1.0)] {
            assert_eq!(renderer.stroke_segment(&mut surface, &start, &end, |_, _| true), 0);
        }
        assert_eq!(renderer.dab(&mut surface, &point(f32::NAN, 1.0, 1.0), |_, _| true), 0);
        assert_eq!(painted(&surface), 0);

        // A huge nib is bounded by the surface
        let wide = BrushRenderer::new(
            BrushKind::Pencil,
            BrushSettings {
                size: 1e9,
                ..Default::default()
            },
            AirbrushSettings::default(),
        );
        assert_eq!(wide.dab(&mut surface, &start, |_, _| true), 64);
    }

    #[test]
    fn test_clip_blocks_writes() {
        let renderer = BrushRenderer::default();
        let mut surface = Surface::new(20, 20);
        renderer.stroke_segment(&mut surface, &point(0.0, 10.0, 1.0), &point(20.0, 10.0, 1.0), |x, _| x < 10);
        assert!(painted(&surface) > 0);
        for y in 0..20 {
            for x in 10..20 {
                assert_eq!(surface.get_pixel(x, y)[3], 0);
            }
        }
    }

    #[test]
    fn test_eraser_reduces_alpha() {
        let renderer = BrushRenderer::new(
            BrushKind::Eraser,
            BrushSettings {
                opacity: 0.5,
                pressure_sensitive: false,
                ..Default::default()
            },
            AirbrushSettings::default(),
        );
        let mut surface = Surface::filled(10, 10, [200, 10, 10, 255]);
        renderer.dab(&mut surface, &point(5.0, 5.0, 1.0), |_, _| true);
        assert_eq!(surface.get_pixel(5, 5), [200, 10, 10, 128]);
        assert_eq!(surface.get_pixel(0, 0), [200, 10, 10, 255]);
    }

    #[test]
    fn test_calligraphy_nib_is_elongated() {
        let renderer = BrushRenderer::new(
            BrushKind::Calligraphy,
            BrushSettings {
                size: 16.0,
                pressure_sensitive: false,
                calligraphy_angle: 0.0,
                calligraphy_ratio: 0.25,
                ..Default::default()
            },
            AirbrushSettings::default(),
        );
        let mut surface = Surface::new(32, 32);
        renderer.dab(&mut surface, &point(16.0, 16.0, 1.0), |_, _| true);
        let row = (0..32).filter(|&x| surface.get_pixel(x, 16)[3] > 0).count();
        let column = (0..32).filter(|&y| surface.get_pixel(16, y)[3] > 0).count();
        assert!(row > column * 2, "row {row}, column {column}");
    }

    #[test]
    fn test_tiny_dab_still_marks_its_pixel() {
        let renderer = BrushRenderer::new(
            BrushKind::Brush,
            BrushSettings {
                size: 1.0,
                ..Default::default()
            },
            AirbrushSettings::default(),
        );
        let mut surface = Surface::new(4, 4);
        assert_eq!(renderer.dab(&mut surface, &point(2.0, 2.0, 1.0), |_, _| true), 1);
        assert_eq!(surface.get_pixel(2, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn test_spray_stays_inside_radius() {
        let renderer = BrushRenderer::new(
            BrushKind::Airbrush,
            BrushSettings::default(),
            AirbrushSettings {
                radius: 5.0,
                density: 50,
                opacity: 0.5,
                ..Default::default()
            },
        );
        let mut surface = Surface::new(40, 40);
        let mut rng = StdRng::seed_from_u64(7);
        let written = renderer.spray(&mut surface, Point::new(20.0, 20.0), 1.0, &mut rng, |_, _| true);
        assert_eq!(written, 50);
        for (x, y, p) in surface.as_image().enumerate_pixels() {
            if p.0[3] > 0 {
                let d = Point::new(x as f32, y as f32).distance_to(Point::new(20.0, 20.0));
                assert!(d <= 6.5, "({x}, {y}) at {d}");
            }
        }
    }

    #[test]
    fn test_spray_is_reproducible_with_seed() {
        let renderer = BrushRenderer::new(BrushKind::Airbrush, BrushSettings::default(), AirbrushSettings::default());
        let mut a = Surface::new(50, 50);
        let mut b = Surface::new(50, 50);
        renderer.spray(&mut a, Point::new(25.0, 25.0), 0.8, &mut StdRng::seed_from_u64(1), |_, _| true);
        renderer.spray(&mut b, Point::new(25.0, 25.0), 0.8, &mut StdRng::seed_from_u64(1), |_, _| true);
        assert_eq!(a.diff_pixel_count(&b), 0);
        assert!(painted(&a) > 0);
    }
}
