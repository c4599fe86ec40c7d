//! Pointer samples through the pipeline and onto a surface

use pigment_input::{
    AirbrushSettings, BrushKind, BrushRenderer, BrushSettings, InputSample, PressureConfig,
    PressureCurve, StabilizerConfig, StrokeInputPipeline, StrokePoint,
};
use pigment_paint::{RasterSurface, Surface};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn run_stroke(pipeline: &mut StrokeInputPipeline, samples: &[InputSample]) -> Vec<StrokePoint> {
    let (first, rest) = samples.split_first().unwrap();
    let (last, middle) = rest.split_last().unwrap();
    pipeline.on_stroke_start(first);
    let mut points = Vec::new();
    for sample in middle {
        points.extend(pipeline.on_stroke_move(sample));
    }
    points.extend(pipeline.on_stroke_end(last));
    points
}

#[test]
fn zigzag_is_smoothed_but_keeps_its_endpoints() {
    let samples: Vec<InputSample> = (0..12)
        .map(|i| {
            let y = if i % 2 == 0 { 10.0 } else { 14.0 };
            InputSample::new(i as f32 * 4.0, y, i as f64 * 8.0)
        })
        .collect();
    let mut pipeline = StrokeInputPipeline::default();
    let points = run_stroke(&mut pipeline, &samples);

    assert_eq!(points.len(), samples.len());
    assert_eq!(points[0].position(), samples[0].position());
    assert_eq!(points[11].position(), samples[11].position());

    let interior = &points[1..11];
    assert!(interior.iter().all(|p| p.y > 10.0 && p.y < 14.0));
    assert!(!pipeline.is_active());
}

#[test]
fn device_pressure_goes_through_curve() {
    let config = PressureConfig {
        curve: PressureCurve::EaseIn,
        ..PressureConfig::default()
    };
    let mut pipeline = StrokeInputPipeline::new(StabilizerConfig::default(), config);
    let samples = [
        InputSample::new(0.0, 0.0, 0.0).with_pressure(0.5),
        InputSample::new(1.0, 0.0, 8.0).with_pressure(0.5),
    ];
    let points = run_stroke(&mut pipeline, &samples);

    assert_eq!(points.len(), 2);
    for point in points {
        assert!((point.pressure - 0.25).abs() < 1e-5, "{}", point.pressure);
    }
}

#[test]
fn stroke_renders_a_continuous_line() {
    let mut pipeline = StrokeInputPipeline::default();
    let samples: Vec<InputSample> = (0..=8)
        .map(|i| InputSample::new(4.0 + i as f32 * 5.0, 20.0, i as f64 * 16.0).with_pressure(1.0))
        .collect();
    let points = run_stroke(&mut pipeline, &samples);

    let brush = BrushRenderer::new(
        BrushKind::Pencil,
        BrushSettings {
            size: 4.0,
            ..BrushSettings::default()
        },
        AirbrushSettings::default(),
    );
    let mut surface = Surface::new(64, 40);
    let clip = |_: i32, _: i32| true;
    brush.dab(&mut surface, &points[0], clip);
    for pair in points.windows(2) {
        brush.stroke_segment(&mut surface, &pair[0], &pair[1], clip);
    }

    for x in 4..=44 {
        assert_eq!(surface.get_pixel(x, 20), [0, 0, 0, 255], "gap at x = {x}");
    }
    assert_eq!(surface.get_pixel(4, 30)[3], 0);
}

#[test]
fn airbrush_spray_is_reproducible_with_a_seed() {
    let brush = BrushRenderer::new(
        BrushKind::Airbrush,
        BrushSettings::default(),
        AirbrushSettings::default(),
    );
    let spray = |seed: u64| {
        let mut surface = Surface::new(48, 48);
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..5 {
            brush.spray(
                &mut surface,
                pigment_core::Point::new(24.0, 24.0),
                1.0,
                &mut rng,
                |_, _| true,
            );
        }
        surface
    };

    let a = spray(9);
    assert_eq!(a, spray(9));
    assert_eq!(a.get_pixel(0, 0)[3], 0);
    assert!(a.diff_pixel_count(&Surface::new(48, 48)) > 0);
}
