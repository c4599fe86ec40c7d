//! Blend modes
//!
//! Per-pixel semantics follow the W3C Compositing and Blending Level 1
//! formulas on straight (non-premultiplied) alpha. Every mode goes through
//! the same alpha pipeline:
//!
//! ```text
//! Cs' = (1 - ab) * Cs + ab * B(Cb, Cs)
//! ao  = as + ab * (1 - as)
//! Co  = (as * Cs' + ab * Cb * (1 - as)) / ao
//! ```
//!
//! so `Normal` (where `B(Cb, Cs) = Cs`) reduces to plain source-over.

use crate::color::Pixel;

/// Blend mode for layer composition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

impl BlendMode {
    pub const ALL: [BlendMode; 12] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Difference,
        BlendMode::Exclusion,
    ];

    /// Resolve a compositing-operator name.
    ///
    /// Accepts the CSS names (`source-over`, `color-dodge`, ...) as well as
    /// camelCase and snake_case spellings. Anything unrecognized is `Normal`.
    pub fn from_name(name: &str) -> Self {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "multiply" => BlendMode::Multiply,
            "screen" => BlendMode::Screen,
            "overlay" => BlendMode::Overlay,
            "darken" => BlendMode::Darken,
            "lighten" => BlendMode::Lighten,
            "colordodge" => BlendMode::ColorDodge,
            "colorburn" => BlendMode::ColorBurn,
            "hardlight" => BlendMode::HardLight,
            "softlight" => BlendMode::SoftLight,
            "difference" => BlendMode::Difference,
            "exclusion" => BlendMode::Exclusion,
            _ => BlendMode::Normal,
        }
    }

    /// CSS compositing-operator name
    pub fn name(&self) -> &'static str {
        match self {
            BlendMode::Normal => "source-over",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::ColorBurn => "color-burn",
            BlendMode::HardLight => "hard-light",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Difference => "difference",
            BlendMode::Exclusion => "exclusion",
        }
    }

    /// Separable blend function `B(Cb, Cs)` on channels in `[0, 1]`
    pub fn blend_channel(&self, cb: f32, cs: f32) -> f32 {
        match self {
            BlendMode::Normal => cs,
            BlendMode::Multiply => cb * cs,
            BlendMode::Screen => screen(cb, cs),
            BlendMode::Overlay => hard_light(cs, cb),
            BlendMode::Darken => cb.min(cs),
            BlendMode::Lighten => cb.max(cs),
            BlendMode::ColorDodge => {
                if cb == 0.0 {
                    0.0
                } else if cs >= 1.0 {
                    1.0
                } else {
                    (cb / (1.0 - cs)).min(1.0)
                }
            }
            BlendMode::ColorBurn => {
                if cb >= 1.0 {
                    1.0
                } else if cs == 0.0 {
                    0.0
                } else {
                    1.0 - ((1.0 - cb) / cs).min(1.0)
                }
            }
            BlendMode::HardLight => hard_light(cb, cs),
            BlendMode::SoftLight => {
                if cs <= 0.5 {
                    cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
                } else {
                    let d = if cb <= 0.25 {
                        ((16.0 * cb - 12.0) * cb + 4.0) * cb
                    } else {
                        cb.sqrt()
                    };
                    cb + (2.0 * cs - 1.0) * (d - cb)
                }
            }
            BlendMode::Difference => (cb - cs).abs(),
            BlendMode::Exclusion => cb + cs - 2.0 * cb * cs,
        }
    }
}

fn screen(cb: f32, cs: f32) -> f32 {
    cb + cs - cb * cs
}

fn hard_light(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        cb * 2.0 * cs
    } else {
        screen(cb, 2.0 * cs - 1.0)
    }
}

/// Composite `src` over `dst` with `mode`, scaling the source alpha by
/// `opacity` first. Returns the new destination pixel.
pub fn blend_pixel(mode: BlendMode, src: Pixel, dst: Pixel, opacity: f32) -> Pixel {
    let alpha_s = src[3] as f32 / 255.0 * opacity.clamp(0.0, 1.0);
    if alpha_s <= 0.0 {
        return dst;
    }
    let alpha_b = dst[3] as f32 / 255.0;
    let alpha_o = alpha_s + alpha_b * (1.0 - alpha_s);

    let mut out = [0u8; 4];
    for i in 0..3 {
        let cs = src[i] as f32 / 255.0;
        let cb = dst[i] as f32 / 255.0;
        let mixed = (1.0 - alpha_b) * cs + alpha_b * mode.blend_channel(cb, cs);
        let co = alpha_s * mixed + alpha_b * cb * (1.0 - alpha_s);
        out[i] = to_u8(co / alpha_o);
    }
    out[3] = to_u8(alpha_o);
    out
}

fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
