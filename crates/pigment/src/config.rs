//! Editor configuration (pigment.toml)
//!
//! Every section and field is optional; missing values take their defaults.
//!
//! ```toml
//! [canvas]
//! width = 1024
//! height = 768
//! background = "#ffffff"
//!
//! [stabilizer]
//! smoothing_level = 10
//! prediction_strength = 0.3
//!
//! [pressure]
//! curve = "ease-out"
//!
//! [brush]
//! size = 12.0
//! color = "#202020"
//!
//! [selection]
//! tolerance = 16.0
//! ```

use std::fs;
use std::path::Path;

use pigment_core::Color;
use pigment_input::{AirbrushSettings, BrushSettings, PressureConfig, StabilizerConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be written back out
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level editor configuration
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub stabilizer: StabilizerConfig,
    #[serde(default)]
    pub pressure: PressureConfig,
    #[serde(default)]
    pub brush: BrushConfig,
    #[serde(default)]
    pub airbrush: AirbrushSettings,
    #[serde(default)]
    pub selection: SelectionConfig,
}

/// Document canvas
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// `#RRGGBB` or `#RRGGBBAA`
    #[serde(default = "default_background")]
    pub background: String,
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_background() -> String {
    "#ffffff".to_string()
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background: default_background(),
        }
    }
}

impl CanvasConfig {
    /// Parsed background color; unparsable values fall back to white
    pub fn background_color(&self) -> Color {
        parse_color(&self.background, Color::WHITE, "canvas.background")
    }
}

/// Brush defaults
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct BrushConfig {
    #[serde(default = "default_brush_size")]
    pub size: f32,
    #[serde(default = "default_one")]
    pub opacity: f32,
    #[serde(default = "default_one")]
    pub flow: f32,
    #[serde(default = "default_true")]
    pub pressure_sensitive: bool,
    #[serde(default = "default_brush_color")]
    pub color: String,
    /// Radians
    #[serde(default = "default_calligraphy_angle")]
    pub calligraphy_angle: f32,
    #[serde(default = "default_calligraphy_ratio")]
    pub calligraphy_ratio: f32,
}

fn default_brush_size() -> f32 {
    10.0
}

fn default_one() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_brush_color() -> String {
    "#000000".to_string()
}

fn default_calligraphy_angle() -> f32 {
    std::f32::consts::FRAC_PI_4
}

fn default_calligraphy_ratio() -> f32 {
    0.3
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            size: default_brush_size(),
            opacity: 1.0,
            flow: 1.0,
            pressure_sensitive: true,
            color: default_brush_color(),
            calligraphy_angle: default_calligraphy_angle(),
            calligraphy_ratio: default_calligraphy_ratio(),
        }
    }
}

impl BrushConfig {
    /// Renderer settings with every value clamped into range
    pub fn to_settings(&self) -> BrushSettings {
        BrushSettings {
            size: self.size,
            opacity: self.opacity,
            flow: self.flow,
            color: parse_color(&self.color, Color::BLACK, "brush.color"),
            pressure_sensitive: self.pressure_sensitive,
            calligraphy_angle: self.calligraphy_angle,
            calligraphy_ratio: self.calligraphy_ratio,
        }
        .sanitized()
    }
}

/// Selection tool defaults
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SelectionConfig {
    #[serde(default = "default_ants_interval")]
    pub ants_interval_ms: f64,
    /// Magic wand RGBA distance, 0 to 510
    #[serde(default = "default_tolerance")]
    pub tolerance: f32,
    #[serde(default = "default_true")]
    pub contiguous: bool,
}

fn default_ants_interval() -> f64 {
    100.0
}

fn default_tolerance() -> f32 {
    32.0
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            ants_interval_ms: default_ants_interval(),
            tolerance: default_tolerance(),
            contiguous: true,
        }
    }
}

fn parse_color(text: &str, fallback: Color, field: &str) -> Color {
    Color::parse_hex(text).unwrap_or_else(|| {
        tracing::warn!(field, value = text, "invalid color, using default");
        fallback
    })
}

impl EditorConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigment_input::PressureCurve;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!((config.canvas.width, config.canvas.height), (800, 600));
        assert_eq!(config.stabilizer.smoothing_level, 10);
        assert_eq!(config.pressure.max_velocity, 5.0);
        assert_eq!(config.airbrush.interval_ms, 30.0);
        assert_eq!(config.selection.ants_interval_ms, 100.0);
        assert_eq!(config.canvas.background_color(), Color::WHITE);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = EditorConfig::from_toml_str(
            r##"
            [canvas]
            width = 320
            background = "#ff000080"

            [stabilizer]
            prediction_strength = 0.4
            adaptive_smoothing = true

            [pressure]
            curve = "s-curve"

            [brush]
            color = "#00ff00"
            "##,
        )
        .unwrap();
        assert_eq!(config.canvas.width, 320);
        assert_eq!(config.canvas.height, 600);
        assert_eq!(config.canvas.background_color().to_rgba8(), [255, 0, 0, 128]);
        assert_eq!(config.stabilizer.smoothing_level, 10);
        assert!(config.stabilizer.adaptive_smoothing);
        assert_eq!(config.pressure.curve, PressureCurve::SCurve);
        assert_eq!(config.brush.to_settings().color, Color::GREEN);
        assert!(config.brush.pressure_sensitive);
    }

    #[test]
    fn brush_values_are_clamped() {
        let config = EditorConfig::from_toml_str("[brush]\nopacity = 3.0\nsize = -4.0\ncolor = \"nope\"")
            .unwrap();
        let settings = config.brush.to_settings();
        assert_eq!(settings.opacity, 1.0);
        assert_eq!(settings.size, 1.0);
        assert_eq!(settings.color, Color::BLACK);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = EditorConfig::from_toml_str("[canvas]\nwidth = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("Failed to parse config"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EditorConfig::load("/definitely/not/here/pigment.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = EditorConfig::default();
        config.canvas.width = 64;
        config.selection.contiguous = false;
        let text = config.to_toml().unwrap();
        assert_eq!(EditorConfig::from_toml_str(&text).unwrap(), config);
    }
}
