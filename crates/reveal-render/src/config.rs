//! Reveal configuration
//!
//! Everything the demo host needs to build a reveal, loadable from TOML.
//! Missing keys fall back to the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tiny_skia::Color;
use reveal_text::{TextLayoutRequest, IDEAL_RASTER_SIZE};
use crate::animation::TimingFunction;
use crate::compositor::NoisePolarity;
use crate::driver::{DriverSettings, DEFAULT_TIME_STEP};
use crate::material::MaterialBuilder;
use crate::{RevealError, Result};

/// Largest accepted noise UV multiplier
pub const MAX_NOISE_SCALE: f32 = 1024.0;

/// Reveal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealConfig {
    /// Text to reveal; `\n` separates lines
    pub text: String,
    pub font_family: String,
    /// Raster width over widest line width
    pub horizontal_padding: f32,
    /// Line spacing as a multiple of the font height
    pub line_height: f32,
    /// Preferred text raster side in pixels
    pub ideal_size: u32,
    /// `#rrggbb` or `#rrggbbaa`
    pub color: String,
    /// Length of the reveal tween
    pub duration_secs: f32,
    /// Clock advance per update
    pub time_step: f32,
    pub timing: TimingFunction,
    /// Width of the soft reveal edge, 0 for a hard cut
    pub smoothing: f32,
    pub noise_polarity: NoisePolarity,
    /// Noise UV multiplier
    pub noise_scale: f32,
    /// Greyscale noise image; generated when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_path: Option<PathBuf>,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            text: "Hello\nworld!".to_string(),
            font_family: "Nunito".to_string(),
            horizontal_padding: 1.8,
            line_height: 2.5,
            ideal_size: IDEAL_RASTER_SIZE,
            color: "#000000".to_string(),
            duration_secs: 1.0,
            time_step: DEFAULT_TIME_STEP,
            timing: TimingFunction::QuadOut,
            smoothing: 0.0,
            noise_polarity: NoisePolarity::LowFirst,
            noise_scale: 1.0,
            noise_path: None,
        }
    }
}

impl RevealConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|e| RevealError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!("Loaded reveal config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        positive("horizontal_padding", self.horizontal_padding)?;
        positive("line_height", self.line_height)?;
        positive("duration_secs", self.duration_secs)?;
        positive("time_step", self.time_step)?;
        positive("noise_scale", self.noise_scale)?;
        if self.noise_scale > MAX_NOISE_SCALE {
            return Err(RevealError::Config(format!(
                "noise_scale must be at most {}, got {}",
                MAX_NOISE_SCALE, self.noise_scale
            )));
        }
        if !self.smoothing.is_finite() || self.smoothing < 0.0 {
            return Err(RevealError::Config(format!(
                "smoothing must be a non-negative number, got {}",
                self.smoothing
            )));
        }
        if self.ideal_size == 0 {
            return Err(RevealError::Config("ideal_size must be positive".into()));
        }
        self.color()?;
        Ok(())
    }

    pub fn layout_request(&self) -> TextLayoutRequest {
        TextLayoutRequest::new(self.text.clone())
            .font_family(self.font_family.clone())
            .horizontal_padding(self.horizontal_padding)
            .line_height(self.line_height)
    }

    pub fn driver_settings(&self) -> DriverSettings {
        let duration = Duration::try_from_secs_f32(self.duration_secs.max(0.0)).unwrap_or_default();
        DriverSettings {
            duration,
            time_step: self.time_step,
            timing: self.timing,
        }
    }

    /// Parsed reveal color
    pub fn color(&self) -> Result<Color> {
        parse_hex_color(&self.color)
            .ok_or_else(|| RevealError::Config(format!("invalid color '{}'", self.color)))
    }

    /// Material builder with this config's uniforms; rasters still missing
    pub fn material_settings(&self) -> Result<MaterialBuilder> {
        Ok(MaterialBuilder::default()
            .color(self.color()?)
            .smoothing(self.smoothing)
            .polarity(self.noise_polarity)
            .noise_scale(self.noise_scale))
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RevealError::Config(format!("{} must be a positive number, got {}", name, value)))
    }
}

/// `#rrggbb` or `#rrggbbaa`
fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, alpha))
}
