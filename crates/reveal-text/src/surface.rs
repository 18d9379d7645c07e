//! Text Surface
//!
//! The host's text-drawing capability: measure a string in a font, and
//! paint it onto a pixmap. The rasterizer only talks to fonts through this.

use std::fmt;
use tiny_skia::{Color, Pixmap};
use crate::Result;

/// Font descriptor, the Rust side of a canvas `font` string
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Family name, matched by the surface
    pub family: String,
    /// Size in pixels
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    /// Same family at a different size
    pub fn with_size(&self, size: f32) -> Self {
        Self {
            family: self.family.clone(),
            size,
        }
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px {}", self.size, self.family)
    }
}

/// Text metrics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    /// Advance width of the whole string
    pub width: f32,
    /// Font ascent above the alphabetic baseline
    pub font_bounding_box_ascent: f32,
    /// Font descent below the alphabetic baseline (positive)
    pub font_bounding_box_descent: f32,
}

impl TextMetrics {
    /// Ascent plus descent
    pub fn font_height(&self) -> f32 {
        self.font_bounding_box_ascent + self.font_bounding_box_descent
    }
}

/// Text measurement and drawing, supplied by the host
///
/// Implementations must be deterministic: measuring or painting the same
/// string in the same font twice gives the same result.
pub trait TextSurface {
    /// Measure `text` as a single line
    fn measure_text(&self, text: &str, font: &FontSpec) -> Result<TextMetrics>;

    /// Fill `text` starting at `x`, sitting on the alphabetic baseline `baseline_y`
    fn fill_text(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        font: &FontSpec,
        x: f32,
        baseline_y: f32,
        color: Color,
    ) -> Result<()>;
}
