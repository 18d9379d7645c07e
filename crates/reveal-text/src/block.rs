//! Block glyph surface
//!
//! A font-free [`TextSurface`]: every character advances by a fixed
//! fraction of the em, and every non-whitespace character is painted as a
//! solid cell covering its full advance and the font box. Hosts without
//! installed fonts fall back to it, and its exact geometry makes layout
//! measurable pixel-for-pixel.

use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};
use crate::surface::{FontSpec, TextMetrics, TextSurface};
use crate::Result;

/// Text surface that draws each character as a solid block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockTextSurface {
    /// Advance per character, in ems
    pub advance: f32,
    /// Ascent, in ems
    pub ascent: f32,
    /// Descent, in ems
    pub descent: f32,
}

impl BlockTextSurface {
    pub fn new() -> Self {
        Self {
            advance: 0.6,
            ascent: 0.8,
            descent: 0.2,
        }
    }
}

impl Default for BlockTextSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSurface for BlockTextSurface {
    fn measure_text(&self, text: &str, font: &FontSpec) -> Result<TextMetrics> {
        Ok(TextMetrics {
            width: text.chars().count() as f32 * self.advance * font.size,
            font_bounding_box_ascent: self.ascent * font.size,
            font_bounding_box_descent: self.descent * font.size,
        })
    }

    fn fill_text(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        font: &FontSpec,
        x: f32,
        baseline_y: f32,
        color: Color,
    ) -> Result<()> {
        let mut paint = Paint::default();
        paint.set_color(color);
        // Hard cell edges keep coverage exactly 0 or 1
        paint.anti_alias = false;

        let advance = self.advance * font.size;
        let top = baseline_y - self.ascent * font.size;
        let height = (self.ascent + self.descent) * font.size;

        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let left = x + i as f32 * advance;
            if let Some(rect) = Rect::from_xywh(left, top, advance, height) {
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }
        Ok(())
    }
}
