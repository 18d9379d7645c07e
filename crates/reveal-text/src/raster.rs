//! Text rasterizer
//!
//! Auto-fits a multi-line string into a square raster: the widest line
//! spans a fixed fraction of the width and the block of lines is centered
//! on the raster's midpoint.

use tiny_skia::{Color, Pixmap};
use crate::request::TextLayoutRequest;
use crate::surface::{FontSpec, TextMetrics, TextSurface};
use crate::{LayoutError, Result, TextError};

/// Raster side used when the backend allows it
pub const IDEAL_RASTER_SIZE: u32 = 2048;

/// Font size the widest line is first measured at
pub const REFERENCE_FONT_SIZE: f32 = 250.0;

/// Where a line ended up in the raster
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    /// Left edge of the line's advance box
    pub x: f32,
    /// Vertical center of the line's font box
    pub center_y: f32,
    /// Advance width at the final font size
    pub width: f32,
}

/// A square, opaque raster holding the laid-out text.
///
/// Immutable once produced.
#[derive(Debug, Clone)]
pub struct TextRaster {
    pixmap: Pixmap,
    font: FontSpec,
    line_height: f32,
    lines: Vec<PlacedLine>,
}

impl TextRaster {
    /// Side length in pixels
    pub fn side(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn font_size(&self) -> f32 {
        self.font.size
    }

    /// Distance between consecutive line centers
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn lines(&self) -> &[PlacedLine] {
        &self.lines
    }

    /// Advance width of the widest line
    pub fn widest_line(&self) -> f32 {
        self.lines.iter().map(|line| line.width).fold(0.0, f32::max)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Rec. 601 luma per pixel, row-major from the top-left
    pub fn luminance(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .map(|p| {
                // Opaque raster: premultiplied equals straight color
                let luma = 77 * p.red() as u32 + 150 * p.green() as u32 + 29 * p.blue() as u32;
                (luma >> 8) as u8
            })
            .collect()
    }
}

/// Lays text out into a [`TextRaster`] through a [`TextSurface`]
pub struct TextRasterizer<S> {
    surface: S,
    ideal_size: u32,
    max_texture_size: u32,
    reference_font_size: f32,
    foreground: Color,
    background: Color,
}

impl<S: TextSurface> TextRasterizer<S> {
    /// Rasterizer with an ideal size of 2048 and no backend limit
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            ideal_size: IDEAL_RASTER_SIZE,
            max_texture_size: u32::MAX,
            reference_font_size: REFERENCE_FONT_SIZE,
            foreground: Color::BLACK,
            background: Color::WHITE,
        }
    }

    /// Set the preferred raster side
    pub fn ideal_size(mut self, size: u32) -> Self {
        self.ideal_size = size;
        self
    }

    /// Set the backend's maximum texture dimension
    pub fn max_texture_size(mut self, size: u32) -> Self {
        self.max_texture_size = size;
        self
    }

    /// Set the size the widest line is first measured at
    pub fn reference_font_size(mut self, size: f32) -> Self {
        self.reference_font_size = size;
        self
    }

    /// Set the glyph color. The background is always opaque white.
    pub fn foreground(mut self, color: Color) -> Self {
        self.foreground = color;
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// `min(max_texture_size, ideal_size)`, rounded down to a power of two
    pub fn raster_side(&self) -> Result<u32> {
        let side = floor_power_of_two(self.max_texture_size.min(self.ideal_size));
        if side == 0 {
            return Err(TextError::ResourceUnavailable(
                "backend reports no usable texture size".into(),
            ));
        }
        Ok(side)
    }

    /// Lay out and paint `request`. Fails without producing a raster.
    pub fn rasterize(&self, request: &TextLayoutRequest) -> Result<TextRaster> {
        let padding = request.padding();
        if !padding.is_finite() || padding <= 0.0 {
            return Err(LayoutError::InvalidPadding(padding).into());
        }
        let line_factor = request.line_height_factor();
        if !line_factor.is_finite() || line_factor <= 0.0 {
            return Err(LayoutError::InvalidLineHeight(line_factor).into());
        }

        let side = self.raster_side()?;
        let lines = request.lines();
        let reference = FontSpec::new(request.family(), self.reference_font_size);

        let mut widest = 0.0f32;
        for line in &lines {
            let width = self.surface.measure_text(line, &reference)?.width;
            if width > widest || width.is_nan() {
                widest = width;
            }
        }
        if !widest.is_finite() || widest <= 0.0 {
            return Err(LayoutError::EmptyMeasurement { width: widest }.into());
        }

        let padding = if padding < 1.0 {
            tracing::warn!("Horizontal padding {} < 1, widest line will span the full raster", padding);
            1.0
        } else {
            padding
        };

        let target = side as f32 / padding;
        let mut font = reference.with_size(self.reference_font_size * target / widest);
        let mut metrics = self.surface.measure_text(lines[0], &font)?;
        let mut line_height = metrics.font_height() * line_factor;

        let block = block_height(&metrics, line_height, lines.len());
        if block > side as f32 {
            let shrink = side as f32 / block;
            tracing::debug!("Text block {:.1}px exceeds {}px raster, shrinking by {:.3}", block, side, shrink);
            font = font.with_size(font.size * shrink);
            metrics = self.surface.measure_text(lines[0], &font)?;
            line_height = metrics.font_height() * line_factor;
        }

        let mut pixmap = Pixmap::new(side, side).ok_or(TextError::RasterAllocation(side))?;
        pixmap.fill(self.background);

        let center = side as f32 / 2.0;
        let start = center - line_height * (lines.len() - 1) as f32 / 2.0;
        // Middle baseline: the font box is centered on the line's y
        let baseline_shift = (metrics.font_bounding_box_ascent - metrics.font_bounding_box_descent) / 2.0;

        let mut placed = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            let center_y = start + i as f32 * line_height;
            let width = self.surface.measure_text(line, &font)?.width;
            let x = center - width / 2.0;
            if !line.is_empty() {
                self.surface
                    .fill_text(&mut pixmap, line, &font, x, center_y + baseline_shift, self.foreground)?;
            }
            placed.push(PlacedLine {
                text: line.to_string(),
                x,
                center_y,
                width,
            });
        }

        tracing::debug!(
            "Rasterized {} line(s) at {} into {}x{}, line height {:.1}px",
            placed.len(), font, side, side, line_height
        );

        Ok(TextRaster {
            pixmap,
            font,
            line_height,
            lines: placed,
        })
    }
}

/// Height from the first line's font box top to the last line's bottom
fn block_height(metrics: &TextMetrics, line_height: f32, line_count: usize) -> f32 {
    line_height * line_count.saturating_sub(1) as f32 + metrics.font_height()
}

fn floor_power_of_two(n: u32) -> u32 {
    if n == 0 {
        0
    } else {
        1 << (31 - n.leading_zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockTextSurface;

    fn rasterizer(side: u32) -> TextRasterizer<BlockTextSurface> {
        TextRasterizer::new(BlockTextSurface::new()).ideal_size(side)
    }

    /// (left, right, top, bottom) of inked pixels, exclusive right/bottom
    fn ink_bounds(raster: &TextRaster) -> Option<(u32, u32, u32, u32)> {
        let side = raster.side();
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (i, p) in raster.pixmap().pixels().iter().enumerate() {
            if p.red() >= 128 {
                continue;
            }
            let (x, y) = (i as u32 % side, i as u32 / side);
            bounds = Some(match bounds {
                None => (x, x + 1, y, y + 1),
                Some((l, r, t, b)) => (l.min(x), r.max(x + 1), t.min(y), b.max(y + 1)),
            });
        }
        bounds
    }

    #[test]
    fn test_raster_side() {
        assert_eq!(rasterizer(2048).raster_side().unwrap(), 2048);
        assert_eq!(rasterizer(2048).max_texture_size(1000).raster_side().unwrap(), 512);
        assert_eq!(rasterizer(3000).raster_side().unwrap(), 2048);
        assert!(matches!(
            rasterizer(2048).max_texture_size(0).raster_side(),
            Err(TextError::ResourceUnavailable(_))
        ));
    }

    #[test]
    fn test_widest_line_fits_padding() {
        let cases = [
            ("W", 1.8),
            ("W", 2.5),
            ("0123456789", 1.0),
            ("0123456789", 1.8),
        ];
        let long = "x".repeat(200);
        let long_cases = [(long.as_str(), 1.0), (long.as_str(), 1.8)];

        for (text, padding) in cases.iter().chain(long_cases.iter()) {
            let request = TextLayoutRequest::new(*text).horizontal_padding(*padding);
            let raster = rasterizer(512).rasterize(&request).unwrap();
            let expected = 512.0 / padding;

            assert!((raster.widest_line() - expected).abs() < 0.01, "{} chars, padding {}", text.len(), padding);

            let (left, right, _, _) = ink_bounds(&raster).unwrap();
            let inked = (right - left) as f32;
            assert!((inked - expected).abs() <= 1.5, "{} chars, padding {}: {} vs {}", text.len(), padding, inked, expected);
        }
    }

    #[test]
    fn test_block_is_centered() {
        for count in [1usize, 2, 5] {
            let text = vec!["ab"; count].join("\n");
            let request = TextLayoutRequest::new(text).horizontal_padding(2.0).line_height(1.2);
            let raster = rasterizer(512).rasterize(&request).unwrap();

            let (left, right, top, bottom) = ink_bounds(&raster).unwrap();
            let mid_y = (top + bottom) as f32 / 2.0;
            let mid_x = (left + right) as f32 / 2.0;
            assert!((mid_y - 256.0).abs() <= 1.0, "{} lines: mid_y {}", count, mid_y);
            assert!((mid_x - 256.0).abs() <= 1.0, "{} lines: mid_x {}", count, mid_x);

            let centers: f32 = raster.lines().iter().map(|l| l.center_y).sum();
            assert!((centers / count as f32 - 256.0).abs() < 0.01);
        }
    }

    #[test]
    fn test_tall_block_stays_inside() {
        let request = TextLayoutRequest::new("ab\nab\nab\nab\nab").horizontal_padding(2.0).line_height(1.2);
        let raster = rasterizer(512).rasterize(&request).unwrap();
        let (_, _, top, bottom) = ink_bounds(&raster).unwrap();
        assert!(bottom <= 512);
        assert!(bottom - top >= 510, "block should fill the height after shrinking");
        assert!(raster.widest_line() < 256.0);
    }

    #[test]
    fn test_rasterize_is_idempotent() {
        let request = TextLayoutRequest::new("Hello\nworld!").horizontal_padding(1.8).line_height(2.5);
        let a = rasterizer(256).rasterize(&request).unwrap();
        let b = rasterizer(256).rasterize(&request).unwrap();
        assert_eq!(a.pixmap().data(), b.pixmap().data());
        assert_eq!(a.lines(), b.lines());
    }

    #[test]
    fn test_empty_text_is_layout_error() {
        for text in ["", "\n", "\n\n"] {
            let err = rasterizer(256).rasterize(&TextLayoutRequest::new(text)).unwrap_err();
            assert!(
                matches!(err, TextError::Layout(LayoutError::EmptyMeasurement { .. })),
                "{:?} gave {:?}", text, err
            );
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let err = rasterizer(256)
            .rasterize(&TextLayoutRequest::new("a").horizontal_padding(0.0))
            .unwrap_err();
        assert!(matches!(err, TextError::Layout(LayoutError::InvalidPadding(_))));

        let err = rasterizer(256)
            .rasterize(&TextLayoutRequest::new("a").line_height(f32::NAN))
            .unwrap_err();
        assert!(matches!(err, TextError::Layout(LayoutError::InvalidLineHeight(_))));
    }

    #[test]
    fn test_small_padding_spans_full_width() {
        let request = TextLayoutRequest::new("0123456789").horizontal_padding(0.5);
        let raster = rasterizer(256).rasterize(&request).unwrap();
        let (left, right, _, _) = ink_bounds(&raster).unwrap();
        assert_eq!((left, right), (0, 256));
    }

    #[test]
    fn test_hello_world_layout() {
        let request = TextLayoutRequest::new("Hello\nworld!")
            .font_family("Nunito")
            .horizontal_padding(1.8)
            .line_height(2.5);
        let raster = rasterizer(2048).rasterize(&request).unwrap();

        assert_eq!(raster.side(), 2048);
        assert!((raster.widest_line() - 2048.0 / 1.8).abs() < 0.01);
        for line in raster.lines() {
            assert!((line.x + line.width / 2.0 - 1024.0).abs() < 0.01);
        }
        let [first, second] = raster.lines() else { panic!("expected two lines") };
        assert!(((first.center_y + second.center_y) / 2.0 - 1024.0).abs() < 0.01);
        assert!((second.center_y - first.center_y - raster.line_height()).abs() < 0.01);
    }

    #[test]
    fn test_luminance() {
        let raster = rasterizer(64).rasterize(&TextLayoutRequest::new("ab")).unwrap();
        let luma = raster.luminance();
        assert_eq!(luma.len(), 64 * 64);
        assert_eq!(luma[0], 255);
        assert!(luma.iter().any(|&l| l == 0));
    }
}
