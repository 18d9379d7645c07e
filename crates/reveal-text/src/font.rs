//! Font-backed text surface
//!
//! Fonts come from fontdb, advances from rustybuzz shaping, metrics and
//! glyph outlines from ttf-parser, and pixels from tiny-skia.

use std::path::Path;
use fontdb::{Database, Family};
use rustybuzz::UnicodeBuffer;
use tiny_skia::{Color, FillRule, Paint, Pixmap, Transform};
use ttf_parser::{Face, GlyphId, OutlineBuilder};
use crate::surface::{FontSpec, TextMetrics, TextSurface};
use crate::{Result, TextError};

/// Unique identifier for a loaded font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub fontdb::ID);

/// Font database for loading and matching fonts
pub struct FontDatabase {
    db: Database,
}

impl FontDatabase {
    /// Create a new empty font database
    pub fn new() -> Self {
        Self { db: Database::new() }
    }

    /// Create a font database with system fonts loaded.
    ///
    /// The `sans-serif` generic is pointed at the first installed family of
    /// [`SANS_SERIF_FALLBACKS`].
    pub fn with_system_fonts() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!("Loaded {} system font faces", db.len());

        let mut fonts = Self { db };
        let installed = SANS_SERIF_FALLBACKS
            .iter()
            .find(|name| fonts.has_family(name))
            .map(|name| name.to_string());
        if let Some(name) = installed {
            tracing::debug!("Using {} as sans-serif", name);
            fonts.db.set_sans_serif_family(name);
        }
        fonts
    }

    /// Load a font from file
    pub fn load_font_file(&mut self, path: &Path) -> Result<()> {
        self.db
            .load_font_file(path)
            .map_err(|e| TextError::FontParsing(format!("{}: {}", path.display(), e)))
    }

    /// Load a font from memory
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
    }

    /// Find the first face matching one of `families`, in order.
    ///
    /// The CSS generic names map to fontdb's generic families.
    pub fn query(&self, families: &[&str]) -> Option<FontId> {
        let families: Vec<Family> = families.iter().map(|name| family_for(name)).collect();
        self.db
            .query(&fontdb::Query {
                families: &families,
                ..fontdb::Query::default()
            })
            .map(FontId)
    }

    /// Get font data by ID
    pub fn with_face_data<R>(&self, id: FontId, f: impl FnOnce(&[u8], u32) -> R) -> Option<R> {
        self.db.with_face_data(id.0, f)
    }

    /// Whether any face lists `name` among its family names
    pub fn has_family(&self, name: &str) -> bool {
        self.db
            .faces()
            .any(|face| face.families.iter().any(|(family, _)| family.eq_ignore_ascii_case(name)))
    }

    /// Any loaded face
    pub fn first_face(&self) -> Option<FontId> {
        self.db.faces().next().map(|face| FontId(face.id))
    }

    /// Number of loaded faces
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.len() == 0
    }
}

impl Default for FontDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Families tried, in order, when the requested one is not installed
pub const SANS_SERIF_FALLBACKS: &[&str] = &["DejaVu Sans", "Liberation Sans", "Arial", "Noto Sans", "Helvetica"];

fn family_for(name: &str) -> Family<'_> {
    match name {
        "serif" => Family::Serif,
        "sans-serif" => Family::SansSerif,
        "monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        other => Family::Name(other),
    }
}

/// A glyph placed relative to the start of its line, in pixels
#[derive(Debug, Clone, Copy)]
struct PlacedGlyph {
    glyph_id: u16,
    x: f32,
    y: f32,
}

/// One shaped line at a concrete size
#[derive(Debug, Default)]
struct ShapedLine {
    glyphs: Vec<PlacedGlyph>,
    metrics: TextMetrics,
    scale: f32,
}

/// Text surface that draws real font outlines
pub struct FontTextSurface {
    fonts: FontDatabase,
}

impl FontTextSurface {
    pub fn new(fonts: FontDatabase) -> Self {
        Self { fonts }
    }

    /// Surface over the system's installed fonts
    pub fn with_system_fonts() -> Self {
        Self::new(FontDatabase::with_system_fonts())
    }

    pub fn fonts(&self) -> &FontDatabase {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontDatabase {
        &mut self.fonts
    }

    /// Resolve a family, falling back to a common sans-serif face and then
    /// to any loaded face. Only an empty database is unavailable.
    fn resolve(&self, family: &str) -> Result<FontId> {
        let mut families = vec![family, "sans-serif"];
        families.extend_from_slice(SANS_SERIF_FALLBACKS);
        self.fonts
            .query(&families)
            .or_else(|| self.fonts.first_face())
            .ok_or_else(|| TextError::ResourceUnavailable(format!("no font face for family '{}'", family)))
    }

    /// Run `f` over the resolved face's raw data
    fn with_face<R>(&self, font: &FontSpec, f: impl FnOnce(&[u8], u32) -> Result<R>) -> Result<R> {
        let id = self.resolve(&font.family)?;
        self.fonts
            .with_face_data(id, f)
            .ok_or_else(|| TextError::ResourceUnavailable(format!("face data for '{}' is not loaded", font.family)))?
    }
}

/// Shape `text` with rustybuzz and read vertical metrics with ttf-parser
fn shape_line(data: &[u8], index: u32, text: &str, size: f32) -> Result<ShapedLine> {
    let face = rustybuzz::Face::from_slice(data, index)
        .ok_or_else(|| TextError::FontParsing("rustybuzz rejected the face".into()))?;
    let metrics_face = Face::parse(data, index).map_err(|e| TextError::FontParsing(e.to_string()))?;

    let scale = size / metrics_face.units_per_em() as f32;

    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    let output = rustybuzz::shape(&face, &[], buffer);

    let mut pen = 0.0;
    let mut glyphs = Vec::with_capacity(output.len());
    for (info, pos) in output.glyph_infos().iter().zip(output.glyph_positions()) {
        glyphs.push(PlacedGlyph {
            glyph_id: info.glyph_id as u16,
            x: pen + pos.x_offset as f32 * scale,
            y: pos.y_offset as f32 * scale,
        });
        pen += pos.x_advance as f32 * scale;
    }

    Ok(ShapedLine {
        glyphs,
        metrics: TextMetrics {
            width: pen,
            font_bounding_box_ascent: metrics_face.ascender() as f32 * scale,
            font_bounding_box_descent: -(metrics_face.descender() as f32) * scale,
        },
        scale,
    })
}

impl TextSurface for FontTextSurface {
    fn measure_text(&self, text: &str, font: &FontSpec) -> Result<TextMetrics> {
        self.with_face(font, |data, index| {
            shape_line(data, index, text, font.size).map(|line| line.metrics)
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
        self.with_face(font, |data, index| {
            let line = shape_line(data, index, text, font.size)?;
            let face = Face::parse(data, index).map_err(|e| TextError::FontParsing(e.to_string()))?;

            let mut paint = Paint::default();
            paint.set_color(color);
            paint.anti_alias = true;

            for glyph in &line.glyphs {
                let mut builder = GlyphPathBuilder::new(line.scale, x + glyph.x, baseline_y - glyph.y);
                // Whitespace has no outline
                if face.outline_glyph(GlyphId(glyph.glyph_id), &mut builder).is_none() {
                    continue;
                }
                if let Some(path) = builder.finish() {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
            Ok(())
        })
    }
}

/// Converts ttf-parser outlines (font units, y up) into a tiny-skia path
/// placed at a pixel origin (y down).
struct GlyphPathBuilder {
    builder: tiny_skia::PathBuilder,
    scale: f32,
    origin_x: f32,
    origin_y: f32,
}

impl GlyphPathBuilder {
    fn new(scale: f32, origin_x: f32, origin_y: f32) -> Self {
        Self {
            builder: tiny_skia::PathBuilder::new(),
            scale,
            origin_x,
            origin_y,
        }
    }

    fn tx(&self, x: f32) -> f32 {
        self.origin_x + x * self.scale
    }

    fn ty(&self, y: f32) -> f32 {
        self.origin_y - y * self.scale
    }

    fn finish(self) -> Option<tiny_skia::Path> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(self.tx(x), self.ty(y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(self.tx(x), self.ty(y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(self.tx(x1), self.ty(y1), self.tx(x), self.ty(y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.tx(x1), self.ty(y1),
            self.tx(x2), self.ty(y2),
            self.tx(x), self.ty(y),
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
