//! Reveal Text - Text Raster Engine
//!
//! This crate turns an arbitrary multi-line string into a fixed-size square
//! raster that the reveal compositor samples as a mask:
//! - Text measurement and painting behind the [`TextSurface`] capability
//! - Font loading and matching (fontdb), shaping (rustybuzz)
//! - Glyph outlines (ttf-parser) filled with tiny-skia
//! - Auto-fit layout: the widest line spans a fixed fraction of the raster
//!   and the line block is vertically centered

pub mod font;
pub mod surface;
pub mod block;
pub mod request;
pub mod raster;

pub use font::{FontDatabase, FontId, FontTextSurface};
pub use surface::{FontSpec, TextMetrics, TextSurface};
pub use block::BlockTextSurface;
pub use request::TextLayoutRequest;
pub use raster::{PlacedLine, TextRaster, TextRasterizer, IDEAL_RASTER_SIZE, REFERENCE_FONT_SIZE};

/// Text rasterization error types
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Failed to parse font: {0}")]
    FontParsing(String),

    #[error("Failed to allocate {0}x{0} raster")]
    RasterAllocation(u32),
}

/// Layout failures raised before any pixel is painted
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// The widest line measured to a non-positive width, so no scale exists
    #[error("widest line measured {width}px at the reference size")]
    EmptyMeasurement { width: f32 },

    #[error("horizontal padding must be positive and finite, got {0}")]
    InvalidPadding(f32),

    #[error("line height factor must be positive and finite, got {0}")]
    InvalidLineHeight(f32),
}

pub type Result<T> = std::result::Result<T, TextError>;
