//! Noise raster
//!
//! The greyscale threshold field. Decoding is the host's job; this only
//! accepts pixels that are already in memory.

use image::{DynamicImage, GrayImage};
use crate::{RevealError, Result};

/// Read-only greyscale raster, row-major from the top-left
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseRaster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl NoiseRaster {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RevealError::ResourceUnavailable("noise raster is empty".into()));
        }
        if data.len() != width as usize * height as usize {
            return Err(RevealError::ResourceUnavailable(format!(
                "noise raster expects {} bytes, got {}",
                width as usize * height as usize,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// From an 8-bit greyscale image
    pub fn from_luma(image: &GrayImage) -> Result<Self> {
        Self::new(image.width(), image.height(), image.as_raw().clone())
    }

    /// From any decoded image, converted to luma
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        Self::from_luma(&image.to_luma8())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Threshold at a texel, in [0, 1]
    pub fn value(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[(y * self.width + x) as usize] as f32 / 255.0)
    }
}
