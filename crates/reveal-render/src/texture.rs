//! Luminance textures
//!
//! Single-channel textures sampled in UV space. `v = 0` is the bottom row,
//! matching a canvas texture uploaded with a vertical flip, so a raster
//! painted top-down appears upright on the quad.

use reveal_text::TextRaster;
use crate::noise::NoiseRaster;
use crate::{RevealError, Result};

/// Addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
}

/// Texture
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    texels: Vec<u8>,
    wrap: WrapMode,
}

impl Texture {
    /// Texture over row-major texels, top row first
    pub fn new(width: u32, height: u32, texels: Vec<u8>, wrap: WrapMode) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RevealError::ResourceUnavailable("texture has no texels".into()));
        }
        if texels.len() != width as usize * height as usize {
            return Err(RevealError::ResourceUnavailable(format!(
                "texture expects {}x{} texels, got {}",
                width, height, texels.len()
            )));
        }
        Ok(Self { width, height, texels, wrap })
    }

    /// Mask texture: luminance of the text raster, clamped at the edges
    pub fn from_text_raster(raster: &TextRaster) -> Self {
        Self {
            width: raster.side(),
            height: raster.side(),
            texels: raster.luminance(),
            wrap: WrapMode::ClampToEdge,
        }
    }

    /// Noise texture, repeating so it can be sampled at any scale
    pub fn from_noise(noise: &NoiseRaster) -> Self {
        Self {
            width: noise.width(),
            height: noise.height(),
            texels: noise.data().to_vec(),
            wrap: WrapMode::Repeat,
        }
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn wrap(&self) -> WrapMode {
        self.wrap
    }

    /// Texel at integer coordinates, wrapped per [`WrapMode`]
    pub fn texel(&self, x: i64, y: i64) -> u8 {
        let x = wrap_coord(x, self.width, self.wrap);
        let y = wrap_coord(y, self.height, self.wrap);
        self.texels[y * self.width as usize + x]
    }

    /// Bilinear sample at `(u, v)`, in [0, 1]
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        // Fold into one period first so texel indices stay small
        let (u, v) = match self.wrap {
            WrapMode::ClampToEdge => (u.clamp(0.0, 1.0), v.clamp(0.0, 1.0)),
            WrapMode::Repeat => (u.rem_euclid(1.0), v.rem_euclid(1.0)),
        };
        let x = u * self.width as f32 - 0.5;
        let y = (1.0 - v) * self.height as f32 - 0.5;
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        let (ix, iy) = (x0 as i64, y0 as i64);

        let (ix1, iy1) = (ix.saturating_add(1), iy.saturating_add(1));

        let top = lerp(self.texel(ix, iy) as f32, self.texel(ix1, iy) as f32, fx);
        let bottom = lerp(self.texel(ix, iy1) as f32, self.texel(ix1, iy1) as f32, fx);
        lerp(top, bottom, fy) / 255.0
    }
}

fn wrap_coord(i: i64, size: u32, wrap: WrapMode) -> usize {
    let size = size as i64;
    match wrap {
        WrapMode::ClampToEdge => i.clamp(0, size - 1) as usize,
        WrapMode::Repeat => i.rem_euclid(size) as usize,
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        // Top row: 0, 255. Bottom row: 255, 0.
        Texture::new(2, 2, vec![0, 255, 255, 0], WrapMode::ClampToEdge).unwrap()
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(Texture::new(0, 4, vec![], WrapMode::Repeat).is_err());
        assert!(Texture::new(2, 2, vec![0; 3], WrapMode::Repeat).is_err());
    }

    #[test]
    fn test_sample_texel_centers() {
        let tex = checker();
        // v = 0.75 is the top row after the flip
        assert_eq!(tex.sample(0.25, 0.75), 0.0);
        assert_eq!(tex.sample(0.75, 0.75), 1.0);
        assert_eq!(tex.sample(0.25, 0.25), 1.0);
        assert_eq!(tex.sample(0.75, 0.25), 0.0);
    }

    #[test]
    fn test_sample_interpolates() {
        let tex = checker();
        assert!((tex.sample(0.5, 0.75) - 0.5).abs() < 1e-6);
        assert!((tex.sample(0.5, 0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_modes() {
        let clamp = Texture::new(2, 1, vec![10, 200], WrapMode::ClampToEdge).unwrap();
        assert_eq!(clamp.texel(-3, 0), 10);
        assert_eq!(clamp.texel(5, 0), 200);

        let repeat = clamp.with_wrap(WrapMode::Repeat);
        assert_eq!(repeat.texel(-1, 0), 200);
        assert_eq!(repeat.texel(2, 0), 10);
    }

    #[test]
    fn test_extreme_coordinates_stay_in_range() {
        let noise = Texture::new(2, 2, vec![0, 255, 255, 0], WrapMode::Repeat).unwrap();
        let clamp = checker();
        for (u, v) in [(1e30, 0.5), (-1e30, 1e30), (0.5, f32::MAX), (f32::MIN, f32::MIN)] {
            for texture in [&noise, &clamp] {
                let value = texture.sample(u, v);
                assert!((0.0..=1.0).contains(&value), "({}, {}) gave {}", u, v, value);
            }
        }
    }

    #[test]
    fn test_repeat_is_periodic() {
        let noise = Texture::new(4, 1, vec![0, 60, 120, 250], WrapMode::Repeat).unwrap();
        for u in [0.1, 0.37, 0.8] {
            assert!((noise.sample(u, 0.5) - noise.sample(u + 3.0, 0.5)).abs() < 1e-4);
            assert!((noise.sample(u, 0.5) - noise.sample(u - 2.0, 0.5)).abs() < 1e-4);
        }
    }
}
