//! Reveal material
//!
//! The uniform set of the single reveal program: both textures plus the
//! per-frame scalars. The text and noise rasters are moved in and owned
//! here until the material is dropped.

use reveal_text::TextRaster;
use tiny_skia::Color;
use crate::compositor::{NoisePolarity, Uniforms};
use crate::driver::RevealState;
use crate::noise::NoiseRaster;
use crate::texture::Texture;
use crate::{RevealError, Result};

/// Uniform set for the reveal compositor
#[derive(Debug, Clone)]
pub struct RevealMaterial {
    mask: Texture,
    noise: Texture,
    uniforms: Uniforms,
}

impl RevealMaterial {
    pub fn builder() -> MaterialBuilder {
        MaterialBuilder::default()
    }

    pub fn mask(&self) -> &Texture {
        &self.mask
    }

    pub fn noise(&self) -> &Texture {
        &self.noise
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    /// Copy a driver tick into the uniforms. Progress is clamped to [0, 1].
    pub fn apply(&mut self, state: RevealState) {
        self.uniforms.progress = if state.progress.is_nan() {
            0.0
        } else {
            state.progress.clamp(0.0, 1.0)
        };
        self.uniforms.time = state.time;
    }
}

/// Collects the material's resources; both rasters are required
#[derive(Debug, Default)]
pub struct MaterialBuilder {
    mask: Option<Texture>,
    noise: Option<Texture>,
    uniforms: Uniforms,
}

impl MaterialBuilder {
    /// Take ownership of the text raster
    pub fn mask(mut self, raster: TextRaster) -> Self {
        self.mask = Some(Texture::from_text_raster(&raster));
        self
    }

    /// Take ownership of the noise raster
    pub fn noise(mut self, noise: NoiseRaster) -> Self {
        self.noise = Some(Texture::from_noise(&noise));
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.uniforms.color = color;
        self
    }

    pub fn smoothing(mut self, smoothing: f32) -> Self {
        self.uniforms.smoothing = smoothing.max(0.0);
        self
    }

    pub fn polarity(mut self, polarity: NoisePolarity) -> Self {
        self.uniforms.polarity = polarity;
        self
    }

    /// Noise UV multiplier; non-finite or non-positive values are ignored
    pub fn noise_scale(mut self, scale: f32) -> Self {
        if scale.is_finite() && scale > 0.0 {
            self.uniforms.noise_scale = scale;
        } else {
            tracing::warn!("Ignoring noise scale {}", scale);
        }
        self
    }

    /// Fails with `ResourceUnavailable` unless both rasters were supplied
    pub fn build(self) -> Result<RevealMaterial> {
        let mask = self
            .mask
            .ok_or_else(|| RevealError::ResourceUnavailable("text raster is not ready".into()))?;
        let noise = self
            .noise
            .ok_or_else(|| RevealError::ResourceUnavailable("noise raster is not ready".into()))?;
        Ok(RevealMaterial {
            mask,
            noise,
            uniforms: self.uniforms,
        })
    }
}
