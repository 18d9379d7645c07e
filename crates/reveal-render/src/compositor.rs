//! Reveal compositor
//!
//! The per-pixel shading function. Inputs per pixel are a mask sample `m`
//! (text raster luminance: 1 = background, 0 = glyph) and a noise sample
//! `n` in [0, 1]. The pixel is eligible once its noise threshold is at or
//! below `progress`; eligible glyph pixels take the configured color, and
//! everything else is fully transparent.

use serde::{Deserialize, Serialize};
use tiny_skia::{Color, Pixmap, PremultipliedColorU8};
use crate::material::RevealMaterial;

/// Which end of the noise range is revealed first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoisePolarity {
    /// Dark noise first: threshold is `n`
    #[default]
    LowFirst,
    /// Bright noise first: threshold is `1 - n`
    HighFirst,
}

impl NoisePolarity {
    /// Progress value at which a pixel with noise `n` becomes eligible
    pub fn threshold(self, n: f32) -> f32 {
        match self {
            Self::LowFirst => n,
            Self::HighFirst => 1.0 - n,
        }
    }
}

/// Uniform set consumed by [`shade`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    /// Animation clock
    pub time: f32,
    /// Reveal progress, expected in [0, 1]
    pub progress: f32,
    /// Solid glyph color
    pub color: Color,
    /// Width of the soft band at the reveal edge; 0 is a hard cut
    pub smoothing: f32,
    pub polarity: NoisePolarity,
    /// Noise is sampled at `uv * noise_scale`
    pub noise_scale: f32,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            progress: 0.0,
            color: Color::BLACK,
            smoothing: 0.0,
            polarity: NoisePolarity::LowFirst,
            noise_scale: 1.0,
        }
    }
}

/// Shaded output: straight RGB plus alpha
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub rgb: [f32; 3],
    pub alpha: f32,
}

impl Fragment {
    pub const TRANSPARENT: Fragment = Fragment { rgb: [0.0; 3], alpha: 0.0 };

    pub fn to_premultiplied(self) -> PremultipliedColorU8 {
        let a = self.alpha.clamp(0.0, 1.0);
        let channel = |c: f32| (c.clamp(0.0, 1.0) * a * 255.0).round() as u8;
        PremultipliedColorU8::from_rgba(
            channel(self.rgb[0]),
            channel(self.rgb[1]),
            channel(self.rgb[2]),
            (a * 255.0).round() as u8,
        )
        .unwrap_or(PremultipliedColorU8::TRANSPARENT)
    }
}

/// How revealed a pixel with the given threshold is, in [0, 1].
///
/// Non-decreasing in `progress`, 0 everywhere at progress 0 and 1 for every
/// threshold in [0, 1] at progress 1. With `smoothing > 0` the edge is a
/// smoothstep band of that width instead of a hard cut.
pub fn reveal_factor(threshold: f32, progress: f32, smoothing: f32) -> f32 {
    if !(progress > 0.0) {
        return 0.0;
    }
    if smoothing <= 0.0 {
        return if threshold <= progress { 1.0 } else { 0.0 };
    }
    // Stretch progress so the band has fully passed threshold 1 at progress 1
    smoothstep(threshold, threshold + smoothing, progress * (1.0 + smoothing))
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Shade one pixel from its mask and noise samples
pub fn shade(mask: f32, noise: f32, uniforms: &Uniforms) -> Fragment {
    let coverage = (1.0 - mask).clamp(0.0, 1.0);
    if coverage <= 0.0 {
        return Fragment::TRANSPARENT;
    }
    let threshold = uniforms.polarity.threshold(noise);
    let reveal = reveal_factor(threshold, uniforms.progress, uniforms.smoothing);
    let color = uniforms.color;
    Fragment {
        rgb: [color.red(), color.green(), color.blue()],
        alpha: coverage * reveal * color.alpha(),
    }
}

/// Runs [`shade`] over every pixel of a full-viewport quad
#[derive(Debug, Clone, Copy, Default)]
pub struct RevealCompositor;

impl RevealCompositor {
    pub fn new() -> Self {
        Self
    }

    /// Shade `target` and return how many pixels came out visible.
    ///
    /// The quad is the largest centered square of the target; pixels
    /// outside it stay transparent. Its UVs map pixel centers to
    /// `((x + 0.5) / side, 1 - (y + 0.5) / side)`, measured from the
    /// square's corner.
    pub fn compose(&self, material: &RevealMaterial, target: &mut Pixmap) -> usize {
        let (width, height) = (target.width(), target.height());
        let side = width.min(height);
        let (left, top) = ((width - side) / 2, (height - side) / 2);
        let uniforms = material.uniforms();
        let scale = uniforms.noise_scale;
        let pixels = target.pixels_mut();
        pixels.fill(PremultipliedColorU8::TRANSPARENT);
        let mut revealed = 0;

        for y in 0..side {
            let v = 1.0 - (y as f32 + 0.5) / side as f32;
            let row = ((top + y) * width + left) as usize;
            for x in 0..side {
                let u = (x as f32 + 0.5) / side as f32;
                let mask = material.mask().sample(u, v);
                let noise = material.noise().sample(u * scale, v * scale);
                let pixel = shade(mask, noise, uniforms).to_premultiplied();
                if pixel.alpha() > 0 {
                    revealed += 1;
                }
                pixels[row + x as usize] = pixel;
            }
        }
        revealed
    }
}
