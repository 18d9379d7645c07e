//! Noise source
//!
//! Decodes the configured greyscale image, or generates a tileable value
//! noise field when none is configured.

use anyhow::Context;
use reveal_render::{NoiseRaster, RevealConfig};

/// Side of the generated noise raster
pub const GENERATED_SIZE: u32 = 256;

/// Lattice cells across the coarsest octave
const BASE_CELLS: u32 = 8;
const OCTAVES: u32 = 4;

pub fn load_or_generate(config: &RevealConfig) -> anyhow::Result<NoiseRaster> {
    let Some(path) = &config.noise_path else {
        tracing::info!("Generating {}x{} value noise", GENERATED_SIZE, GENERATED_SIZE);
        return Ok(generate(GENERATED_SIZE)?);
    };

    let image = image::open(path).with_context(|| format!("failed to decode noise image {}", path.display()))?;
    let noise = NoiseRaster::from_image(&image)?;
    tracing::info!("Loaded {}x{} noise from {}", noise.width(), noise.height(), path.display());
    Ok(noise)
}

/// Fractal value noise that tiles with period `size`, stretched to 0..=255
pub fn generate(size: u32) -> reveal_render::Result<NoiseRaster> {
    let size = size.max(1);
    let mut field = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            let mut value = 0.0;
            let mut weight = 0.5;
            for octave in 0..OCTAVES {
                let cells = BASE_CELLS << octave;
                let fx = x as f32 / size as f32 * cells as f32;
                let fy = y as f32 / size as f32 * cells as f32;
                value += weight * smooth_noise2d(fx, fy, cells);
                weight *= 0.5;
            }
            field.push(value);
        }
    }

    let (min, max) = field
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let range = (max - min).max(f32::EPSILON);
    let data = field
        .iter()
        .map(|v| ((v - min) / range * 255.0).round() as u8)
        .collect();
    NoiseRaster::new(size, size, data)
}

/// Pseudo-random lattice value in [0, 1)
fn noise2d(x: f32, y: f32) -> f32 {
    let n = (x * 12.9898 + y * 78.233).sin() * 43758.5453;
    n.rem_euclid(1.0)
}

/// Smoothstep-interpolated lattice noise, wrapping every `period` cells
fn smooth_noise2d(x: f32, y: f32, period: u32) -> f32 {
    let (ix, iy) = (x.floor() as u32, y.floor() as u32);
    let (fx, fy) = (x.fract(), y.fract());
    let sx = fx * fx * (3.0 - 2.0 * fx);
    let sy = fy * fy * (3.0 - 2.0 * fy);

    let corner = |cx: u32, cy: u32| noise2d((cx % period) as f32, (cy % period) as f32);
    let n00 = corner(ix, iy);
    let n10 = corner(ix + 1, iy);
    let n01 = corner(ix, iy + 1);
    let n11 = corner(ix + 1, iy + 1);

    let nx0 = n00 + sx * (n10 - n00);
    let nx1 = n01 + sx * (n11 - n01);
    nx0 + sy * (nx1 - nx0)
}
