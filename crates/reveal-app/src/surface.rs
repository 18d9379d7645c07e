//! Window surface
//!
//! Presents composed frames through a softbuffer surface, flattened over
//! the white clear color.

use std::num::NonZeroU32;
use std::sync::Arc;
use reveal_render::{RenderSurface, RevealError};
use tiny_skia::{Pixmap, PremultipliedColorU8};
use winit::window::Window;

/// softbuffer-backed [`RenderSurface`]
pub struct WindowSurface {
    window: Arc<Window>,
    surface: Option<softbuffer::Surface<Arc<Window>, Arc<Window>>>,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let context = softbuffer::Context::new(window.clone())
            .map_err(|e| anyhow::anyhow!("failed to create softbuffer context: {}", e))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| anyhow::anyhow!("failed to create softbuffer surface: {}", e))?;
        Ok(Self {
            window,
            surface: Some(surface),
        })
    }
}

impl RenderSurface for WindowSurface {
    fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn present(&mut self, frame: &Pixmap) -> reveal_render::Result<()> {
        let surface = self
            .surface
            .as_mut()
            .ok_or_else(|| RevealError::Surface("window surface was released".into()))?;
        let (Some(width), Some(height)) = (NonZeroU32::new(frame.width()), NonZeroU32::new(frame.height())) else {
            return Ok(());
        };

        surface.resize(width, height).map_err(surface_error)?;
        let mut buffer = surface.buffer_mut().map_err(surface_error)?;
        for (dst, src) in buffer.iter_mut().zip(frame.pixels()) {
            *dst = over_white(*src);
        }
        buffer.present().map_err(surface_error)
    }

    fn release(&mut self) {
        self.surface = None;
        tracing::debug!("Window surface released");
    }
}

fn surface_error(err: softbuffer::SoftBufferError) -> RevealError {
    RevealError::Surface(err.to_string())
}

/// Flatten a premultiplied pixel over white into softbuffer's `0x00RRGGBB`
pub fn over_white(pixel: PremultipliedColorU8) -> u32 {
    let backdrop = 255 - pixel.alpha() as u32;
    let r = pixel.red() as u32 + backdrop;
    let g = pixel.green() as u32 + backdrop;
    let b = pixel.blue() as u32 + backdrop;
    (r << 16) | (g << 8) | b
}
