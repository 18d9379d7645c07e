//! Reveal scene
//!
//! Couples one material, the compositor and a presentation surface. Each
//! driver tick composes a full frame at the surface's current size and
//! hands it to the surface.

use tiny_skia::Pixmap;
use crate::compositor::RevealCompositor;
use crate::driver::{RevealObserver, RevealState};
use crate::material::RevealMaterial;
use crate::{RevealError, Result};

/// Where composed frames go
pub trait RenderSurface {
    /// Current drawable size in pixels
    fn size(&self) -> (u32, u32);

    /// Largest texture side the surface can sample
    fn max_texture_size(&self) -> u32 {
        u32::MAX
    }

    /// Show a composed frame
    fn present(&mut self, frame: &Pixmap) -> Result<()>;

    /// Drop any presentation resources
    fn release(&mut self) {}
}

/// Renders driver ticks onto a surface
pub struct RevealScene<S> {
    surface: S,
    material: RevealMaterial,
    compositor: RevealCompositor,
    frame: Option<Pixmap>,
    frames_rendered: u64,
    last_revealed: usize,
    released: bool,
}

impl<S: RenderSurface> RevealScene<S> {
    pub fn new(surface: S, material: RevealMaterial) -> Self {
        Self {
            surface,
            material,
            compositor: RevealCompositor::new(),
            frame: None,
            frames_rendered: 0,
            last_revealed: 0,
            released: false,
        }
    }

    pub fn material(&self) -> &RevealMaterial {
        &self.material
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Last composed frame, if any
    pub fn frame(&self) -> Option<&Pixmap> {
        self.frame.as_ref()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Visible pixel count of the last frame
    pub fn last_revealed(&self) -> usize {
        self.last_revealed
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Compose the current uniforms and present the frame.
    ///
    /// Returns the visible pixel count. A zero-sized surface renders nothing.
    pub fn render(&mut self) -> Result<usize> {
        if self.released {
            return Err(RevealError::ResourceUnavailable("render surface was released".into()));
        }

        let (width, height) = self.surface.size();
        if width == 0 || height == 0 {
            tracing::trace!("Skipping frame for empty surface");
            return Ok(0);
        }

        let mut frame = match self.frame.take() {
            Some(frame) if frame.width() == width && frame.height() == height => frame,
            _ => {
                tracing::debug!("Allocating {}x{} frame", width, height);
                Pixmap::new(width, height)
                    .ok_or_else(|| RevealError::Surface(format!("cannot allocate {}x{} frame", width, height)))?
            }
        };

        let revealed = self.compositor.compose(&self.material, &mut frame);
        let presented = self.surface.present(&frame);
        self.frame = Some(frame);
        presented?;

        self.frames_rendered += 1;
        self.last_revealed = revealed;
        Ok(revealed)
    }

    /// Release the surface and the frame buffer
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.surface.release();
        self.frame = None;
        self.released = true;
        tracing::debug!("Scene released after {} frames", self.frames_rendered);
    }
}

impl<S: RenderSurface> RevealObserver for RevealScene<S> {
    fn ready(&self) -> Result<()> {
        if self.released {
            return Err(RevealError::ResourceUnavailable("render surface was released".into()));
        }
        Ok(())
    }

    fn on_update(&mut self, state: RevealState) -> Result<()> {
        let uniforms = self.material.uniforms();
        let previous = RevealState { progress: uniforms.progress, time: uniforms.time };
        self.material.apply(state);
        if let Err(err) = self.render() {
            self.material.apply(previous);
            return Err(err);
        }
        Ok(())
    }

    fn on_complete(&mut self) {
        tracing::debug!("Reveal finished with {} pixels visible", self.last_revealed);
    }

    fn on_stop(&mut self) {
        self.release();
    }
}
