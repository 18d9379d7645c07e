//! Reveal Application
//!
//! Window, event loop and the glue between display refreshes and the
//! reveal driver.

use std::sync::Arc;
use std::time::Instant;
use anyhow::Context;
use reveal_render::{Phase, ProgressControl, RenderSurface, RevealConfig, RevealDriver, RevealScene};
use reveal_text::{BlockTextSurface, FontTextSurface, TextError, TextRaster, TextRasterizer, TextSurface};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::noise;
use crate::surface::WindowSurface;

/// Noise reveal demo
pub struct RevealApp {
    config: RevealConfig,
}

impl RevealApp {
    pub fn new(config: RevealConfig) -> Self {
        Self { config }
    }

    /// Open the window and run until it is closed
    pub fn run(self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut state = AppState::new(self.config);
        event_loop.run_app(&mut state)?;

        match state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Event loop state
struct AppState {
    config: RevealConfig,
    window: Option<Arc<Window>>,
    scene: Option<RevealScene<WindowSurface>>,
    driver: RevealDriver,
    control: ProgressControl,
    /// Time of the previous driver tick
    last_frame: Option<Instant>,
    /// First fatal error; returned from `run`
    error: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RevealConfig) -> Self {
        let driver = RevealDriver::new(config.driver_settings());
        Self {
            config,
            window: None,
            scene: None,
            driver,
            control: ProgressControl::new(),
            last_frame: None,
            error: None,
        }
    }

    /// Create the window, build the scene and start the reveal
    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Noise Reveal")
            .with_inner_size(winit::dpi::LogicalSize::new(1024, 768));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let surface = WindowSurface::new(window.clone())?;

        let raster = rasterize_text(&self.config, surface.max_texture_size()).context("failed to rasterize text")?;
        tracing::info!(
            "Text raster {}px at font size {:.1}, {} lines",
            raster.side(),
            raster.font_size(),
            raster.lines().len()
        );
        let noise = noise::load_or_generate(&self.config)?;
        let material = self.config.material_settings()?.mask(raster).noise(noise).build()?;

        let scene = RevealScene::new(surface, material);
        self.driver.start(&scene)?;

        self.scene = Some(scene);
        self.window = Some(window);
        self.last_frame = Some(Instant::now());
        self.request_redraw();
        Ok(())
    }

    /// One display refresh: advance the driver, which renders through the scene
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let Some(scene) = self.scene.as_mut() else { return };

        let now = Instant::now();
        let dt = self.last_frame.map(|last| now - last).unwrap_or_default();
        self.last_frame = Some(now);

        let was_revealing = self.driver.phase() == Phase::Revealing;
        match self.driver.frame(dt, scene) {
            Ok(Phase::SteadyAnimating) if was_revealing => {
                self.control.enable(&self.driver);
                tracing::info!("Reveal done; arrow keys adjust progress, Escape stops");
            }
            Ok(_) => {}
            Err(err) => {
                self.fail(event_loop, anyhow::Error::new(err).context("reveal update failed"));
                return;
            }
        }

        if self.driver.wants_frame() {
            self.request_redraw();
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, event: KeyEvent) {
        if event.state != ElementState::Pressed {
            return;
        }

        match event.physical_key {
            PhysicalKey::Code(KeyCode::ArrowUp | KeyCode::ArrowRight) => {
                self.control.step_up(&mut self.driver);
            }
            PhysicalKey::Code(KeyCode::ArrowDown | KeyCode::ArrowLeft) => {
                self.control.step_down(&mut self.driver);
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                let Some(scene) = self.scene.as_mut() else { return };
                if let Err(err) = self.driver.stop(scene) {
                    tracing::debug!("Ignoring stop: {}", err);
                }
            }
            _ => {}
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{:#}", err);
        if self.error.is_none() {
            self.error = Some(err);
        }
        event_loop.exit();
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Window closed after {} updates", self.driver.ticks());
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                tracing::debug!("Resized to {}x{}", size.width, size.height);
                if self.driver.wants_frame() {
                    self.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.tick(event_loop),
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event),
            _ => {}
        }
    }
}

/// Rasterize with system fonts, or block glyphs when none are installed
fn rasterize_text(config: &RevealConfig, max_texture_size: u32) -> reveal_text::Result<TextRaster> {
    rasterize_with_fallback(FontTextSurface::with_system_fonts(), config, max_texture_size)
}

/// Rasterize through `surface`; an unavailable font falls back to block glyphs
fn rasterize_with_fallback<S: TextSurface>(
    surface: S,
    config: &RevealConfig,
    max_texture_size: u32,
) -> reveal_text::Result<TextRaster> {
    let request = config.layout_request();
    let result = TextRasterizer::new(surface)
        .ideal_size(config.ideal_size)
        .max_texture_size(max_texture_size)
        .rasterize(&request);

    match result {
        Err(TextError::ResourceUnavailable(reason)) => {
            tracing::warn!("{}, drawing block glyphs", reason);
            TextRasterizer::new(BlockTextSurface::new())
                .ideal_size(config.ideal_size)
                .max_texture_size(max_texture_size)
                .rasterize(&request)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reveal_text::FontDatabase;

    #[test]
    fn test_missing_fonts_fall_back_to_blocks() {
        let config = RevealConfig {
            ideal_size: 256,
            ..RevealConfig::default()
        };
        let raster = rasterize_with_fallback(FontTextSurface::new(FontDatabase::new()), &config, u32::MAX).unwrap();
        assert_eq!(raster.side(), 256);
        assert_eq!(raster.lines().len(), 2);
        assert!((raster.widest_line() - 256.0 / 1.8).abs() < 0.01);
    }

    #[test]
    fn test_layout_errors_are_not_masked() {
        let config = RevealConfig {
            text: String::new(),
            ideal_size: 256,
            ..RevealConfig::default()
        };
        let err = rasterize_with_fallback(BlockTextSurface::new(), &config, u32::MAX).unwrap_err();
        assert!(matches!(err, TextError::Layout(_)));
    }
}
