//! Reveal Render - Noise Wipe Compositing
//!
//! Per-pixel reveal of a text raster through a greyscale noise threshold,
//! driven by a tween and then a free-running frame clock:
//! - Luminance textures with bilinear sampling
//! - The reveal compositor and its uniform set
//! - Tween and easing utilities
//! - The reveal driver state machine and the scene that renders its ticks

pub mod texture;
pub mod noise;
pub mod compositor;
pub mod material;
pub mod animation;
pub mod driver;
pub mod scene;
pub mod control;
pub mod config;

pub use texture::{Texture, WrapMode};
pub use noise::NoiseRaster;
pub use compositor::{reveal_factor, shade, Fragment, NoisePolarity, RevealCompositor, Uniforms};
pub use material::{MaterialBuilder, RevealMaterial};
pub use animation::{TimingFunction, Tween, TweenStatus};
pub use driver::{DriverSettings, Phase, RevealDriver, RevealObserver, RevealState};
pub use scene::{RenderSurface, RevealScene};
pub use control::ProgressControl;
pub use config::RevealConfig;

use reveal_text::TextError;

/// Reveal pipeline error types
#[derive(Debug, thiserror::Error)]
pub enum RevealError {
    #[error(transparent)]
    Text(#[from] TextError),

    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Cannot {action} while {phase}")]
    InvalidTransition { phase: Phase, action: &'static str },

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RevealError>;
