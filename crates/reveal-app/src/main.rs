//! Noise Reveal - Main Entry Point

mod app;
mod noise;
mod surface;

use std::path::Path;
use anyhow::Context;
use reveal_render::RevealConfig;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional TOML config as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => RevealConfig::load(Path::new(&path))
            .with_context(|| format!("failed to load config {}", path))?,
        None => RevealConfig::default(),
    };

    tracing::info!("Starting noise reveal for {:?}", config.text);
    app::RevealApp::new(config).run()
}
