use anyhow::{bail, Context, Result};
use clap::Parser;
use glint_core::load_model;
use glint_renderer::{render, save_image, Camera, OutputFormat, RenderConfig};
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::SeedableRng;

mod cli;

use cli::Args;

fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

/// Settings file (or defaults) with command line overrides applied.
fn build_config(args: &Args) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)
            .with_context(|| format!("Failed to read settings from '{}'", path.display()))?,
        None => RenderConfig::default(),
    };

    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(samples) = args.samples_per_pixel {
        config.samples_per_pixel = samples;
    }

    config.validate().context("Invalid render settings")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let config = build_config(&args)?;
    // Fail on a bad extension before spending time rendering
    OutputFormat::from_path(&args.output)?;

    let registry = load_model(&args.model)
        .with_context(|| format!("Failed to load model '{}'", args.model.display()))?;
    if registry.is_empty() {
        bail!("Model '{}' has no triangles to render", args.model.display());
    }

    let camera = Camera::from_config(&config.camera, config.image_aspect());
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let image = render(&camera, &registry, &config, &mut rng);

    save_image(&image, &args.output)
        .with_context(|| format!("Failed to write '{}'", args.output.display()))?;

    Ok(())
}
