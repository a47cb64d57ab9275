//! CashierVision - Real-time drink detection and price lookup
//!
//! Reads a live camera, detects drink products with a YOLO model and shows
//! the annotated feed next to the price of the most confident detection.

mod capture;
mod catalog;
mod config;
mod display;
mod error;
mod overlay;
mod pipeline;
mod storage;
mod vision;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::capture::{list_cameras, NokhwaCamera};
use crate::catalog::PriceCatalog;
use crate::config::AppConfig;
use crate::display::ScaleConfig;
use crate::error::StartupError;
use crate::overlay::{LabelFont, OverlayRenderer, OverlayStyle, Palette};
use crate::pipeline::{FrameLoop, TickSchedule};
use crate::vision::{DetectorConfig, YoloDetector};

/// CashierVision - Real-time drink detection and price lookup
#[derive(Parser, Debug)]
#[command(name = "cashier-vision")]
#[command(about = "Detects drinks on a live camera feed and shows their price")]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera index, overrides the configuration
    #[arg(long)]
    camera: Option<u32>,

    /// ONNX model path, overrides the configuration
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// List available cameras and exit
    #[arg(long)]
    list_cameras: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Log per-tick details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.list_cameras {
        println!("Available cameras:");
        let cameras = list_cameras()?;
        if cameras.is_empty() {
            println!("  No cameras detected");
        } else {
            for (index, name) in &cameras {
                println!("  [{}] {}", index, name);
            }
        }
        return Ok(());
    }

    let config = match load_effective_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return Err(e);
        }
    };

    if args.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    info!("CashierVision starting...");

    let frame_loop = match build_frame_loop(&config) {
        Ok(frame_loop) => frame_loop,
        Err(e) => {
            let e = anyhow::Error::from(e);
            error!("Startup failed: {:#}", e);
            return Err(e);
        }
    };

    if let Err(e) = display::run_display(frame_loop, &config.display, &config.catalog.currency) {
        error!("Display error: {}", e);
        return Err(anyhow::anyhow!("display window failed: {}", e));
    }

    info!("CashierVision shutdown complete");

    Ok(())
}

/// Load the configuration file and apply command line overrides.
///
/// An explicit `--config` must exist; the default location is optional.
fn load_effective_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => load_or_create_config(),
    };

    if let Some(index) = args.camera {
        config.camera.index = index;
    }
    if let Some(model) = &args.model {
        config.detector.model_path = model.clone();
    }

    Ok(config)
}

/// Load configuration from the default location, writing the defaults there
/// on first run
fn load_or_create_config() -> AppConfig {
    let Ok(config_path) = config::default_config_path() else {
        info!("Using default configuration");
        return AppConfig::default();
    };

    if config_path.exists() {
        match config::load_config(&config_path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
            Err(e) => warn!("Ignoring unreadable configuration {:?}: {:#}", config_path, e),
        }
        info!("Using default configuration");
        return AppConfig::default();
    }

    let config = AppConfig::default();
    match config::save_config(&config, &config_path) {
        Ok(()) => info!("Wrote default configuration to {:?}", config_path),
        Err(e) => warn!("Could not write default configuration to {:?}: {:#}", config_path, e),
    }
    config
}

/// Check every startup precondition and assemble the running loop
fn build_frame_loop(config: &AppConfig) -> Result<FrameLoop, StartupError> {
    config.validate()?;

    let palette = Palette::from_rgb(&config.overlay.palette)
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    info!("Overlay palette has {} colors", palette.len());
    let font = LabelFont::load(config.overlay.font_path.as_deref(), config.overlay.font_size);
    if !font.has_glyphs() {
        warn!("No label font available; plates will be drawn without text");
    }
    let renderer = OverlayRenderer::new(palette, font, OverlayStyle::from(&config.overlay));

    let catalog = PriceCatalog::from_settings(&config.catalog);
    if catalog.is_empty() {
        warn!("Price catalog is empty; every item will show a price of 0");
    } else {
        info!("Price catalog has {} entries", catalog.len());
    }

    // Model before camera
    let model_path = storage::resolve_model_path(&config.detector.model_path);
    let detector = YoloDetector::load(
        &model_path,
        DetectorConfig::from(&config.detector),
        config.detector.class_names.clone(),
    )
    .map_err(|source| StartupError::DetectorUnavailable {
        path: model_path.clone(),
        source,
    })?;

    let camera = NokhwaCamera::open(config.camera.index).map_err(|source| {
        StartupError::CameraUnavailable {
            index: config.camera.index,
            source,
        }
    })?;

    let schedule = TickSchedule::starting_at(
        Instant::now(),
        Duration::from_millis(config.display.tick_interval_ms),
    );

    Ok(FrameLoop::new(
        Box::new(camera),
        Box::new(detector),
        renderer,
        catalog,
        ScaleConfig::from(&config.display),
        schedule,
    ))
}
