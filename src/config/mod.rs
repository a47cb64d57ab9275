//! Application Configuration
//!
//! Camera, detector, catalog, overlay and display settings stored in TOML format.
//! Everything here is read once at startup and never mutated afterwards.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StartupError;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Camera settings
    pub camera: CameraSettings,
    /// Detection model settings
    pub detector: DetectorSettings,
    /// Price table
    pub catalog: CatalogSettings,
    /// Box and label drawing settings
    pub overlay: OverlaySettings,
    /// Window and frame loop settings
    pub display: DisplaySettings,
}

/// Camera-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Device index (0 = first camera)
    pub index: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self { index: 0 }
    }
}

/// Detection model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Path to the ONNX export of the trained model
    pub model_path: PathBuf,
    /// Candidates below this confidence are discarded by the detector
    pub confidence_floor: f32,
    /// Square model input resolution in pixels
    pub input_size: u32,
    /// IoU above which overlapping boxes of the same class are suppressed
    pub iou_threshold: f32,
    /// Upper bound on detections kept per frame
    pub max_detections: usize,
    /// Class labels by index; empty means "read them from the model"
    pub class_names: Vec<String>,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("best.onnx"),
            confidence_floor: 0.65,
            input_size: 640,
            iou_threshold: 0.7,
            max_detections: 300,
            class_names: Vec::new(),
            intra_threads: 4,
        }
    }
}

/// Label to price table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Prefix shown before prices (e.g. "Rp")
    pub currency: String,
    /// Unit price per detector label
    pub prices: BTreeMap<String, u64>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        let prices = [
            ("ISOPLUS", 5000),
            ("GOLDA", 6000),
            ("MILKU", 4000),
            ("FRUIT TEA", 7000),
            ("FLORIDINA", 3000),
        ]
        .into_iter()
        .map(|(label, price)| (label.to_string(), price))
        .collect();

        Self {
            currency: "Rp".to_string(),
            prices,
        }
    }
}

/// Overlay drawing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Class colors as RGB, assigned by class index modulo length
    pub palette: Vec<[u8; 3]>,
    /// Length of each corner bracket arm in pixels
    pub bracket_length: u32,
    /// Bracket line thickness in pixels
    pub bracket_thickness: u32,
    /// TrueType font for labels; system fonts are tried when unset
    pub font_path: Option<PathBuf>,
    /// Label glyph height in pixels
    pub font_size: f32,
    /// Label text color as RGB
    pub text_color: [u8; 3],
    /// Space between label text and plate edge
    pub plate_padding: u32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            palette: vec![
                [255, 255, 0], // yellow
                [0, 255, 255], // cyan
                [255, 0, 255], // magenta
                [50, 255, 50], // neon green
                [255, 165, 0], // orange
            ],
            bracket_length: 30,
            bracket_thickness: 3,
            font_path: None,
            font_size: 20.0,
            text_color: [0, 0, 0],
            plate_padding: 5,
        }
    }
}

/// Window and frame loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Initial window width
    pub window_width: f32,
    /// Initial window height
    pub window_height: f32,
    /// Delay between the end of one tick and the start of the next
    pub tick_interval_ms: u64,
    /// Gap kept between the scaled frame and the video region edge
    pub region_margin: u32,
    /// Regions at or below this size are treated as not laid out yet
    pub min_region: u32,
    /// Enlarge frames smaller than the region (otherwise only shrink)
    pub upscale: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            window_width: 1280.0,
            window_height: 720.0,
            tick_interval_ms: 10,
            region_margin: 4,
            min_region: 10,
            upscale: false,
        }
    }
}

impl AppConfig {
    /// Reject values that would make the pipeline misbehave
    pub fn validate(&self) -> Result<(), StartupError> {
        let invalid = |msg: &str| Err(StartupError::InvalidConfig(msg.to_string()));

        if !(0.0..=1.0).contains(&self.detector.confidence_floor) {
            return invalid("detector.confidence_floor must be within 0.0..=1.0");
        }
        if !(0.0..=1.0).contains(&self.detector.iou_threshold) {
            return invalid("detector.iou_threshold must be within 0.0..=1.0");
        }
        if self.detector.input_size == 0 || self.detector.input_size % 32 != 0 {
            return invalid("detector.input_size must be a positive multiple of 32");
        }
        if self.overlay.palette.is_empty() {
            return invalid("overlay.palette needs at least one color");
        }
        if self.overlay.bracket_thickness == 0 || self.overlay.bracket_length == 0 {
            return invalid("overlay bracket length and thickness must be non-zero");
        }
        if self.overlay.font_size <= 0.0 {
            return invalid("overlay.font_size must be positive");
        }
        Ok(())
    }
}

/// Default location of the configuration file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(crate::storage::get_config_dir()?.join("config.toml"))
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
