//! Fit frames into the video region
//!
//! Pure function of the frame and the region size measured this instant. The
//! result is always smaller than the region by a fixed margin, so showing it
//! never makes the layout grow.

use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::config::DisplaySettings;

/// Size of the video region as laid out right now
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RegionSize {
    pub width: f32,
    pub height: f32,
}

impl RegionSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Scaling parameters
#[derive(Debug, Clone, Copy)]
pub struct ScaleConfig {
    /// Pixels kept free on each axis
    pub margin: u32,
    /// Regions at or below this size on either axis are skipped
    pub min_region: u32,
    /// Whether frames smaller than the region are enlarged
    pub upscale: bool,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            margin: 4,
            min_region: 10,
            upscale: false,
        }
    }
}

impl From<&DisplaySettings> for ScaleConfig {
    fn from(settings: &DisplaySettings) -> Self {
        Self {
            margin: settings.region_margin,
            min_region: settings.min_region,
            upscale: settings.upscale,
        }
    }
}

/// Target size for a `width` x `height` frame, or `None` when the frame
/// should be shown as-is
pub fn fitted_size(width: u32, height: u32, region: RegionSize, config: &ScaleConfig) -> Option<(u32, u32)> {
    let min = config.min_region as f32;
    if !(region.width > min && region.height > min) || width == 0 || height == 0 {
        return None;
    }

    let bound_w = (region.width.floor() as u32).saturating_sub(config.margin).max(1);
    let bound_h = (region.height.floor() as u32).saturating_sub(config.margin).max(1);

    let scale = (bound_w as f64 / width as f64).min(bound_h as f64 / height as f64);
    if scale >= 1.0 && !config.upscale {
        return None;
    }

    let new_w = ((width as f64 * scale).round() as u32).clamp(1, bound_w);
    let new_h = ((height as f64 * scale).round() as u32).clamp(1, bound_h);
    if (new_w, new_h) == (width, height) {
        return None;
    }
    Some((new_w, new_h))
}

/// Fit `frame` into `region` keeping its aspect ratio (Lanczos3 resampling).
///
/// Degenerate regions, which happen before the first layout pass, return the
/// frame unchanged.
pub fn fit_to_region(frame: RgbImage, region: RegionSize, config: &ScaleConfig) -> RgbImage {
    match fitted_size(frame.width(), frame.height(), region, config) {
        Some((w, h)) => imageops::resize(&frame, w, h, FilterType::Lanczos3),
        None => frame,
    }
}
