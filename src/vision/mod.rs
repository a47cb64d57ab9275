//! Vision Layer
//!
//! Object detection on camera frames. The frame loop talks to the model only
//! through the [`Detector`] trait; [`YoloDetector`] is the ONNX Runtime
//! implementation used in production.

pub mod detection;
pub mod models;
pub mod preprocess;

use anyhow::Result;
use image::RgbImage;

pub use detection::{normalize, select_best, BoundingBox, Detection};
pub use models::YoloDetector;

/// One candidate as reported by the model, in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    /// Box corners (x1, y1, x2, y2)
    pub bbox: [f32; 4],
    /// Model class index
    pub class_index: usize,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
}

/// Class labels by model class index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassNames(Vec<String>);

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Label for `index`; unknown indices get a synthetic `class_<n>` name
    pub fn name(&self, index: usize) -> String {
        self.0
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", index))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Configuration for the detector, fixed at startup
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Candidates below this score never leave the detector
    pub confidence_floor: f32,
    /// Square model input size
    pub input_size: u32,
    /// Same-class overlap threshold for NMS
    pub iou_threshold: f32,
    /// Maximum detections per frame
    pub max_detections: usize,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_floor: 0.65,
            input_size: 640,
            iou_threshold: 0.7,
            max_detections: 300,
            intra_threads: 4,
        }
    }
}

impl From<&crate::config::DetectorSettings> for DetectorConfig {
    fn from(settings: &crate::config::DetectorSettings) -> Self {
        Self {
            confidence_floor: settings.confidence_floor,
            input_size: settings.input_size,
            iou_threshold: settings.iou_threshold,
            max_detections: settings.max_detections,
            intra_threads: settings.intra_threads,
        }
    }
}

/// An object detector with parameters fixed at construction
pub trait Detector {
    /// Run the model on one frame; candidates come back in model order,
    /// already filtered by the confidence floor
    fn infer(&mut self, frame: &RgbImage) -> Result<Vec<RawDetection>>;

    /// Labels for the class indices this detector reports
    fn class_names(&self) -> &ClassNames;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names_lookup() {
        let names = ClassNames::new(vec!["ISOPLUS".into(), "GOLDA".into()]);
        assert_eq!(names.name(1), "GOLDA");
        assert_eq!(names.name(5), "class_5");
        assert_eq!(names.len(), 2);
        assert_eq!(ClassNames::default().len(), 0);
    }

    #[test]
    fn test_detector_config_from_settings() {
        let settings = crate::config::DetectorSettings {
            confidence_floor: 0.4,
            input_size: 320,
            ..Default::default()
        };
        let config = DetectorConfig::from(&settings);
        assert!((config.confidence_floor - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.input_size, 320);
        assert_eq!(config.max_detections, 300);
    }
}
