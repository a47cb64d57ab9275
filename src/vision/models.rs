//! YOLO model inference through ONNX Runtime
//!
//! Loads an Ultralytics ONNX export, letterboxes frames into the model input
//! and decodes the raw output into [`RawDetection`]s.

use anyhow::{bail, Context, Result};
use image::RgbImage;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::preprocess::{decode_output, letterbox_tensor, DecodeParams};
use super::{ClassNames, Detector, DetectorConfig, RawDetection};

/// Metadata key Ultralytics uses for the class name dictionary
const NAMES_METADATA_KEY: &str = "names";

/// YOLO detector backed by an ONNX Runtime session
pub struct YoloDetector {
    session: Session,
    input_name: String,
    output_name: String,
    names: ClassNames,
    config: DetectorConfig,
}

impl YoloDetector {
    /// Load a model file.
    ///
    /// `class_names` overrides the names embedded in the model; pass an empty
    /// list to read them from the model metadata.
    pub fn load(model_path: &Path, config: DetectorConfig, class_names: Vec<String>) -> Result<Self> {
        info!("Loading ONNX model from {:?}", model_path);

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.intra_threads)?
            .commit_from_file(model_path)
            .context("Failed to load ONNX model")?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .context("Model has no inputs")?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .context("Model has no outputs")?;

        let names = if class_names.is_empty() {
            let embedded = session
                .metadata()
                .and_then(|meta| meta.custom(NAMES_METADATA_KEY))
                .unwrap_or_else(|e| {
                    warn!("Could not read model metadata: {}", e);
                    None
                });
            match embedded.as_deref().and_then(parse_ultralytics_names) {
                Some(names) if !names.is_empty() => names,
                _ => bail!(
                    "Model has no class names; list them under [detector] class_names"
                ),
            }
        } else {
            class_names
        };

        info!(
            "Model loaded. Input: {}, Output: {}, {} classes",
            input_name,
            output_name,
            names.len()
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            names: ClassNames::new(names),
            config,
        })
    }
}

impl Detector for YoloDetector {
    fn infer(&mut self, frame: &RgbImage) -> Result<Vec<RawDetection>> {
        let start = Instant::now();
        let (width, height) = frame.dimensions();

        let (input, letterbox) = letterbox_tensor(frame, self.config.input_size);
        let input = Tensor::from_array(input).context("Failed to create input tensor")?;

        let params = DecodeParams {
            confidence_floor: self.config.confidence_floor,
            iou_threshold: self.config.iou_threshold,
            max_detections: self.config.max_detections,
            frame_width: width,
            frame_height: height,
            num_classes: Some(self.names.len()),
        };

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input])
            .context("Inference failed")?;

        let (shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .context("Failed to extract output tensor")?;
        let dims: Vec<usize> = shape.iter().map(|&d| d.max(0) as usize).collect();

        let detections = decode_output(data, &dims, &letterbox, &params);

        debug!(
            "Inference on {}x{} complete in {:?}: {} detections",
            width,
            height,
            start.elapsed(),
            detections.len()
        );

        Ok(detections)
    }

    fn class_names(&self) -> &ClassNames {
        &self.names
    }
}

/// Parse the Python-dict string Ultralytics embeds as model metadata,
/// e.g. `{0: 'ISOPLUS', 1: 'GOLDA'}`.
///
/// Returns `None` unless the keys form a dense `0..n` range.
pub fn parse_ultralytics_names(raw: &str) -> Option<Vec<String>> {
    let body = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
    let mut entries: Vec<(usize, String)> = Vec::new();
    let mut rest = body.trim();

    while !rest.is_empty() {
        let (key, after_key) = rest.split_once(':')?;
        let index: usize = key.trim().parse().ok()?;

        let after_key = after_key.trim_start();
        let quote = after_key.chars().next().filter(|c| *c == '\'' || *c == '"')?;
        let quoted = &after_key[1..];
        let end = quoted.find(quote)?;
        entries.push((index, quoted[..end].to_string()));

        rest = quoted[end + 1..].trim_start();
        rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
    }

    entries.sort_by_key(|(index, _)| *index);
    if entries.iter().enumerate().any(|(pos, (index, _))| pos != *index) {
        return None;
    }

    Some(entries.into_iter().map(|(_, name)| name).collect())
}
