//! Detection records and best-detection selection
//!
//! Turns the detector's raw candidates into typed [`Detection`]s and picks the
//! single detection that drives the price panel.

use tracing::debug;

use super::{ClassNames, RawDetection};

/// Pixel coordinates are kept within +/- this value
pub const COORD_LIMIT: f32 = (1 << 24) as f32;

/// Axis-aligned box in frame pixels, `x1 < x2` and `y1 < y2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    /// Build a box, rejecting empty or inverted extents
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Option<Self> {
        (x1 < x2 && y1 < y2).then_some(Self { x1, y1, x2, y2 })
    }

    pub fn width(&self) -> u32 {
        self.x2.abs_diff(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.abs_diff(self.y1)
    }
}

/// One object instance reported for the current frame
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Class label as named by the model
    pub label: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    /// Pixel box in the frame
    pub bbox: BoundingBox,
    /// Model class index, used as the palette key
    pub class_index: usize,
}

/// Convert raw detector candidates into detections, keeping detector order.
///
/// Coordinates are clamped to [`COORD_LIMIT`] and truncated toward zero;
/// candidates whose box collapses after truncation are dropped.
pub fn normalize(raw: &[RawDetection], names: &ClassNames) -> Vec<Detection> {
    let pixel = |v: f32| v.clamp(-COORD_LIMIT, COORD_LIMIT) as i32;

    raw.iter()
        .filter_map(|candidate| {
            let [x1, y1, x2, y2] = candidate.bbox;
            let Some(bbox) = BoundingBox::new(pixel(x1), pixel(y1), pixel(x2), pixel(y2)) else {
                debug!("Dropping degenerate box {:?}", candidate.bbox);
                return None;
            };

            Some(Detection {
                label: names.name(candidate.class_index),
                confidence: candidate.confidence.clamp(0.0, 1.0),
                bbox,
                class_index: candidate.class_index,
            })
        })
        .collect()
}

/// Pick the highest-confidence detection.
///
/// Single scan with a strict `>` comparison: on equal confidence the earliest
/// entry in detector order wins. `None` only for an empty list.
pub fn select_best(detections: &[Detection]) -> Option<&Detection> {
    let mut best: Option<&Detection> = None;
    for detection in detections {
        match best {
            Some(current) if detection.confidence > current.confidence => best = Some(detection),
            None => best = Some(detection),
            _ => {}
        }
    }
    best
}
