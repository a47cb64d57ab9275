//! Image preprocessing and postprocessing for YOLO models
//!
//! Letterbox resizing into the square model input, output decoding and
//! per-class non-maximum suppression.

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

use super::RawDetection;

/// Gray used for letterbox padding (Ultralytics convention)
const PAD_VALUE: f32 = 114.0 / 255.0;

/// How a frame was placed inside the square model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Frame pixels -> model pixels
    pub scale: f32,
    /// Horizontal padding in model pixels
    pub pad_x: f32,
    /// Vertical padding in model pixels
    pub pad_y: f32,
}

impl Letterbox {
    /// Compute placement of a `width` x `height` frame in a `size` square
    pub fn fit(width: u32, height: u32, size: u32) -> Self {
        let scale = (size as f32 / width as f32).min(size as f32 / height as f32);
        let new_w = ((width as f32 * scale).round() as u32).clamp(1, size);
        let new_h = ((height as f32 * scale).round() as u32).clamp(1, size);

        Self {
            scale,
            pad_x: ((size - new_w) / 2) as f32,
            pad_y: ((size - new_h) / 2) as f32,
        }
    }

    /// Map a point from model input space back to frame space
    pub fn unmap(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Letterbox `frame` into a `[1, 3, size, size]` tensor normalized to 0-1
pub fn letterbox_tensor(frame: &RgbImage, size: u32) -> (Array4<f32>, Letterbox) {
    let (width, height) = frame.dimensions();
    let letterbox = Letterbox::fit(width, height, size);

    let new_w = ((width as f32 * letterbox.scale).round() as u32).clamp(1, size);
    let new_h = ((height as f32 * letterbox.scale).round() as u32).clamp(1, size);
    let resized = imageops::resize(frame, new_w, new_h, FilterType::Triangle);

    let side = size as usize;
    let mut tensor = Array4::<f32>::from_elem((1, 3, side, side), PAD_VALUE);
    let off_x = letterbox.pad_x as usize;
    let off_y = letterbox.pad_y as usize;

    for (x, y, pixel) in resized.enumerate_pixels() {
        let (tx, ty) = (off_x + x as usize, off_y + y as usize);
        for c in 0..3 {
            tensor[[0, c, ty, tx]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, letterbox)
}

/// Parameters for turning raw model output into detections
#[derive(Debug, Clone, Copy)]
pub struct DecodeParams {
    pub confidence_floor: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub frame_width: u32,
    pub frame_height: u32,
    /// Number of model classes, when known. Picks the attribute axis.
    pub num_classes: Option<usize>,
}

/// Decode a YOLOv8-style output tensor.
///
/// `dims` is the output shape: `[1, 4 + classes, proposals]`, or the transposed
/// `[1, proposals, 4 + classes]`. Each proposal carries `cx, cy, w, h` in model
/// pixels followed by one score per class.
///
/// With a known class count the axis of length `4 + classes` holds the
/// attributes (the standard layout wins when both axes match). Without one,
/// the shorter axis is taken as the attribute axis.
pub fn decode_output(
    data: &[f32],
    dims: &[usize],
    letterbox: &Letterbox,
    params: &DecodeParams,
) -> Vec<RawDetection> {
    let (rows, cols) = match dims {
        [1, a, b] | [a, b] => (*a, *b),
        _ => return Vec::new(),
    };
    if data.len() < rows * cols {
        return Vec::new();
    }

    let transposed = match params.num_classes.map(|nc| nc + 4) {
        Some(attrs) if rows == attrs => false,
        Some(attrs) if cols == attrs => true,
        _ => rows > cols,
    };
    let (attrs, proposals) = if transposed { (cols, rows) } else { (rows, cols) };
    if attrs <= 4 {
        return Vec::new();
    }
    let at = |attr: usize, i: usize| {
        if transposed {
            data[i * attrs + attr]
        } else {
            data[attr * proposals + i]
        }
    };

    let max_x = params.frame_width as f32;
    let max_y = params.frame_height as f32;
    let mut candidates = Vec::new();

    for i in 0..proposals {
        let mut class_index = 0;
        let mut score = f32::MIN;
        for c in 0..attrs - 4 {
            let s = at(4 + c, i);
            if s > score {
                score = s;
                class_index = c;
            }
        }
        if score < params.confidence_floor {
            continue;
        }

        let (cx, cy, w, h) = (at(0, i), at(1, i), at(2, i), at(3, i));
        let (x1, y1) = letterbox.unmap(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.unmap(cx + w / 2.0, cy + h / 2.0);

        candidates.push(RawDetection {
            bbox: [
                x1.clamp(0.0, max_x),
                y1.clamp(0.0, max_y),
                x2.clamp(0.0, max_x),
                y2.clamp(0.0, max_y),
            ],
            class_index,
            confidence: score,
        });
    }

    let mut kept = nms(candidates, params.iou_threshold);
    kept.truncate(params.max_detections);
    kept
}

/// Intersection over union of two `[x1, y1, x2, y2]` boxes
pub fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let ix1 = a[0].max(b[0]);
    let iy1 = a[1].max(b[1]);
    let ix2 = a[2].min(b[2]);
    let iy2 = a[3].min(b[3]);
    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area = |r: &[f32; 4]| (r[2] - r[0]) * (r[3] - r[1]);
    inter / (area(a) + area(b) - inter)
}

/// Greedy per-class NMS. Output is sorted by descending confidence; the sort
/// is stable, so equal scores keep their decode order.
pub fn nms(mut boxes: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<RawDetection> = Vec::new();
    for candidate in boxes {
        let overlaps = kept.iter().any(|k| {
            k.class_index == candidate.class_index && iou(&k.bbox, &candidate.bbox) > iou_threshold
        });
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DecodeParams {
        DecodeParams {
            confidence_floor: 0.5,
            iou_threshold: 0.7,
            max_detections: 300,
            frame_width: 640,
            frame_height: 640,
            num_classes: Some(2),
        }
    }

    fn raw(bbox: [f32; 4], class_index: usize, confidence: f32) -> RawDetection {
        RawDetection { bbox, class_index, confidence }
    }

    #[test]
    fn test_letterbox_fit_landscape() {
        let lb = Letterbox::fit(1280, 720, 640);
        assert!((lb.scale - 0.5).abs() < 1e-6);
        assert_eq!(lb.pad_x, 0.0);
        assert_eq!(lb.pad_y, 140.0);

        let (x, y) = lb.unmap(320.0, 320.0);
        assert!((x - 640.0).abs() < 1e-3);
        assert!((y - 360.0).abs() < 1e-3);
    }

    #[test]
    fn test_letterbox_tensor_pads_and_copies() {
        let frame = RgbImage::from_pixel(64, 32, image::Rgb([255, 0, 0]));
        let (tensor, lb) = letterbox_tensor(&frame, 64);

        assert_eq!(tensor.dim(), (1, 3, 64, 64));
        assert_eq!(lb.pad_y, 16.0);
        // Padding rows are gray
        assert!((tensor[[0, 0, 0, 0]] - PAD_VALUE).abs() < 1e-6);
        // Image rows carry the frame
        assert!((tensor[[0, 0, 32, 10]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 1, 32, 10]].abs() < 1e-6);
    }

    #[test]
    fn test_decode_picks_argmax_class_and_applies_floor() {
        // 3 proposals, 2 classes, layout [1, 6, 3]
        let dims = [1, 6, 3];
        #[rustfmt::skip]
        let data = vec![
            100.0, 300.0, 500.0, // cx
            100.0, 300.0, 500.0, // cy
             40.0,  40.0,  40.0, // w
             20.0,  20.0,  20.0, // h
              0.9,   0.1,   0.3, // class 0
              0.2,   0.8,   0.4, // class 1
        ];
        let lb = Letterbox::fit(640, 640, 640);

        let out = decode_output(&data, &dims, &lb, &params());

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].class_index, 0);
        assert!((out[0].confidence - 0.9).abs() < 1e-6);
        assert_eq!(out[0].bbox, [80.0, 90.0, 120.0, 110.0]);
        assert_eq!(out[1].class_index, 1);
    }

    #[test]
    fn test_decode_transposed_layout() {
        // 1 proposal laid out as [1, proposals, attrs] with more proposals padding
        let dims = [1, 7, 6];
        let mut data = vec![0.0; 7 * 6];
        data[..6].copy_from_slice(&[200.0, 200.0, 100.0, 100.0, 0.1, 0.95]);

        let out = decode_output(&data, &dims, &Letterbox::fit(640, 640, 640), &params());

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].class_index, 1);
        assert_eq!(out[0].bbox, [150.0, 150.0, 250.0, 250.0]);
    }

    #[test]
    fn test_decode_few_proposals_keeps_standard_layout() {
        // 2 proposals, 3 classes: [1, 7, 2] has more attribute rows than proposals
        let dims = [1, 7, 2];
        #[rustfmt::skip]
        let data = vec![
            100.0, 400.0, // cx
            100.0, 400.0, // cy
             20.0,  60.0, // w
             20.0,  60.0, // h
              0.1,   0.2, // class 0
              0.1,   0.9, // class 1
              0.8,   0.1, // class 2
        ];
        let params = DecodeParams {
            num_classes: Some(3),
            ..params()
        };

        let out = decode_output(&data, &dims, &Letterbox::fit(640, 640, 640), &params);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].class_index, 1);
        assert_eq!(out[0].bbox, [370.0, 370.0, 430.0, 430.0]);
        assert_eq!(out[1].class_index, 2);
        assert_eq!(out[1].bbox, [90.0, 90.0, 110.0, 110.0]);
    }

    #[test]
    fn test_decode_unknown_class_count_uses_shorter_axis() {
        let params = DecodeParams {
            num_classes: None,
            ..params()
        };
        let lb = Letterbox::fit(640, 640, 640);

        // [1, 6, 8]: 8 proposals in the standard layout
        let mut data = vec![0.0; 6 * 8];
        for (attr, value) in [200.0, 200.0, 100.0, 100.0, 0.9, 0.0].into_iter().enumerate() {
            data[attr * 8] = value;
        }
        let out = decode_output(&data, &[1, 6, 8], &lb, &params);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bbox, [150.0, 150.0, 250.0, 250.0]);

        // [1, 8, 6]: the same proposal, transposed
        let mut data = vec![0.0; 8 * 6];
        data[..6].copy_from_slice(&[200.0, 200.0, 100.0, 100.0, 0.9, 0.0]);
        let out = decode_output(&data, &[1, 8, 6], &lb, &params);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].class_index, 0);
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        let lb = Letterbox::fit(640, 640, 640);
        assert!(decode_output(&[0.0; 4], &[1, 4, 1], &lb, &params()).is_empty());
        assert!(decode_output(&[0.0; 2], &[1, 6, 3], &lb, &params()).is_empty());
        assert!(decode_output(&[], &[3], &lb, &params()).is_empty());
    }

    #[test]
    fn test_nms_suppresses_same_class_only() {
        let boxes = vec![
            raw([0.0, 0.0, 100.0, 100.0], 0, 0.8),
            raw([2.0, 2.0, 100.0, 100.0], 0, 0.9),
            raw([1.0, 1.0, 100.0, 100.0], 1, 0.85),
        ];

        let kept = nms(boxes, 0.7);

        assert_eq!(kept.len(), 2);
        assert!((kept[0].confidence - 0.9).abs() < 1e-6);
        assert_eq!(kept[1].class_index, 1);
    }

    #[test]
    fn test_nms_keeps_order_of_equal_scores() {
        let boxes = vec![
            raw([0.0, 0.0, 10.0, 10.0], 0, 0.9),
            raw([50.0, 50.0, 60.0, 60.0], 1, 0.95),
            raw([80.0, 80.0, 90.0, 90.0], 2, 0.95),
        ];

        let kept = nms(boxes, 0.7);

        let order: Vec<usize> = kept.iter().map(|d| d.class_index).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_iou() {
        let a = [0.0, 0.0, 10.0, 10.0];
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
        assert_eq!(iou(&a, &[20.0, 20.0, 30.0, 30.0]), 0.0);
        assert!((iou(&a, &[5.0, 0.0, 15.0, 10.0]) - 1.0 / 3.0).abs() < 1e-6);
    }
}
