//! Frame data structures for camera content

use image::RgbImage;
use std::time::Instant;

/// A frame read from the camera
#[derive(Debug)]
pub struct CapturedFrame {
    /// RGB pixel data
    pub image: RgbImage,
    /// Timestamp when frame was read
    pub timestamp: Instant,
}

impl CapturedFrame {
    /// Create a new captured frame
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            timestamp: Instant::now(),
        }
    }
}
