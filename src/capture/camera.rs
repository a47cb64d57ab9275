//! Webcam access through nokhwa

use anyhow::{Context, Result};
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use tracing::{debug, info, warn};

use super::{CapturedFrame, FrameSource};

/// A camera opened and streaming at its highest frame rate
pub struct NokhwaCamera {
    camera: Camera,
    streaming: bool,
}

impl NokhwaCamera {
    /// Open camera `index` and start its stream
    pub fn open(index: u32) -> Result<Self> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .with_context(|| format!("Failed to open camera {}", index))?;
        camera
            .open_stream()
            .context("Failed to start camera stream")?;

        let format = camera.camera_format();
        info!(
            "Camera {} streaming {}x{} @ {} fps",
            camera.info().human_name(),
            format.width(),
            format.height(),
            format.frame_rate()
        );

        Ok(Self {
            camera,
            streaming: true,
        })
    }
}

impl FrameSource for NokhwaCamera {
    fn name(&self) -> String {
        self.camera.info().human_name()
    }

    fn read_frame(&mut self) -> Option<CapturedFrame> {
        if !self.streaming {
            return None;
        }

        let buffer = match self.camera.frame() {
            Ok(buffer) => buffer,
            Err(e) => {
                debug!("No frame this tick: {}", e);
                return None;
            }
        };

        let decoded = match buffer.decode_image::<RgbFormat>() {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!("Dropping undecodable frame: {}", e);
                return None;
            }
        };

        // Copy into this crate's image type
        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw()).map(CapturedFrame::new)
    }

    fn release(&mut self) {
        if !self.streaming {
            return;
        }
        self.streaming = false;
        match self.camera.stop_stream() {
            Ok(()) => info!("Camera released"),
            Err(e) => warn!("Camera did not stop cleanly: {}", e),
        }
    }
}

/// Describe every camera the platform backend can see as (index, name)
pub fn list_cameras() -> Result<Vec<(String, String)>> {
    let cameras = nokhwa::query(ApiBackend::Auto).context("Failed to query cameras")?;
    Ok(cameras
        .into_iter()
        .map(|info| (info.index().to_string(), info.human_name()))
        .collect())
}
