//! Test doubles for the frame loop: a scripted camera, a scripted detector
//! and a sink that records what it is given.

use anyhow::Result;
use image::RgbImage;
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::{DisplaySink, FrameLoop, TickSchedule};
use crate::capture::{CapturedFrame, FrameSource};
use crate::catalog::PriceCatalog;
use crate::config::{CatalogSettings, OverlaySettings};
use crate::display::{PanelState, RegionSize, ScaleConfig};
use crate::overlay::{LabelFont, OverlayRenderer, OverlayStyle, Palette};
use crate::vision::{ClassNames, Detector, RawDetection};

/// Counts calls made on the fake devices
#[derive(Default)]
pub struct DeviceLog {
    pub reads: Cell<u32>,
    pub releases: Cell<u32>,
    pub detector_drops: Cell<u32>,
    pub inferences: Cell<u32>,
}

pub struct FakeCamera {
    frames: VecDeque<Option<RgbImage>>,
    log: Rc<DeviceLog>,
}

impl FrameSource for FakeCamera {
    fn name(&self) -> String {
        "fake camera".to_string()
    }

    fn read_frame(&mut self) -> Option<CapturedFrame> {
        self.log.reads.set(self.log.reads.get() + 1);
        self.frames.pop_front().flatten().map(CapturedFrame::new)
    }

    fn release(&mut self) {
        self.log.releases.set(self.log.releases.get() + 1);
    }
}

pub struct FakeDetector {
    results: VecDeque<Result<Vec<RawDetection>>>,
    names: ClassNames,
    log: Rc<DeviceLog>,
}

impl Detector for FakeDetector {
    fn infer(&mut self, _frame: &RgbImage) -> Result<Vec<RawDetection>> {
        self.log.inferences.set(self.log.inferences.get() + 1);
        self.results.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn class_names(&self) -> &ClassNames {
        &self.names
    }
}

impl Drop for FakeDetector {
    fn drop(&mut self) {
        self.log.detector_drops.set(self.log.detector_drops.get() + 1);
    }
}

pub struct RecordingSink {
    pub region: RegionSize,
    pub frames: Vec<RgbImage>,
    pub panels: Vec<PanelState>,
}

impl RecordingSink {
    pub fn new(region: RegionSize) -> Self {
        Self {
            region,
            frames: Vec::new(),
            panels: Vec::new(),
        }
    }
}

impl DisplaySink for RecordingSink {
    fn video_region(&self) -> RegionSize {
        self.region
    }

    fn publish_frame(&mut self, frame: RgbImage) {
        self.frames.push(frame);
    }

    fn publish_panel(&mut self, panel: &PanelState) {
        self.panels.push(panel.clone());
    }
}

pub fn raw(bbox: [f32; 4], class_index: usize, confidence: f32) -> RawDetection {
    RawDetection {
        bbox,
        class_index,
        confidence,
    }
}

/// A running loop over scripted devices with the default catalog, palette
/// and a one second tick interval
pub fn fake_loop(
    frames: Vec<Option<RgbImage>>,
    results: Vec<Result<Vec<RawDetection>>>,
) -> (FrameLoop, Rc<DeviceLog>) {
    let log = Rc::new(DeviceLog::default());
    let overlay = OverlaySettings::default();

    let frame_loop = FrameLoop::new(
        Box::new(FakeCamera {
            frames: frames.into(),
            log: log.clone(),
        }),
        Box::new(FakeDetector {
            results: results.into(),
            names: ClassNames::new(vec!["ISOPLUS".into(), "GOLDA".into(), "MILKU".into()]),
            log: log.clone(),
        }),
        OverlayRenderer::new(
            Palette::from_rgb(&overlay.palette).unwrap(),
            LabelFont::without_glyphs(overlay.font_size),
            OverlayStyle::from(&overlay),
        ),
        PriceCatalog::from_settings(&CatalogSettings::default()),
        ScaleConfig::default(),
        TickSchedule::starting_at(Instant::now(), Duration::from_secs(1)),
    );

    (frame_loop, log)
}

pub fn black_frame() -> Option<RgbImage> {
    Some(RgbImage::new(200, 200))
}
