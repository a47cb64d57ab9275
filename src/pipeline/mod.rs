//! Frame loop
//!
//! One tick reads a frame, runs detection, draws the overlay, resolves the
//! panel, scales the result and hands both to the display sink. The loop is a
//! two-state machine: `Running` owns the camera and the model, `ShuttingDown`
//! owns nothing and is terminal. Every exit path goes through
//! [`FrameLoop::shutdown`], which releases the devices exactly once.

#[cfg(test)]
pub mod fakes;
pub mod schedule;

use image::RgbImage;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::capture::FrameSource;
use crate::catalog::PriceCatalog;
use crate::display::{fit_to_region, PanelState, RegionSize, ScaleConfig};
use crate::overlay::OverlayRenderer;
use crate::vision::{normalize, select_best, Detector};

pub use schedule::TickSchedule;

/// Where finished ticks go
pub trait DisplaySink {
    /// Current size of the video region
    fn video_region(&self) -> RegionSize;

    /// Show a fully rendered, scaled frame
    fn publish_frame(&mut self, frame: RgbImage);

    /// Show this tick's panel values
    fn publish_panel(&mut self, panel: &PanelState);
}

/// What caused the loop to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    /// Quit key pressed
    EscapeKey,
    /// Window close requested
    WindowClosed,
    /// Loop dropped while still running
    Dropped,
}

/// Observable loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Running,
    ShuttingDown,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Frame and panel were published
    Published { detections: usize },
    /// The camera had no frame; nothing else ran
    FrameMissed,
    /// The loop is shutting down; nothing ran
    Stopped,
}

/// Counters over the loop's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub published: u64,
    pub missed: u64,
    pub detector_errors: u64,
}

/// Devices only a running loop holds
struct Devices {
    source: Box<dyn FrameSource>,
    detector: Box<dyn Detector>,
}

enum LoopState {
    Running(Devices),
    ShuttingDown,
}

/// The cooperative frame loop
pub struct FrameLoop {
    state: LoopState,
    renderer: OverlayRenderer,
    catalog: PriceCatalog,
    scale: ScaleConfig,
    schedule: TickSchedule,
    stats: LoopStats,
}

impl FrameLoop {
    /// Create a running loop. The camera must already be open and the model
    /// loaded; the first tick is due immediately.
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn Detector>,
        renderer: OverlayRenderer,
        catalog: PriceCatalog,
        scale: ScaleConfig,
        schedule: TickSchedule,
    ) -> Self {
        info!("Frame loop running on {}", source.name());
        Self {
            state: LoopState::Running(Devices { source, detector }),
            renderer,
            catalog,
            scale,
            schedule,
            stats: LoopStats::default(),
        }
    }

    pub fn phase(&self) -> LoopPhase {
        match self.state {
            LoopState::Running(_) => LoopPhase::Running,
            LoopState::ShuttingDown => LoopPhase::ShuttingDown,
        }
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn schedule(&self) -> &TickSchedule {
        &self.schedule
    }

    /// Run one tick now
    pub fn tick(&mut self, sink: &mut dyn DisplaySink) -> TickOutcome {
        let LoopState::Running(devices) = &mut self.state else {
            return TickOutcome::Stopped;
        };
        let start = Instant::now();

        let Some(frame) = devices.source.read_frame() else {
            self.stats.missed += 1;
            debug!("No frame available, skipping tick");
            return TickOutcome::FrameMissed;
        };
        let captured_at = frame.timestamp;
        let mut image = frame.image;

        let detections = match devices.detector.infer(&image) {
            Ok(raw) => normalize(&raw, devices.detector.class_names()),
            Err(e) => {
                self.stats.detector_errors += 1;
                warn!("Detection failed, treating frame as empty: {:#}", e);
                Vec::new()
            }
        };

        let panel = PanelState::resolve(select_best(&detections), &self.catalog);
        self.renderer.render(&mut image, &detections);
        let scaled = fit_to_region(image, sink.video_region(), &self.scale);

        sink.publish_frame(scaled);
        sink.publish_panel(&panel);
        self.stats.published += 1;

        debug!(
            "Tick complete in {:?} ({:?} after capture): {} detections, best {:?}",
            start.elapsed(),
            captured_at.elapsed(),
            detections.len(),
            panel.label
        );

        TickOutcome::Published {
            detections: detections.len(),
        }
    }

    /// Tick if the schedule says so, then book the next tick.
    ///
    /// All scheduling happens on the caller's clock: the tick is taken to
    /// end at `now` plus the time it took to run.
    pub fn poll(&mut self, now: Instant, sink: &mut dyn DisplaySink) -> Option<TickOutcome> {
        if !self.schedule.is_due(now) {
            return None;
        }
        let started = Instant::now();
        let outcome = self.tick(sink);
        self.schedule.reschedule(now + started.elapsed());
        Some(outcome)
    }

    /// Enter `ShuttingDown`: release the camera, drop the model and stop
    /// scheduling. Returns `false` if the loop was already shutting down.
    pub fn shutdown(&mut self, trigger: ShutdownTrigger) -> bool {
        match std::mem::replace(&mut self.state, LoopState::ShuttingDown) {
            LoopState::Running(mut devices) => {
                info!("Shutting down ({:?})", trigger);
                self.schedule.cancel();
                devices.source.release();
                drop(devices);
                let stats = self.stats();
                info!(
                    "Frame loop stopped: {} frames published, {} missed, {} detector errors",
                    stats.published, stats.missed, stats.detector_errors
                );
                true
            }
            LoopState::ShuttingDown => false,
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.shutdown(ShutdownTrigger::Dropped);
    }
}
