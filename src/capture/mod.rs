//! Camera Capture Layer
//!
//! The frame loop only sees the [`FrameSource`] trait: read one frame or
//! report that none is available, and release the device once at shutdown.

pub mod camera;
pub mod frame;

pub use camera::{list_cameras, NokhwaCamera};
pub use frame::CapturedFrame;

/// A live source of frames
pub trait FrameSource {
    /// Human readable device name for logs
    fn name(&self) -> String;

    /// Read one frame; `None` means nothing was available this tick
    fn read_frame(&mut self) -> Option<CapturedFrame>;

    /// Stop streaming and give the device back to the OS
    fn release(&mut self);
}
