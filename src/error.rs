//! Fatal startup errors
//!
//! Everything that must be true before the frame loop may enter `Running`.
//! Per-tick failures never surface here; they degrade to "no detection".

use std::path::PathBuf;
use thiserror::Error;

/// A failure that prevents the cashier display from starting
#[derive(Debug, Error)]
pub enum StartupError {
    /// The configuration file was readable but its values are unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The camera could not be opened or refused to stream
    #[error("camera {index} is not available")]
    CameraUnavailable {
        index: u32,
        #[source]
        source: anyhow::Error,
    },

    /// The detection model could not be loaded
    #[error("detection model {path:?} could not be loaded")]
    DetectorUnavailable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
