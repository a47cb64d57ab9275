//! Display Layer
//!
//! The egui window plus the two pure pieces it is fed through: the frame
//! scaler and the info panel state.

pub mod app;
pub mod components;
pub mod panel;
pub mod scaler;
pub mod theme;

pub use app::run_display;
pub use panel::{LabelTone, PanelState};
pub use scaler::{fit_to_region, RegionSize, ScaleConfig};
