//! Reusable UI components for the window

pub mod info_card;

pub use info_card::InfoCard;
