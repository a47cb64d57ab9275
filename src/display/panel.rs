//! Info panel state
//!
//! The three panel fields are recomputed from scratch every tick. Nothing is
//! carried over: no detection this tick means an empty panel.

use crate::catalog::{group_thousands, PriceCatalog};
use crate::vision::Detection;

/// Text shown for the label when nothing is detected
pub const EMPTY_LABEL: &str = "-";

/// Color role for the detected-item field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelTone {
    /// Default text color
    #[default]
    Neutral,
    /// Something is detected right now
    Positive,
}

/// What the info panel shows for one tick
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelState {
    /// Detected label, `None` when nothing is detected
    pub label: Option<String>,
    /// Catalog price of the label
    pub price: u64,
    /// Detection confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Color role of the label field
    pub tone: LabelTone,
    /// Currency prefix for the price field
    pub currency: String,
}

impl PanelState {
    /// The reset state shown when nothing is detected
    pub fn empty(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            ..Default::default()
        }
    }

    /// Panel for this tick's best detection
    pub fn resolve(best: Option<&Detection>, catalog: &PriceCatalog) -> Self {
        match best {
            Some(detection) => Self {
                label: Some(detection.label.clone()),
                price: catalog.price_of(&detection.label),
                confidence: detection.confidence,
                tone: LabelTone::Positive,
                currency: catalog.currency().to_string(),
            },
            None => Self::empty(catalog.currency()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none()
    }

    pub fn label_text(&self) -> &str {
        self.label.as_deref().unwrap_or(EMPTY_LABEL)
    }

    pub fn price_text(&self) -> String {
        format!("{} {}", self.currency, group_thousands(self.price))
    }

    pub fn confidence_text(&self) -> String {
        if self.is_empty() {
            "0%".to_string()
        } else {
            format!("{:.1}%", self.confidence * 100.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::BoundingBox;

    fn catalog() -> PriceCatalog {
        PriceCatalog::new([("GOLDA", 6000), ("MILKU", 4000)], "Rp")
    }

    fn detection(label: &str, confidence: f32) -> Detection {
        Detection {
            label: label.to_string(),
            confidence,
            bbox: BoundingBox::new(10, 10, 110, 110).unwrap(),
            class_index: 0,
        }
    }

    #[test]
    fn test_detected_item_fills_panel() {
        let best = detection("GOLDA", 0.80);
        let panel = PanelState::resolve(Some(&best), &catalog());

        assert_eq!(panel.label.as_deref(), Some("GOLDA"));
        assert_eq!(panel.price, 6000);
        assert!((panel.confidence - 0.80).abs() < f32::EPSILON);
        assert_eq!(panel.tone, LabelTone::Positive);

        assert_eq!(panel.label_text(), "GOLDA");
        assert_eq!(panel.price_text(), "Rp 6,000");
        assert_eq!(panel.confidence_text(), "80.0%");
    }

    #[test]
    fn test_absent_detection_resets_panel() {
        let panel = PanelState::resolve(None, &catalog());

        assert!(panel.is_empty());
        assert_eq!(panel.price, 0);
        assert_eq!(panel.confidence, 0.0);
        assert_eq!(panel.tone, LabelTone::Neutral);
        assert_eq!(panel.label_text(), EMPTY_LABEL);
        assert_eq!(panel.price_text(), "Rp 0");
        assert_eq!(panel.confidence_text(), "0%");
        assert_eq!(panel, PanelState::empty("Rp"));
    }

    #[test]
    fn test_unlisted_label_shows_zero_price() {
        let best = detection("AQUA", 0.9);
        let panel = PanelState::resolve(Some(&best), &catalog());

        assert_eq!(panel.label_text(), "AQUA");
        assert_eq!(panel.price, 0);
        assert_eq!(panel.tone, LabelTone::Positive);
    }

    #[test]
    fn test_panel_is_not_sticky() {
        let catalog = catalog();
        let best = detection("MILKU", 0.7);

        let first = PanelState::resolve(Some(&best), &catalog);
        let second = PanelState::resolve(None, &catalog);

        assert!(!first.is_empty());
        assert!(second.is_empty());
    }
}
