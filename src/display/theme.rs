//! Window theme and styling
//!
//! Dark navy theme: deep background, indigo panels, white text and cyan
//! values.

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

use crate::display::LabelTone;

/// Window color palette
pub struct ThemeColors;

impl ThemeColors {
    // Background colors
    pub const BG_DARK: Color32 = Color32::from_rgb(15, 15, 26);
    pub const BG_PANEL: Color32 = Color32::from_rgb(53, 59, 110);
    pub const BG_VIDEO: Color32 = Color32::BLACK;

    // Text colors
    pub const TEXT_PRIMARY: Color32 = Color32::WHITE;
    pub const TEXT_MUTED: Color32 = Color32::GRAY;

    // Value colors
    pub const VALUE: Color32 = Color32::from_rgb(0, 255, 255);
    pub const POSITIVE: Color32 = Color32::from_rgb(0, 255, 0);

    // Border colors
    pub const BORDER: Color32 = Color32::from_rgb(70, 76, 130);
}

/// Color for the detected-item field
pub fn tone_color(tone: LabelTone) -> Color32 {
    match tone {
        LabelTone::Neutral => ThemeColors::TEXT_PRIMARY,
        LabelTone::Positive => ThemeColors::POSITIVE,
    }
}

/// Apply the theme to egui
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    let mut visuals = Visuals::dark();

    visuals.window_fill = ThemeColors::BG_DARK;
    visuals.panel_fill = ThemeColors::BG_DARK;
    visuals.extreme_bg_color = ThemeColors::BG_VIDEO;

    visuals.widgets.noninteractive.bg_fill = ThemeColors::BG_PANEL;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_PRIMARY);
    visuals.widgets.noninteractive.rounding = Rounding::same(6.0);

    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_stroke = Stroke::new(1.0, ThemeColors::BORDER);

    style.visuals = visuals;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(16.0);

    style.text_styles = [
        (TextStyle::Small, FontId::new(12.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(16.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(15.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(16.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(20.0, FontFamily::Proportional)),
    ]
    .into();

    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_colors() {
        assert_eq!(tone_color(LabelTone::Positive), Color32::from_rgb(0, 255, 0));
        assert_eq!(tone_color(LabelTone::Neutral), ThemeColors::TEXT_PRIMARY);
    }
}
