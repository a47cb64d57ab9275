//! Info card component: a title over one large value

use egui::{Color32, RichText, Rounding};

use crate::display::theme::ThemeColors;

/// A card showing one panel field
pub struct InfoCard {
    pub title: String,
    pub value: String,
    pub value_color: Color32,
}

impl InfoCard {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            value_color: ThemeColors::VALUE,
        }
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.value_color = color;
        self
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(ThemeColors::BG_PANEL)
            .rounding(Rounding::same(8.0))
            .inner_margin(egui::Margin::symmetric(10.0, 15.0))
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());

                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new(&self.title)
                            .size(14.0)
                            .color(ThemeColors::TEXT_PRIMARY)
                            .strong(),
                    );

                    ui.add_space(5.0);

                    ui.label(
                        RichText::new(&self.value)
                            .size(22.0)
                            .color(self.value_color)
                            .strong(),
                    );
                });
            });
    }
}
