//! Display window entry point

use eframe::egui;
use image::RgbImage;
use std::time::Instant;
use tracing::info;

use crate::config::DisplaySettings;
use crate::display::components::InfoCard;
use crate::display::{PanelState, RegionSize};
use crate::display::theme::{self, tone_color, ThemeColors};
use crate::pipeline::{DisplaySink, FrameLoop, LoopPhase, ShutdownTrigger};

const WINDOW_TITLE: &str = "Cashier Vision";
const HEADER_TEXT: &str = "Real-Time Drink Detection & Price Lookup";
const INFO_PANEL_WIDTH: f32 = 350.0;

/// Helper for calculating FPS
struct FrameCounter {
    frames_this_second: u32,
    last_fps_update: Instant,
    current_fps: f32,
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self {
            frames_this_second: 0,
            last_fps_update: Instant::now(),
            current_fps: 0.0,
        }
    }
}

impl FrameCounter {
    fn record(&mut self) {
        self.frames_this_second += 1;

        let elapsed = self.last_fps_update.elapsed();
        if elapsed.as_secs_f32() >= 1.0 {
            self.current_fps = self.frames_this_second as f32 / elapsed.as_secs_f32();
            self.frames_this_second = 0;
            self.last_fps_update = Instant::now();
        }
    }
}

/// What the window shows, filled in by the frame loop
#[derive(Default)]
pub struct DisplayState {
    /// Video region size from the last layout pass
    region: RegionSize,
    /// Newest frame, not yet uploaded to the GPU
    pending_frame: Option<RgbImage>,
    /// Texture showing the last uploaded frame
    texture: Option<egui::TextureHandle>,
    panel: PanelState,
    frame_counter: FrameCounter,
}

impl DisplayState {
    pub fn new(currency: &str) -> Self {
        Self {
            panel: PanelState::empty(currency),
            ..Default::default()
        }
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn fps(&self) -> f32 {
        self.frame_counter.current_fps
    }

    /// Upload the pending frame, reusing the texture when the size matches
    fn upload_pending(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.pending_frame.take() else {
            return;
        };
        let size = [frame.width() as usize, frame.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, frame.as_raw());

        if let Some(texture) = self.texture.as_mut().filter(|t| t.size() == size) {
            texture.set(color_image, egui::TextureOptions::LINEAR);
        } else {
            self.texture = Some(ctx.load_texture(
                "camera_frame",
                color_image,
                egui::TextureOptions::LINEAR,
            ));
        }
    }
}

impl DisplaySink for DisplayState {
    fn video_region(&self) -> RegionSize {
        self.region
    }

    fn publish_frame(&mut self, frame: RgbImage) {
        self.pending_frame = Some(frame);
        self.frame_counter.record();
    }

    fn publish_panel(&mut self, panel: &PanelState) {
        self.panel = panel.clone();
    }
}

/// The main window
pub struct CashierApp {
    frame_loop: FrameLoop,
    state: DisplayState,
    theme_applied: bool,
}

impl CashierApp {
    pub fn new(frame_loop: FrameLoop, currency: &str) -> Self {
        Self {
            frame_loop,
            state: DisplayState::new(currency),
            theme_applied: false,
        }
    }

    /// Create eframe options for the window
    pub fn options(settings: &DisplaySettings) -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([settings.window_width, settings.window_height])
                .with_min_inner_size([640.0, 400.0])
                .with_title(WINDOW_TITLE),
            ..Default::default()
        }
    }

    /// Route quit requests into the frame loop
    fn handle_quit(&mut self, ctx: &egui::Context) {
        let (escape, close_requested) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Escape),
                i.viewport().close_requested(),
            )
        });

        if escape {
            self.frame_loop.shutdown(ShutdownTrigger::EscapeKey);
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        } else if close_requested {
            self.frame_loop.shutdown(ShutdownTrigger::WindowClosed);
        }
    }

    fn render_info_panel(&self, ui: &mut egui::Ui) {
        let panel = self.state.panel();

        InfoCard::new("DETECTED ITEM", panel.label_text())
            .with_color(tone_color(panel.tone))
            .show(ui);
        ui.add_space(15.0);
        InfoCard::new("PRICE", panel.price_text()).show(ui);
        ui.add_space(15.0);
        InfoCard::new("CONFIDENCE LEVEL", panel.confidence_text()).show(ui);
    }

    fn render_video(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        // Read by the next tick
        self.state.region = RegionSize::new(available.x, available.y);

        let (rect, _) = ui.allocate_exact_size(available, egui::Sense::hover());
        ui.painter().rect_filled(rect, 0.0, ThemeColors::BG_VIDEO);

        match &self.state.texture {
            Some(texture) => {
                let image_rect = egui::Rect::from_center_size(rect.center(), texture.size_vec2());
                ui.painter().image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            None => {
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Waiting for camera...",
                    egui::FontId::proportional(15.0),
                    ThemeColors::TEXT_MUTED,
                );
            }
        }
    }
}

impl eframe::App for CashierApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        // Cancellation is checked before the tick
        self.handle_quit(ctx);

        self.frame_loop.poll(Instant::now(), &mut self.state);
        self.state.upload_pending(ctx);

        if self.frame_loop.phase() == LoopPhase::Running {
            if let Some(wait) = self.frame_loop.schedule().until_due(Instant::now()) {
                ctx.request_repaint_after(wait);
            }
        }

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(ThemeColors::BG_DARK).inner_margin(15.0))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(HEADER_TEXT)
                            .size(18.0)
                            .color(ThemeColors::TEXT_PRIMARY)
                            .strong(),
                    );
                });
            });

        egui::TopBottomPanel::bottom("footer")
            .frame(egui::Frame::none().fill(ThemeColors::BG_DARK).inner_margin(10.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("Press ESC to exit")
                            .size(12.0)
                            .italics()
                            .color(ThemeColors::TEXT_MUTED),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!("{:.1} FPS", self.state.fps()))
                                .size(12.0)
                                .color(ThemeColors::TEXT_MUTED),
                        );
                    });
                });
            });

        egui::SidePanel::right("info_panel")
            .resizable(false)
            .exact_width(INFO_PANEL_WIDTH)
            .frame(egui::Frame::none().fill(ThemeColors::BG_DARK).inner_margin(20.0))
            .show(ctx, |ui| {
                self.render_info_panel(ui);
            });

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(ThemeColors::BG_PANEL)
                    .inner_margin(2.0)
                    .outer_margin(egui::Margin::symmetric(20.0, 0.0)),
            )
            .show(ctx, |ui| {
                self.render_video(ui);
            });
    }
}

/// Run the window until the user quits
pub fn run_display(frame_loop: FrameLoop, settings: &DisplaySettings, currency: &str) -> Result<(), eframe::Error> {
    let app = CashierApp::new(frame_loop, currency);
    info!("Opening display window");
    eframe::run_native(
        WINDOW_TITLE,
        CashierApp::options(settings),
        Box::new(|_cc| Ok(Box::new(app))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fakes::fake_loop;

    fn input_with(events: Vec<egui::Event>, viewport_events: Vec<egui::ViewportEvent>) -> egui::RawInput {
        let mut input = egui::RawInput {
            events,
            ..Default::default()
        };
        input.viewports.insert(
            egui::ViewportId::ROOT,
            egui::ViewportInfo {
                events: viewport_events,
                ..Default::default()
            },
        );
        input
    }

    fn escape_press() -> egui::Event {
        egui::Event::Key {
            key: egui::Key::Escape,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn test_state_starts_empty() {
        let state = DisplayState::new("Rp");
        assert_eq!(state.video_region(), RegionSize::default());
        assert_eq!(state.panel(), &PanelState::empty("Rp"));
        assert_eq!(state.panel().price_text(), "Rp 0");
        assert!(state.pending_frame.is_none());
    }

    #[test]
    fn test_sink_keeps_latest_frame_and_panel() {
        let mut state = DisplayState::new("Rp");

        state.publish_frame(RgbImage::new(4, 4));
        state.publish_frame(RgbImage::new(8, 6));
        let panel = PanelState {
            label: Some("GOLDA".into()),
            price: 6000,
            confidence: 0.8,
            currency: "Rp".into(),
            ..Default::default()
        };
        state.publish_panel(&panel);

        assert_eq!(state.pending_frame.as_ref().map(|f| f.dimensions()), Some((8, 6)));
        assert_eq!(state.panel().label_text(), "GOLDA");
        assert_eq!(state.frame_counter.frames_this_second, 2);
    }

    #[test]
    fn test_region_reported_to_loop() {
        let mut state = DisplayState::new("Rp");
        state.region = RegionSize::new(800.0, 600.0);
        assert_eq!(state.video_region(), RegionSize::new(800.0, 600.0));
    }

    #[test]
    fn test_escape_shuts_down_and_closes_window() {
        let (frame_loop, log) = fake_loop(Vec::new(), Vec::new());
        let mut app = CashierApp::new(frame_loop, "Rp");
        let ctx = egui::Context::default();

        let output = ctx.run(input_with(vec![escape_press()], Vec::new()), |ctx| {
            app.handle_quit(ctx)
        });

        assert_eq!(app.frame_loop.phase(), LoopPhase::ShuttingDown);
        assert_eq!(log.releases.get(), 1);
        assert_eq!(log.detector_drops.get(), 1);
        let close_sent = output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|viewport| {
                viewport
                    .commands
                    .iter()
                    .any(|cmd| matches!(cmd, egui::ViewportCommand::Close))
            });
        assert!(close_sent);
    }

    #[test]
    fn test_close_request_shuts_down_once() {
        let (frame_loop, log) = fake_loop(Vec::new(), Vec::new());
        let mut app = CashierApp::new(frame_loop, "Rp");
        let ctx = egui::Context::default();

        for _ in 0..2 {
            ctx.run(input_with(Vec::new(), vec![egui::ViewportEvent::Close]), |ctx| {
                app.handle_quit(ctx)
            });
        }

        assert_eq!(app.frame_loop.phase(), LoopPhase::ShuttingDown);
        assert_eq!(log.releases.get(), 1);
        assert_eq!(log.detector_drops.get(), 1);
    }

    #[test]
    fn test_quiet_input_keeps_running() {
        let (frame_loop, log) = fake_loop(Vec::new(), Vec::new());
        let mut app = CashierApp::new(frame_loop, "Rp");
        let ctx = egui::Context::default();

        ctx.run(input_with(Vec::new(), Vec::new()), |ctx| app.handle_quit(ctx));

        assert_eq!(app.frame_loop.phase(), LoopPhase::Running);
        assert_eq!(log.releases.get(), 0);
    }
}
