//! Recorder window: egui/eframe front end.
//!
//! # Architecture
//!
//! [`RecorderApp`] is the top-level [`eframe::App`].  It owns the single
//! [`CaptureSession`] and polls it on every frame: the state drives the
//! status line and the button caption, and the envelope snapshot is drawn
//! through [`Renderer`].  While recording, a repaint is scheduled every
//! `repaint_interval_ms`; otherwise the window only repaints on input.
//!
//! | State | Visual |
//! |-------|--------|
//! | `Idle` | "Idle", green "Record" button, empty canvas |
//! | `Recording` | "Recording" + stream format, red "Stop" button, live waveform |
//! | `Error` | error message, green "Record" button (retries) |

use std::time::Duration;

use eframe::egui;

use crate::audio::{CpalCapture, HostSession};
use crate::config::{UiConfig, WaveformStyle};
use crate::render::Renderer;
use crate::session::{CaptureSession, CaptureState};

/// The capture session as wired in the desktop binary.
pub type DesktopSession = CaptureSession<CpalCapture, HostSession>;

// ---------------------------------------------------------------------------
// RecorderApp
// ---------------------------------------------------------------------------

/// eframe application: record button plus live waveform.
pub struct RecorderApp {
    session: DesktopSession,
    /// Window settings (read-only after startup).
    config: UiConfig,
}

impl RecorderApp {
    pub fn new(session: DesktopSession, config: UiConfig) -> Self {
        Self { session, config }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    /// State label, stream format while recording, reason on error.
    fn draw_status(&self, ui: &mut egui::Ui) {
        let theme = &self.config.theme;
        let state = self.session.state();

        ui.horizontal(|ui| {
            let label_color = match state {
                CaptureState::Recording => rgb(theme.stop_button),
                _ => rgb(theme.text),
            };
            ui.label(
                egui::RichText::new(state.label())
                    .color(label_color)
                    .size(15.0)
                    .strong(),
            );

            if let Some(format) = self.session.stream_format() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{:.0} Hz · {} ch",
                            format.sample_rate, format.channels
                        ))
                        .color(rgb(theme.secondary_text))
                        .size(11.0),
                    );
                });
            }
        });

        if let Some(reason) = state.error_message() {
            ui.label(
                egui::RichText::new(reason)
                    .color(rgb(theme.stop_button))
                    .size(11.0),
            );
        }
    }

    /// Envelope canvas.
    fn draw_waveform(&self, ui: &mut egui::Ui) {
        let theme = &self.config.theme;
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), self.config.waveform_height),
            egui::Sense::hover(),
        );

        let painter = ui.painter();
        painter.rect_filled(rect, 6.0, rgb(theme.secondary_background));

        let renderer =
            Renderer::with_scale(rect.width(), rect.height(), self.config.amplitude_scale);
        let points = self.session.envelope_snapshot();

        match self.config.style {
            WaveformStyle::Line => {
                let path = renderer.render(&points);
                if path.is_empty() {
                    return;
                }
                let vertices: Vec<egui::Pos2> = path
                    .points
                    .iter()
                    .map(|p| rect.min + egui::vec2(p.x, p.y))
                    .collect();
                painter.add(egui::Shape::line(
                    vertices,
                    egui::Stroke::new(self.config.stroke_width, rgb(theme.accent)),
                ));
            }
            WaveformStyle::Bars => {
                for bar in renderer.render_bars(&points) {
                    let bar_rect = egui::Rect::from_min_max(
                        rect.min + egui::vec2(bar.left, bar.top),
                        rect.min + egui::vec2(bar.right, bar.bottom),
                    );
                    // Keep silent bars visible as a hairline.
                    let bar_rect = bar_rect.expand2(egui::vec2(-0.5, 0.5));
                    painter.rect_filled(bar_rect, 1.0, rgb(theme.secondary_accent));
                }
            }
        }
    }

    /// Capsule button mapped to `CaptureSession::toggle`.
    fn draw_record_button(&mut self, ui: &mut egui::Ui) {
        let theme = &self.config.theme;
        let fill = if self.session.is_recording() {
            rgb(theme.stop_button)
        } else {
            rgb(theme.record_button)
        };
        let button = egui::Button::new(
            egui::RichText::new(self.session.state().action_label())
                .color(rgb(theme.text))
                .size(20.0),
        )
        .fill(fill)
        .min_size(egui::vec2(140.0, 44.0));

        ui.vertical_centered(|ui| {
            if ui.add(button).clicked() {
                self.session.toggle();
            }
        });
    }
}

fn rgb([r, g, b]: [u8; 3]) -> egui::Color32 {
    egui::Color32::from_rgb(r, g, b)
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for RecorderApp {
    /// Called every frame by eframe.  Polls the session, then renders.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.session.is_recording() {
            ctx.request_repaint_after(Duration::from_millis(self.config.repaint_interval_ms));
        }

        let frame = egui::Frame::new()
            .fill(rgb(self.config.theme.background))
            .inner_margin(egui::Margin::same(12));

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            self.draw_status(ui);
            ui.add_space(8.0);
            self.draw_waveform(ui);
            ui.add_space(12.0);
            self.draw_record_button(ui);
        });
    }

    /// Release the input stream before the window goes away.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.stop();
        log::info!("recorder window closing");
    }
}
