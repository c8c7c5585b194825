//! Microphone toggle button.

use eframe::egui::{self, Color32, RichText};

use super::session::SpeechSession;

const MIC_IDLE: Color32 = Color32::from_rgb(230, 230, 230);
const MIC_LISTENING: Color32 = Color32::from_rgb(239, 68, 68);
const BUTTON_FILL: Color32 = Color32::from_rgb(31, 41, 55);

/// egui widget that toggles a [`SpeechSession`] on click.
///
/// ```rust,no_run
/// # fn demo(ui: &mut eframe::egui::Ui, session: &mut voice_panel::speech::SpeechSession) {
/// ui.add(voice_panel::speech::SpeechToTextButton::new(session));
/// # }
/// ```
pub struct SpeechToTextButton<'a> {
    session: &'a mut SpeechSession,
}

impl<'a> SpeechToTextButton<'a> {
    pub fn new(session: &'a mut SpeechSession) -> Self {
        Self { session }
    }
}

impl egui::Widget for SpeechToTextButton<'_> {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let tint = if self.session.is_listening() {
            MIC_LISTENING
        } else {
            MIC_IDLE
        };

        let response = ui.add(
            egui::Button::new(RichText::new("🎤").size(18.0).color(tint))
                .fill(BUTTON_FILL)
                .corner_radius(6.0)
                .min_size(egui::vec2(36.0, 32.0)),
        );

        if response.clicked() {
            self.session.toggle();
        }

        if self.session.is_supported() {
            let hint = if self.session.is_listening() {
                "Stop listening"
            } else {
                "Start listening"
            };
            response.on_hover_text(hint)
        } else {
            response.on_hover_text("Speech recognition not available")
        }
    }
}
