//! Desktop shell hosting the two widgets.
//!
//! [`VoicePanelApp`] is the top-level [`eframe::App`].  It owns:
//!
//! * a [`SettingsPanel`] (gear button + right side panel), and
//! * a [`SpeechSession`] rendered as a [`SpeechToTextButton`] next to a
//!   prompt field that shows the latest transcript.
//!
//! The two widgets never talk to each other.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use eframe::egui::{self, Color32, RichText};

use crate::settings::SettingsPanel;
use crate::speech::{SpeechSession, SpeechToTextButton, TranscriptCallback};

/// Transcript text shared between the speech callback and the prompt field.
pub type SharedTranscript = Arc<Mutex<String>>;

/// Callback that replaces the shared transcript with each delivery.
pub fn transcript_sink(target: &SharedTranscript) -> TranscriptCallback {
    let target = Arc::clone(target);
    Box::new(move |text: &str| {
        if let Ok(mut current) = target.lock() {
            current.clear();
            current.push_str(text);
        }
    })
}

/// eframe application.
pub struct VoicePanelApp {
    settings: SettingsPanel,
    speech: SpeechSession,
    transcript: SharedTranscript,
}

impl VoicePanelApp {
    /// `speech` should have been built with [`transcript_sink`] over
    /// `transcript`.
    pub fn new(settings: SettingsPanel, speech: SpeechSession, transcript: SharedTranscript) -> Self {
        Self {
            settings,
            speech,
            transcript,
        }
    }

    fn draw_top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Voice Panel");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                self.settings.show_trigger(ui);
                let model = self
                    .settings
                    .store()
                    .selected_model_name()
                    .unwrap_or("no model selected");
                ui.label(RichText::new(model).color(Color32::from_rgb(140, 140, 140)));
            });
        });
    }

    fn draw_prompt(&mut self, ui: &mut egui::Ui) {
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            let width = (ui.available_width() - 48.0).max(120.0);
            // Typing edits the same buffer the transcript callback writes to.
            if let Ok(mut text) = self.transcript.lock() {
                ui.add(
                    egui::TextEdit::multiline(&mut *text)
                        .hint_text("Type or dictate…")
                        .desired_rows(4)
                        .desired_width(width),
                );
            }
            ui.add(SpeechToTextButton::new(&mut self.speech));
        });

        ui.add_space(4.0);
        ui.label(
            RichText::new(self.speech.state().label())
                .color(if self.speech.is_listening() {
                    Color32::from_rgb(239, 68, 68)
                } else {
                    Color32::from_rgb(120, 120, 120)
                })
                .size(11.0),
        );
    }
}

impl eframe::App for VoicePanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.speech.poll_events();

        // Engine events arrive off-thread; keep draining them while a
        // session is live.
        if self.speech.is_listening() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        self.settings.show(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_top_bar(ui);
            ui.separator();
            self.draw_prompt(ui);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("voice panel closing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_replaces_rather_than_appends() {
        let transcript: SharedTranscript = Arc::new(Mutex::new("typed".into()));
        let mut sink = transcript_sink(&transcript);

        sink("hello");
        sink("hello world");

        assert_eq!(*transcript.lock().unwrap(), "hello world");
    }
}
