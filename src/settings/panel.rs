//! Settings side-panel widget.
//!
//! Renders the three settings rows inside an `egui::SidePanel` and routes
//! every edit through [`SettingsStore`] so it is persisted immediately.

use eframe::egui::{self, Color32, RichText};

use super::catalog::MODEL_CATALOG;
use super::store::SettingsStore;

const TEXT_DIM: Color32 = Color32::from_rgb(140, 140, 140);
const LABEL_WIDTH: f32 = 110.0;

// ---------------------------------------------------------------------------
// PanelVisibility
// ---------------------------------------------------------------------------

/// Whether the side panel is shown.  Purely local UI state; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelVisibility {
    Open,
    #[default]
    Closed,
}

impl PanelVisibility {
    pub fn is_open(self) -> bool {
        self == PanelVisibility::Open
    }

    /// Flip between open and closed.
    pub fn toggle(&mut self) {
        *self = match self {
            PanelVisibility::Open => PanelVisibility::Closed,
            PanelVisibility::Closed => PanelVisibility::Open,
        };
    }
}

// ---------------------------------------------------------------------------
// SettingsPanel
// ---------------------------------------------------------------------------

/// The settings side panel plus its trigger button.
pub struct SettingsPanel {
    store: SettingsStore,
    visibility: PanelVisibility,
}

impl SettingsPanel {
    /// Wrap an already hydrated store.  The panel always starts closed.
    pub fn new(store: SettingsStore) -> Self {
        Self {
            store,
            visibility: PanelVisibility::Closed,
        }
    }

    pub fn visibility(&self) -> PanelVisibility {
        self.visibility
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Draw the gear button that opens and closes the panel.
    pub fn show_trigger(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let response = ui
            .add(egui::Button::new(RichText::new("⚙").size(18.0)).frame(false))
            .on_hover_text("Settings");
        if response.clicked() {
            self.visibility.toggle();
        }
        response
    }

    /// Draw the side panel when open.  Escape dismisses it.
    pub fn show(&mut self, ctx: &egui::Context) {
        if !self.visibility.is_open() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.visibility = PanelVisibility::Closed;
            return;
        }

        egui::SidePanel::right("settings_panel")
            .resizable(false)
            .exact_width(400.0)
            .show(ctx, |ui| {
                self.draw_header(ui);
                ui.separator();
                ui.add_space(8.0);

                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .min_col_width(LABEL_WIDTH)
                    .spacing([12.0, 12.0])
                    .show(ui, |ui| {
                        self.draw_model_row(ui);
                        ui.end_row();
                        self.draw_api_key_row(ui);
                        ui.end_row();
                        self.draw_options_row(ui);
                        ui.end_row();
                    });
            });
    }

    fn draw_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Settings");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add(egui::Button::new(RichText::new("x").size(14.0)).frame(false))
                    .on_hover_text("Close")
                    .clicked()
                {
                    self.visibility = PanelVisibility::Closed;
                }
            });
        });
        ui.label(RichText::new("Configure your model and API key settings.").color(TEXT_DIM));
    }

    fn draw_model_row(&mut self, ui: &mut egui::Ui) {
        ui.label("Model");

        let current = self.store.settings().selected_model.clone();
        let selected_text = match self.store.selected_model_name() {
            Some(name) => RichText::new(name),
            None => RichText::new("Select a model").color(TEXT_DIM),
        };

        let mut choice = current.clone();
        egui::ComboBox::from_id_salt("settings_model")
            .selected_text(selected_text)
            .width(240.0)
            .show_ui(ui, |ui| {
                for model in MODEL_CATALOG {
                    ui.selectable_value(&mut choice, model.id.to_string(), model.name);
                }
            });

        if choice != current {
            log::debug!("settings: model {current:?} -> {choice:?}");
            if let Err(e) = self.store.select_model(choice) {
                log::error!("settings: failed to persist model selection: {e}");
            }
        }
    }

    fn draw_api_key_row(&mut self, ui: &mut egui::Ui) {
        ui.label("API Key");

        let mut api_key = self.store.settings().api_key.clone();
        let response = ui.add(
            egui::TextEdit::singleline(&mut api_key)
                .password(true)
                .desired_width(240.0),
        );
        if response.changed() {
            if let Err(e) = self.store.set_api_key(api_key) {
                log::error!("settings: failed to persist API key: {e}");
            }
        }
    }

    fn draw_options_row(&mut self, ui: &mut egui::Ui) {
        ui.label("Model Options");

        let mut options = self.store.settings().model_options.clone();
        let response = ui.add(
            egui::TextEdit::multiline(&mut options)
                .hint_text("Enter model-specific options (e.g., JSON)")
                .desired_rows(6)
                .desired_width(240.0)
                .code_editor(),
        );
        if response.changed() {
            if let Err(e) = self.store.set_model_options(options) {
                log::error!("settings: failed to persist model options: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn visibility_starts_closed() {
        assert_eq!(PanelVisibility::default(), PanelVisibility::Closed);
        let store = SettingsStore::load(Box::new(MemoryStore::new())).unwrap();
        assert!(!SettingsPanel::new(store).visibility().is_open());
    }

    #[test]
    fn toggle_flips_both_ways() {
        let mut v = PanelVisibility::Closed;
        v.toggle();
        assert_eq!(v, PanelVisibility::Open);
        v.toggle();
        assert_eq!(v, PanelVisibility::Closed);
    }
}
