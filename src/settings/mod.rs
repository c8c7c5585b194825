//! User settings: the model / API key / options record edited in the side
//! panel.
//!
//! # Architecture
//!
//! ```text
//! SettingsPanel (egui) ──edit──▶ SettingsStore ──JSON blob──▶ KeyValueStore
//!                                      ▲                       ("userSettings")
//!                                      └──────hydrate on load──────┘
//! ```
//!
//! # Quick start
//!
//! ```
//! use voice_panel::settings::SettingsStore;
//! use voice_panel::storage::MemoryStore;
//!
//! let mut store = SettingsStore::load(Box::new(MemoryStore::new())).unwrap();
//! store.select_model("model-1").unwrap();
//! store.set_api_key("sk-123").unwrap();
//! assert_eq!(store.selected_model_name(), Some("Model A"));
//! ```

pub mod catalog;
pub mod panel;
pub mod record;
pub mod store;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use catalog::{display_name, find_model, ModelDescriptor, MODEL_CATALOG};
pub use panel::{PanelVisibility, SettingsPanel};
pub use record::{SettingsError, UserSettings, SETTINGS_KEY};
pub use store::SettingsStore;
