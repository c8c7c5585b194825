//! Application entry point for Voice Panel.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk; on first run write the defaults out so
//!    there is a file to edit.
//! 3. Open the key-value store and hydrate the settings record.
//! 4. Detect the speech recognition provider.
//! 5. Build the speech session around a shared transcript buffer.
//! 6. Run [`eframe::run_native`]; blocks until the window is closed.

use std::sync::{Arc, Mutex};

use eframe::egui;
use voice_panel::{
    app::{transcript_sink, SharedTranscript, VoicePanelApp},
    config::{AppConfig, AppPaths},
    settings::{SettingsPanel, SettingsStore},
    speech::{detect_provider, RecognizerConfig, SpeechSession},
    storage::{FileStore, KeyValueStore, MemoryStore},
};

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Open the on-disk store, falling back to a volatile one so the panel still
/// works when the file is unreadable.
fn open_storage(config: &AppConfig, paths: &AppPaths) -> Box<dyn KeyValueStore> {
    let path = config.storage.resolve(paths);
    match FileStore::open(&path) {
        Ok(store) => {
            log::info!("Settings storage: {}", path.display());
            Box::new(store)
        }
        Err(e) => {
            log::warn!(
                "Cannot open settings storage {} ({e}); settings will not be saved",
                path.display()
            );
            Box::new(MemoryStore::new())
        }
    }
}

fn load_settings(config: &AppConfig, paths: &AppPaths) -> SettingsStore {
    match SettingsStore::load(open_storage(config, paths)) {
        Ok(store) => store,
        Err(e) => {
            log::warn!("Failed to load settings ({e}); starting from an in-memory store");
            SettingsStore::load(Box::new(MemoryStore::new()))
                .expect("in-memory settings store cannot fail")
        }
    }
}

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title("Voice Panel")
        .with_inner_size([width, height])
        .with_min_inner_size([480.0, 240.0]);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice Panel starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    let paths = AppPaths::new();
    if !paths.config_file.exists() {
        match config.save() {
            Ok(()) => log::info!("Wrote default config to {}", paths.config_file.display()),
            Err(e) => log::warn!("Could not write default config: {e}"),
        }
    }

    // 3. Settings
    let settings = SettingsPanel::new(load_settings(&config, &paths));

    // 4. Speech provider (capability detection happens exactly once)
    let provider = detect_provider(&config.speech, &paths);
    log::info!("Speech provider: {}", provider.name());

    // 5. Speech session
    let transcript: SharedTranscript = Arc::new(Mutex::new(String::new()));
    let speech = SpeechSession::new(
        provider,
        RecognizerConfig::from(&config.speech),
        transcript_sink(&transcript),
    );

    // 6. Run the UI
    let app = VoicePanelApp::new(settings, speech, transcript);
    eframe::run_native(
        "Voice Panel",
        native_options(&config),
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
