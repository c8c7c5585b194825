//! Application configuration structs, defaults and TOML persistence.
//!
//! This is the *application* configuration (`config.toml`): where the
//! key-value store lives and how the speech engine is tuned.  The user's
//! model/API-key record edited in the settings panel is a different thing and
//! lives in [`crate::settings`].

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

/// Location of the key-value store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Explicit path of the store file.  `None` uses
    /// [`AppPaths::storage_file`].
    pub file: Option<PathBuf>,
}

impl StorageConfig {
    /// The store file to open, resolving the default through `paths`.
    pub fn resolve(&self, paths: &AppPaths) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| paths.storage_file.clone())
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the speech recognition engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// BCP-47 language tag handed to the recognizer (e.g. `"en-US"`).
    pub language: String,
    /// Keep listening across utterances instead of stopping after the first.
    pub continuous: bool,
    /// Deliver partial transcripts before an utterance is finalised.
    pub interim_results: bool,
    /// GGML model stem looked up in the models directory
    /// (`ggml-<model>.bin`).
    pub model: String,
    /// Explicit model file; checked before the models directory.
    pub model_path: Option<PathBuf>,
    /// Milliseconds between interim transcriptions.
    pub interim_interval_ms: u64,
    /// RMS level above which a 30 ms frame counts as speech.
    pub silence_threshold: f32,
    /// Trailing silence that ends an utterance, in milliseconds.
    pub end_silence_ms: u64,
    /// Hard cap on a single utterance, in seconds.
    pub max_utterance_secs: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".into(),
            continuous: false,
            interim_results: true,
            model: "base.en".into(),
            model_path: None,
            interim_interval_ms: 1_000,
            silence_threshold: 0.01,
            end_silence_ms: 1_200,
            max_utterance_secs: 30.0,
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Keep the window above all other windows.
    pub always_on_top: bool,
    /// Initial inner size `(width, height)` in points.
    pub window_size: (f32, f32),
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            always_on_top: false,
            window_size: (720.0, 420.0),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `config.toml`.
///
/// Every section is `#[serde(default)]`, so a partial file only overrides
/// the keys it names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Key-value store location.
    pub storage: StorageConfig,
    /// Speech engine settings.
    pub speech: SpeechConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `config.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().config_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `config.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().config_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");

        let mut original = AppConfig::default();
        original.speech.language = "de-DE".into();
        original.speech.continuous = true;
        original.storage.file = Some(dir.path().join("kv.json"));
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.speech.language, "de-DE");
        assert!(loaded.speech.continuous);
        assert_eq!(loaded.speech.interim_results, original.speech.interim_results);
        assert_eq!(loaded.speech.model, original.speech.model);
        assert_eq!(loaded.speech.end_silence_ms, original.speech.end_silence_ms);
        assert_eq!(loaded.storage.file, original.storage.file);
        assert_eq!(loaded.ui.window_size, original.ui.window_size);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.speech.language, "en-US");
        assert!(config.storage.file.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[speech]\nlanguage = \"fr-FR\"\n").unwrap();

        let config = AppConfig::load_from(&path).expect("load");
        assert_eq!(config.speech.language, "fr-FR");
        assert!(!config.speech.continuous);
        assert!(config.speech.interim_results);
        assert!(!config.ui.always_on_top);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[speech\nlanguage = ").unwrap();

        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn defaults_match_recognizer_contract() {
        let speech = SpeechConfig::default();
        assert!(!speech.continuous);
        assert!(speech.interim_results);
        assert_eq!(speech.language, "en-US");
    }

    #[test]
    fn storage_resolve_prefers_explicit_file() {
        let paths = AppPaths::with_dirs(PathBuf::from("/cfg"), PathBuf::from("/data"));
        let default = StorageConfig::default();
        assert_eq!(default.resolve(&paths), PathBuf::from("/cfg/storage.json"));

        let explicit = StorageConfig {
            file: Some(PathBuf::from("/tmp/kv.json")),
        };
        assert_eq!(explicit.resolve(&paths), PathBuf::from("/tmp/kv.json"));
    }
}
