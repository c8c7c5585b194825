//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (`config.toml` + `storage.json`):
//!   Windows: %APPDATA%\voice-panel\
//!   macOS:   ~/Library/Application Support/voice-panel/
//!   Linux:   ~/.config/voice-panel/
//!
//! Data dir (speech models):
//!   Windows: %LOCALAPPDATA%\voice-panel\
//!   macOS:   ~/Library/Application Support/voice-panel/
//!   Linux:   ~/.local/share/voice-panel/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `config.toml` and `storage.json`.
    pub config_dir: PathBuf,
    /// Full path to `config.toml`.
    pub config_file: PathBuf,
    /// Full path to the key-value store backing the settings panel.
    pub storage_file: PathBuf,
    /// Directory searched for GGML speech model files.
    pub models_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-panel";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        Self::with_dirs(config_dir, data_dir)
    }

    /// Build the layout under explicit roots (used by tests).
    pub fn with_dirs(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.toml");
        let storage_file = config_dir.join("storage.json");
        let models_dir = data_dir.join("models");

        Self {
            config_dir,
            config_file,
            storage_file,
            models_dir,
        }
    }

    /// Path of the GGML file for the model named `model` in [`Self::models_dir`].
    pub fn model_file(&self, model: &str) -> PathBuf {
        self.models_dir.join(format!("ggml-{model}.bin"))
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.models_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .config_file
            .file_name()
            .is_some_and(|n| n == "config.toml"));
        assert!(paths
            .storage_file
            .file_name()
            .is_some_and(|n| n == "storage.json"));
    }

    #[test]
    fn model_file_lives_in_models_dir() {
        let paths = AppPaths::with_dirs(PathBuf::from("/cfg"), PathBuf::from("/data"));
        assert_eq!(
            paths.model_file("base.en"),
            PathBuf::from("/data/models/ggml-base.en.bin")
        );
    }
}
