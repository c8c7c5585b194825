//! Voice Panel: a settings side-panel and a speech-to-text microphone
//! button in one egui window.
//!
//! * [`settings`]: the model / API key / options record, persisted through
//!   a [`storage::KeyValueStore`] on every edit.
//! * [`speech`]: the listening/idle session around a pluggable recognition
//!   engine (local Whisper by default).
//! * [`audio`]: microphone capture feeding the local engine.
//! * [`config`]: `config.toml` and platform paths.
//! * [`app`]: the eframe shell hosting both widgets.

pub mod app;
pub mod audio;
pub mod config;
pub mod settings;
pub mod speech;
pub mod storage;
