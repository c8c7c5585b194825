//! Recognition engine interfaces and capability detection.
//!
//! # Overview
//!
//! [`RecognitionProvider`] is the capability lookup: it either constructs a
//! [`SpeechRecognizer`] bound to an event channel or reports that speech
//! recognition is unavailable.  [`detect_provider`] picks the provider once
//! at startup so nothing downstream branches on the environment.
//!
//! - [`WhisperProvider`]: production provider (local Whisper + microphone).
//! - [`UnsupportedProvider`]: the no-op provider; every `create` fails.
//! - `MockProvider` (under `#[cfg(test)]`): counts `start`/`stop` calls and
//!   exposes the event sender so tests can play the engine's part.
//!
//! [`WhisperProvider`]: super::local::WhisperProvider

use std::sync::Arc;

use thiserror::Error;

use crate::audio::AudioCapture;
use crate::config::{AppPaths, SpeechConfig};

use super::event::EventSender;
use super::local::{EngineTuning, WhisperProvider};

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors from constructing or driving a recognizer.
#[derive(Debug, Clone, Error)]
pub enum SpeechError {
    /// The host offers no usable speech recognition.
    #[error("speech recognition unsupported: {0}")]
    Unsupported(String),

    /// `start()` was called while a session is already running.
    #[error("recognition already started")]
    AlreadyStarted,

    /// The GGML model file was not found at the given path.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// `whisper_rs` failed to initialise a context or state.
    #[error("whisper context initialisation failed: {0}")]
    ContextInit(String),

    /// An error occurred during the inference pass.
    #[error("transcription error: {0}")]
    Transcription(String),

    /// The recognition worker could not be launched.
    #[error("failed to launch recognition worker: {0}")]
    Worker(String),
}

// ---------------------------------------------------------------------------
// RecognizerConfig
// ---------------------------------------------------------------------------

/// Per-engine configuration applied at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerConfig {
    /// Keep listening across utterances instead of ending after the first.
    pub continuous: bool,
    /// Report interim (non-final) results.
    pub interim_results: bool,
    /// BCP-47 language tag.
    pub language: String,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            interim_results: true,
            language: "en-US".into(),
        }
    }
}

impl From<&SpeechConfig> for RecognizerConfig {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            continuous: config.continuous,
            interim_results: config.interim_results,
            language: config.language.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A single engine instance.  Events go to the sender it was created with.
pub trait SpeechRecognizer: Send {
    /// Begin a recognition session.
    fn start(&mut self) -> Result<(), SpeechError>;

    /// Ask the running session to finish.  The engine still reports any
    /// final result followed by [`RecognitionEvent::Ended`].  No-op when
    /// idle.
    ///
    /// [`RecognitionEvent::Ended`]: super::RecognitionEvent::Ended
    fn stop(&mut self);
}

/// Factory for [`SpeechRecognizer`]s.
pub trait RecognitionProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Construct an engine that reports to `events`.
    ///
    /// Returns [`SpeechError::Unsupported`] when the capability is missing.
    fn create(
        &self,
        config: &RecognizerConfig,
        events: EventSender,
    ) -> Result<Box<dyn SpeechRecognizer>, SpeechError>;
}

// Compile-time assertion: both traits must be usable as trait objects.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechRecognizer>, _: Arc<dyn RecognitionProvider>) {}
};

// ---------------------------------------------------------------------------
// UnsupportedProvider
// ---------------------------------------------------------------------------

/// Provider for hosts without speech recognition.
#[derive(Debug, Clone)]
pub struct UnsupportedProvider {
    reason: String,
}

impl UnsupportedProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl RecognitionProvider for UnsupportedProvider {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn create(
        &self,
        _config: &RecognizerConfig,
        _events: EventSender,
    ) -> Result<Box<dyn SpeechRecognizer>, SpeechError> {
        Err(SpeechError::Unsupported(self.reason.clone()))
    }
}

// ---------------------------------------------------------------------------
// detect_provider
// ---------------------------------------------------------------------------

/// Pick the recognition provider for this host.
///
/// The model is looked up at two equivalent locations: the explicit
/// `model_path` and `ggml-<model>.bin` in the models directory.  The first
/// that exists wins.  Without a model, without a microphone, or when the
/// model fails to load, the [`UnsupportedProvider`] is returned.
pub fn detect_provider(config: &SpeechConfig, paths: &AppPaths) -> Arc<dyn RecognitionProvider> {
    let candidates = [config.model_path.clone(), Some(paths.model_file(&config.model))];
    let Some(model_path) = candidates.into_iter().flatten().find(|p| p.exists()) else {
        return Arc::new(UnsupportedProvider::new(format!(
            "no speech model found (looked for {})",
            paths.model_file(&config.model).display()
        )));
    };

    if !AudioCapture::input_available() {
        return Arc::new(UnsupportedProvider::new("no audio input device"));
    }

    match WhisperProvider::load(&model_path, EngineTuning::from(config)) {
        Ok(provider) => {
            log::info!("speech: whisper model loaded from {}", model_path.display());
            Arc::new(provider)
        }
        Err(e) => Arc::new(UnsupportedProvider::new(e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// MockProvider  (test-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) use mock::{MockHandle, MockProvider};

#[cfg(test)]
mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::speech::event::RecognitionEvent;

    /// Counters and the latest event sender, shared with the test body.
    #[derive(Clone, Default)]
    pub(crate) struct MockHandle {
        created: Arc<AtomicUsize>,
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
        sender: Arc<Mutex<Option<EventSender>>>,
        config: Arc<Mutex<Option<RecognizerConfig>>>,
    }

    impl MockHandle {
        pub(crate) fn created(&self) -> usize {
            self.created.load(Ordering::SeqCst)
        }

        pub(crate) fn starts(&self) -> usize {
            self.starts.load(Ordering::SeqCst)
        }

        pub(crate) fn stops(&self) -> usize {
            self.stops.load(Ordering::SeqCst)
        }

        pub(crate) fn config(&self) -> Option<RecognizerConfig> {
            self.config.lock().unwrap().clone()
        }

        /// Play the engine: push an event to the most recent recognizer's
        /// channel.  Returns `false` when the session has dropped it.
        pub(crate) fn emit(&self, event: RecognitionEvent) -> bool {
            self.sender
                .lock()
                .unwrap()
                .as_ref()
                .is_some_and(|tx| tx.send(event).is_ok())
        }
    }

    pub(crate) struct MockProvider {
        handle: MockHandle,
        fail_start: bool,
    }

    impl MockProvider {
        pub(crate) fn new() -> (Self, MockHandle) {
            let handle = MockHandle::default();
            (
                Self {
                    handle: handle.clone(),
                    fail_start: false,
                },
                handle,
            )
        }

        /// Provider whose recognizers refuse to start.
        pub(crate) fn failing_start() -> (Self, MockHandle) {
            let (mut provider, handle) = Self::new();
            provider.fail_start = true;
            (provider, handle)
        }
    }

    impl RecognitionProvider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn create(
            &self,
            config: &RecognizerConfig,
            events: EventSender,
        ) -> Result<Box<dyn SpeechRecognizer>, SpeechError> {
            self.handle.created.fetch_add(1, Ordering::SeqCst);
            *self.handle.sender.lock().unwrap() = Some(events);
            *self.handle.config.lock().unwrap() = Some(config.clone());
            Ok(Box::new(MockRecognizer {
                handle: self.handle.clone(),
                fail_start: self.fail_start,
            }))
        }
    }

    struct MockRecognizer {
        handle: MockHandle,
        fail_start: bool,
    }

    impl SpeechRecognizer for MockRecognizer {
        fn start(&mut self) -> Result<(), SpeechError> {
            self.handle.starts.fetch_add(1, Ordering::SeqCst);
            if self.fail_start {
                return Err(SpeechError::Worker("mock refused to start".into()));
            }
            Ok(())
        }

        fn stop(&mut self) {
            self.handle.stops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
