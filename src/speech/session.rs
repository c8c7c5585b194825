//! The listening/idle state machine behind the microphone button.
//!
//! ```text
//!            toggle() / Started
//!   Idle ───────────────────────▶ Listening
//!     ▲                               │
//!     └─── toggle() / Ended / Error ──┘
//! ```
//!
//! [`SpeechSession`] owns at most one engine instance, built once from the
//! provider.  Engine events are drained with [`SpeechSession::poll_events`]
//! on the UI thread; only the binary listening flag and the transcript
//! callback are observable from outside.

use std::sync::Arc;

use super::event::{event_channel, joined_transcript, EventReceiver, RecognitionEvent};
use super::recognizer::{RecognitionProvider, RecognizerConfig, SpeechRecognizer};

/// Receives the current cumulative transcript.  Each call supersedes the
/// previous one.
pub type TranscriptCallback = Box<dyn FnMut(&str) + Send>;

// ---------------------------------------------------------------------------
// ListeningState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListeningState {
    #[default]
    Idle,
    Listening,
}

impl ListeningState {
    pub fn label(self) -> &'static str {
        match self {
            ListeningState::Idle => "Idle",
            ListeningState::Listening => "Listening",
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechSession
// ---------------------------------------------------------------------------

/// One speech-to-text control: engine, state and transcript callback.
pub struct SpeechSession {
    provider: Arc<dyn RecognitionProvider>,
    config: RecognizerConfig,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    events: EventReceiver,
    state: ListeningState,
    on_transcription: TranscriptCallback,
}

impl SpeechSession {
    /// Build the engine through `provider`.
    ///
    /// When the provider reports speech recognition as unsupported the
    /// session is permanently inert: it stays idle and [`toggle`] does
    /// nothing.
    ///
    /// [`toggle`]: SpeechSession::toggle
    pub fn new(
        provider: Arc<dyn RecognitionProvider>,
        config: RecognizerConfig,
        on_transcription: TranscriptCallback,
    ) -> Self {
        let (recognizer, events) = build_recognizer(provider.as_ref(), &config);
        Self {
            provider,
            config,
            recognizer,
            events,
            state: ListeningState::Idle,
            on_transcription,
        }
    }

    pub fn state(&self) -> ListeningState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == ListeningState::Listening
    }

    /// `false` when no engine could be constructed.
    pub fn is_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Start when idle, stop when listening.
    pub fn toggle(&mut self) {
        let Some(recognizer) = self.recognizer.as_mut() else {
            log::debug!("speech: toggle ignored, recognition unsupported");
            return;
        };

        match self.state {
            ListeningState::Idle => match recognizer.start() {
                Ok(()) => {
                    log::debug!("speech: Idle -> Listening");
                    self.state = ListeningState::Listening;
                }
                Err(e) => log::error!("speech: failed to start recognition: {e}"),
            },
            ListeningState::Listening => {
                recognizer.stop();
                log::debug!("speech: Listening -> Idle (stopped)");
                self.state = ListeningState::Idle;
            }
        }
    }

    /// Apply every pending engine event.  Non-blocking; call once per frame.
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
        }
    }

    /// Swap the transcript callback.
    ///
    /// The current engine is stopped (if listening) and replaced by a fresh
    /// one, so late events from the old engine never reach the new callback.
    pub fn set_on_transcription(&mut self, on_transcription: TranscriptCallback) {
        self.teardown();
        let (recognizer, events) = build_recognizer(self.provider.as_ref(), &self.config);
        self.recognizer = recognizer;
        self.events = events;
        self.on_transcription = on_transcription;
    }

    fn handle_event(&mut self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Started => {
                self.state = ListeningState::Listening;
            }
            RecognitionEvent::Result(results) => {
                let transcript = joined_transcript(&results);
                (self.on_transcription)(&transcript);
            }
            RecognitionEvent::Ended => {
                log::debug!("speech: engine ended");
                self.state = ListeningState::Idle;
            }
            RecognitionEvent::Error(kind) => {
                log::error!("speech: recognition error: {kind}");
                self.state = ListeningState::Idle;
            }
        }
    }

    /// Stop a live engine.  Safe to call more than once.
    fn teardown(&mut self) {
        if self.state == ListeningState::Listening {
            if let Some(recognizer) = self.recognizer.as_mut() {
                recognizer.stop();
            }
            self.state = ListeningState::Idle;
        }
    }
}

impl Drop for SpeechSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn build_recognizer(
    provider: &dyn RecognitionProvider,
    config: &RecognizerConfig,
) -> (Option<Box<dyn SpeechRecognizer>>, EventReceiver) {
    let (tx, rx) = event_channel();
    match provider.create(config, tx) {
        Ok(recognizer) => {
            log::debug!("speech: {} recognizer ready", provider.name());
            (Some(recognizer), rx)
        }
        Err(e) => {
            log::info!("speech: {e}; the microphone button is disabled");
            (None, rx)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
