//! Speech-to-text input.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ SpeechToTextButton (egui) ──click──▶ SpeechSession          │
//! │                                       │ toggle(): start/stop │
//! │                                       ▼                      │
//! │        RecognitionProvider ──create──▶ SpeechRecognizer      │
//! │   (WhisperProvider | UnsupportedProvider)   │                │
//! │                                             │ RecognitionEvent
//! │                      poll_events() ◀── tokio mpsc ◀──┘       │
//! │                            │                                 │
//! │                            ▼                                 │
//! │              on_transcription(cumulative text)               │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The provider is chosen once by [`detect_provider`]; callers never
//! branch on whether speech recognition exists.

pub mod button;
pub mod event;
pub mod local;
pub mod recognizer;
pub mod session;
pub mod whisper;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use button::SpeechToTextButton;
pub use event::{
    event_channel, joined_transcript, EventReceiver, EventSender, RecognitionAlternative,
    RecognitionErrorKind, RecognitionEvent, RecognitionResult,
};
pub use local::{EngineTuning, LocalRecognizer, Transcriber, WhisperProvider};
pub use recognizer::{
    detect_provider, RecognitionProvider, RecognizerConfig, SpeechError, SpeechRecognizer,
    UnsupportedProvider,
};
pub use session::{ListeningState, SpeechSession, TranscriptCallback};
pub use whisper::{whisper_language, WhisperTranscriber};
