//! Events a recognition engine reports back to its session.
//!
//! The engine is the only producer and the [`SpeechSession`] the only
//! consumer.  Events travel over an unbounded `tokio::sync::mpsc` channel;
//! the session drains it from the UI thread with `try_recv`.
//!
//! [`SpeechSession`]: super::SpeechSession

use thiserror::Error;
use tokio::sync::mpsc;

/// Producer end handed to a recognizer.
pub type EventSender = mpsc::UnboundedSender<RecognitionEvent>;
/// Consumer end held by the session.
pub type EventReceiver = mpsc::UnboundedReceiver<RecognitionEvent>;

/// Create a fresh event channel.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

// ---------------------------------------------------------------------------
// RecognitionEvent
// ---------------------------------------------------------------------------

/// One notification from the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// Audio capture began.
    Started,
    /// The full set of result entries for the current session so far.
    ///
    /// Each event supersedes the previous one; entries are not deltas.
    Result(Vec<RecognitionResult>),
    /// The session finished, either on its own or after `stop()`.
    Ended,
    /// The session failed.  An [`RecognitionEvent::Ended`] normally follows.
    Error(RecognitionErrorKind),
}

// ---------------------------------------------------------------------------
// RecognitionResult
// ---------------------------------------------------------------------------

/// One recognised segment with its ranked alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    /// Best alternative first.
    pub alternatives: Vec<RecognitionAlternative>,
    /// `false` while the segment is still an interim guess.
    pub is_final: bool,
}

impl RecognitionResult {
    /// Single-alternative result.
    pub fn new(transcript: impl Into<String>, is_final: bool) -> Self {
        Self {
            alternatives: vec![RecognitionAlternative {
                transcript: transcript.into(),
                confidence: 1.0,
            }],
            is_final,
        }
    }

    /// Transcript of the best alternative, if any.
    pub fn best_transcript(&self) -> Option<&str> {
        self.alternatives.first().map(|a| a.transcript.as_str())
    }
}

/// A candidate transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAlternative {
    pub transcript: String,
    /// Engine confidence in `[0.0, 1.0]`.
    pub confidence: f32,
}

/// Concatenate the best transcript of every entry, in order, with no
/// separator.  Entries without alternatives contribute nothing.
///
/// ```
/// use voice_panel::speech::{joined_transcript, RecognitionResult};
///
/// let results = vec![
///     RecognitionResult::new("hello ", true),
///     RecognitionResult::new("world", false),
/// ];
/// assert_eq!(joined_transcript(&results), "hello world");
/// ```
pub fn joined_transcript(results: &[RecognitionResult]) -> String {
    results
        .iter()
        .filter_map(RecognitionResult::best_transcript)
        .collect()
}

// ---------------------------------------------------------------------------
// RecognitionErrorKind
// ---------------------------------------------------------------------------

/// Why a recognition session failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecognitionErrorKind {
    #[error("no speech detected")]
    NoSpeech,

    #[error("recognition aborted")]
    Aborted,

    #[error("audio capture failed: {0}")]
    AudioCapture(String),

    #[error("recognition engine failed: {0}")]
    Engine(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_skips_entries_without_alternatives() {
        let results = vec![
            RecognitionResult::new("a", true),
            RecognitionResult {
                alternatives: Vec::new(),
                is_final: false,
            },
            RecognitionResult::new("b", false),
        ];
        assert_eq!(joined_transcript(&results), "ab");
    }

    #[test]
    fn join_uses_first_alternative_only() {
        let result = RecognitionResult {
            alternatives: vec![
                RecognitionAlternative {
                    transcript: "best".into(),
                    confidence: 0.9,
                },
                RecognitionAlternative {
                    transcript: "worse".into(),
                    confidence: 0.1,
                },
            ],
            is_final: true,
        };
        assert_eq!(joined_transcript(&[result]), "best");
    }

    #[test]
    fn empty_results_join_to_empty_string() {
        assert_eq!(joined_transcript(&[]), "");
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(RecognitionErrorKind::NoSpeech.to_string(), "no speech detected");
        assert!(RecognitionErrorKind::AudioCapture("busy".into())
            .to_string()
            .contains("busy"));
    }
}
