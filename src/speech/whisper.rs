//! Whisper inference wrapper used by the local recognizer.
//!
//! [`WhisperTranscriber`] loads a GGML model once and creates a fresh
//! `WhisperState` per call, so one instance can be shared behind an `Arc`
//! by every recognition session.

use std::path::Path;

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::recognizer::SpeechError;

/// Whisper refuses clips shorter than this: 0.5 s × 16 000 Hz.
pub const MIN_AUDIO_SAMPLES: usize = 8_000;

/// Loaded Whisper model.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
    n_threads: i32,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("n_threads", &self.n_threads)
            .finish_non_exhaustive()
    }
}

// SAFETY: whisper-rs declares WhisperContext Send + Sync; the weights are
// read-only after loading and all mutable state lives in per-call states.
unsafe impl Send for WhisperTranscriber {}
unsafe impl Sync for WhisperTranscriber {}

impl WhisperTranscriber {
    /// Load a GGML model from `model_path`.
    ///
    /// # Errors
    ///
    /// - [`SpeechError::ModelNotFound`]: `model_path` does not exist.
    /// - [`SpeechError::ContextInit`]: whisper-rs failed to load the file.
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, SpeechError> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(SpeechError::ModelNotFound(path.display().to_string()));
        }

        let path_str = path.to_str().ok_or_else(|| {
            SpeechError::ModelNotFound(format!(
                "model path contains non-UTF-8 characters: {}",
                path.display()
            ))
        })?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| SpeechError::ContextInit(e.to_string()))?;

        Ok(Self {
            ctx,
            n_threads: inference_threads(),
        })
    }

    /// Transcribe 16 kHz mono audio.
    ///
    /// Clips shorter than [`MIN_AUDIO_SAMPLES`] are padded with silence.
    /// `language` is an ISO-639-1 code or `None` for auto-detection.
    pub fn transcribe(&self, audio: &[f32], language: Option<&str>) -> Result<String, SpeechError> {
        let padded;
        let audio = if audio.len() < MIN_AUDIO_SAMPLES {
            padded = pad_to_min(audio);
            padded.as_slice()
        } else {
            audio
        };

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(language);
        params.set_n_threads(self.n_threads);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_special(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| SpeechError::ContextInit(e.to_string()))?;

        state
            .full(params, audio)
            .map_err(|e| SpeechError::Transcription(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| SpeechError::Transcription(e.to_string()))?;

        let mut text = String::new();
        for i in 0..n_segments {
            let segment = state
                .full_get_segment_text(i)
                .map_err(|e| SpeechError::Transcription(format!("segment {i}: {e}")))?;
            text.push_str(&segment);
        }

        Ok(text.trim().to_string())
    }
}

/// Whisper language code for a BCP-47 tag: the primary subtag, lowercased.
/// `"auto"` and empty tags mean auto-detection.
///
/// ```
/// use voice_panel::speech::whisper_language;
///
/// assert_eq!(whisper_language("en-US").as_deref(), Some("en"));
/// assert_eq!(whisper_language("auto"), None);
/// ```
pub fn whisper_language(tag: &str) -> Option<String> {
    let primary = tag.split(['-', '_']).next().unwrap_or_default().trim();
    if primary.is_empty() || primary.eq_ignore_ascii_case("auto") {
        None
    } else {
        Some(primary.to_ascii_lowercase())
    }
}

fn pad_to_min(audio: &[f32]) -> Vec<f32> {
    let mut padded = audio.to_vec();
    padded.resize(MIN_AUDIO_SAMPLES, 0.0);
    padded
}

/// CPU threads for inference, capped at 8.
fn inference_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}
