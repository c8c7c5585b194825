//! Local speech engine: microphone capture + Whisper on a worker thread.
//!
//! # Session flow
//!
//! ```text
//! start() ──spawn "speech-session"──▶ open mic ──▶ Started
//!    │                                   │
//!    │        AudioChunk (std mpsc) ◀────┘
//!    │               │ into_mono_16k + VAD
//!    │               ├─ every interim interval ─▶ Result([... , interim])
//!    │               └─ trailing silence / max length ─▶ Result([... , final])
//!    │                        └─ non-continuous ─▶ Ended
//! stop() ──AtomicBool──▶ finalise current utterance ─▶ Result ─▶ Ended
//! ```
//!
//! Interim and end-of-utterance timing is measured in captured audio, not
//! wall-clock time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::audio::{AudioCapture, AudioChunk, VadDetector, TARGET_SAMPLE_RATE};
use crate::config::SpeechConfig;

use super::event::{EventSender, RecognitionErrorKind, RecognitionEvent, RecognitionResult};
use super::recognizer::{RecognitionProvider, RecognizerConfig, SpeechError, SpeechRecognizer};
use super::whisper::{whisper_language, WhisperTranscriber};

/// How long the worker blocks on the audio channel before re-checking the
/// stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Audio kept before the first voice frame, so word onsets are not clipped.
const PRE_ROLL_SAMPLES: usize = TARGET_SAMPLE_RATE as usize * 3 / 10;

// ---------------------------------------------------------------------------
// Transcriber
// ---------------------------------------------------------------------------

/// Speech-to-text over a finished clip of 16 kHz mono audio.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, audio: &[f32], language: Option<&str>) -> Result<String, SpeechError>;
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &[f32], language: Option<&str>) -> Result<String, SpeechError> {
        WhisperTranscriber::transcribe(self, audio, language)
    }
}

// ---------------------------------------------------------------------------
// EngineTuning
// ---------------------------------------------------------------------------

/// Timing and sensitivity knobs of the local engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineTuning {
    pub interim_interval_ms: u64,
    pub silence_threshold: f32,
    pub end_silence_ms: u64,
    pub max_utterance_secs: f32,
}

impl Default for EngineTuning {
    fn default() -> Self {
        EngineTuning::from(&SpeechConfig::default())
    }
}

impl From<&SpeechConfig> for EngineTuning {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            interim_interval_ms: config.interim_interval_ms,
            silence_threshold: config.silence_threshold,
            end_silence_ms: config.end_silence_ms,
            max_utterance_secs: config.max_utterance_secs,
        }
    }
}

impl EngineTuning {
    fn interim_samples(&self) -> usize {
        ms_to_samples(self.interim_interval_ms).max(1)
    }

    fn end_silence_samples(&self) -> usize {
        ms_to_samples(self.end_silence_ms).max(1)
    }

    fn max_utterance_samples(&self) -> usize {
        ((self.max_utterance_secs.max(0.0) * TARGET_SAMPLE_RATE as f32) as usize).max(1)
    }
}

fn ms_to_samples(ms: u64) -> usize {
    (ms * TARGET_SAMPLE_RATE as u64 / 1_000) as usize
}

// ---------------------------------------------------------------------------
// WhisperProvider
// ---------------------------------------------------------------------------

/// Production [`RecognitionProvider`].  The model is loaded once and shared
/// by every recognizer it creates.
pub struct WhisperProvider {
    transcriber: Arc<dyn Transcriber>,
    tuning: EngineTuning,
}

impl WhisperProvider {
    /// Load the GGML model at `model_path`.
    pub fn load(
        model_path: impl AsRef<std::path::Path>,
        tuning: EngineTuning,
    ) -> Result<Self, SpeechError> {
        let transcriber = WhisperTranscriber::load(model_path)?;
        Ok(Self::with_transcriber(Arc::new(transcriber), tuning))
    }

    /// Provider around an already loaded transcriber.
    pub fn with_transcriber(transcriber: Arc<dyn Transcriber>, tuning: EngineTuning) -> Self {
        Self { transcriber, tuning }
    }
}

impl RecognitionProvider for WhisperProvider {
    fn name(&self) -> &'static str {
        "whisper"
    }

    fn create(
        &self,
        config: &RecognizerConfig,
        events: EventSender,
    ) -> Result<Box<dyn SpeechRecognizer>, SpeechError> {
        Ok(Box::new(LocalRecognizer {
            context: Arc::new(SessionContext {
                transcriber: Arc::clone(&self.transcriber),
                config: config.clone(),
                language: whisper_language(&config.language),
                tuning: self.tuning.clone(),
                events,
            }),
            worker: None,
        }))
    }
}

// ---------------------------------------------------------------------------
// LocalRecognizer
// ---------------------------------------------------------------------------

/// Everything a session worker needs, shared with the recognizer.
struct SessionContext {
    transcriber: Arc<dyn Transcriber>,
    config: RecognizerConfig,
    language: Option<String>,
    tuning: EngineTuning,
    events: EventSender,
}

impl SessionContext {
    /// Send an event; `false` once the session has gone away.
    fn emit(&self, event: RecognitionEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// One engine instance.  At most one worker thread is alive at a time.
pub struct LocalRecognizer {
    context: Arc<SessionContext>,
    worker: Option<Worker>,
}

impl LocalRecognizer {
    /// Raise the current worker's stop flag.  `true` only for the call that
    /// actually raised it; the worker finalises on its next poll and releases
    /// the microphone.
    fn signal_stop(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.stop.swap(true, Ordering::SeqCst))
    }

    fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }
}

impl SpeechRecognizer for LocalRecognizer {
    fn start(&mut self) -> Result<(), SpeechError> {
        if self.is_running() {
            return Err(SpeechError::AlreadyStarted);
        }

        let stop = Arc::new(AtomicBool::new(false));
        let context = Arc::clone(&self.context);
        let worker_stop = Arc::clone(&stop);

        let handle = std::thread::Builder::new()
            .name("speech-session".into())
            .spawn(move || capture_and_run(&context, &worker_stop))
            .map_err(|e| SpeechError::Worker(e.to_string()))?;

        self.worker = Some(Worker { stop, handle });
        Ok(())
    }

    fn stop(&mut self) {
        if self.signal_stop() {
            log::debug!("speech: stop signalled");
        }
    }
}

impl Drop for LocalRecognizer {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Worker body
// ---------------------------------------------------------------------------

/// Open the microphone on this thread and run the session over it.
fn capture_and_run(context: &SessionContext, stop: &AtomicBool) {
    let capture = match AudioCapture::new() {
        Ok(capture) => capture,
        Err(e) => {
            log::error!("speech: cannot open microphone: {e}");
            context.emit(RecognitionEvent::Error(RecognitionErrorKind::AudioCapture(
                e.to_string(),
            )));
            context.emit(RecognitionEvent::Ended);
            return;
        }
    };

    let (tx, rx) = mpsc::channel::<AudioChunk>();
    let _stream = match capture.start(tx) {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("speech: cannot start microphone stream: {e}");
            context.emit(RecognitionEvent::Error(RecognitionErrorKind::AudioCapture(
                e.to_string(),
            )));
            context.emit(RecognitionEvent::Ended);
            return;
        }
    };

    run_session(context, &rx, stop);
}

/// Outcome of feeding one chunk to the [`UtteranceState`].
#[derive(Debug, PartialEq)]
enum Step {
    Continue,
    Finish,
}

/// Per-session bookkeeping.
struct UtteranceState<'a> {
    context: &'a SessionContext,
    vad: VadDetector,
    finalized: Vec<RecognitionResult>,
    current: Vec<f32>,
    heard_voice: bool,
    trailing_silence: usize,
    leading_silence: usize,
    since_interim: usize,
}

impl<'a> UtteranceState<'a> {
    fn new(context: &'a SessionContext) -> Self {
        Self {
            context,
            vad: VadDetector::new(context.tuning.silence_threshold),
            finalized: Vec::new(),
            current: Vec::new(),
            heard_voice: false,
            trailing_silence: 0,
            leading_silence: 0,
            since_interim: 0,
        }
    }

    fn tuning(&self) -> &EngineTuning {
        &self.context.tuning
    }

    fn push(&mut self, samples: Vec<f32>) -> Result<Step, RecognitionErrorKind> {
        let voiced = self.vad.contains_voice(&samples);
        let len = samples.len();

        if voiced {
            self.trailing_silence = self.vad.trailing_silence_samples(&samples);
            self.heard_voice = true;
        } else {
            self.trailing_silence += len;
        }
        self.current.extend(samples);

        if !self.heard_voice {
            self.leading_silence += len;
            if self.current.len() > PRE_ROLL_SAMPLES {
                let excess = self.current.len() - PRE_ROLL_SAMPLES;
                self.current.drain(..excess);
            }
            if !self.context.config.continuous
                && self.leading_silence >= self.tuning().max_utterance_samples()
            {
                return Err(RecognitionErrorKind::NoSpeech);
            }
            return Ok(Step::Continue);
        }

        self.since_interim += len;

        let utterance_over = self.trailing_silence >= self.tuning().end_silence_samples()
            || self.current.len() >= self.tuning().max_utterance_samples();

        if utterance_over {
            self.finalize()?;
            if !self.context.config.continuous {
                return Ok(Step::Finish);
            }
        } else if self.context.config.interim_results
            && self.since_interim >= self.tuning().interim_samples()
        {
            self.emit_interim()?;
        }

        Ok(Step::Continue)
    }

    fn transcribe_current(&self) -> Result<String, RecognitionErrorKind> {
        let text = self
            .context
            .transcriber
            .transcribe(&self.current, self.context.language.as_deref())
            .map_err(|e| RecognitionErrorKind::Engine(e.to_string()))?;

        // Entries are joined without a separator downstream.
        if !text.is_empty() && !self.finalized.is_empty() {
            Ok(format!(" {text}"))
        } else {
            Ok(text)
        }
    }

    fn emit_interim(&mut self) -> Result<(), RecognitionErrorKind> {
        self.since_interim = 0;
        let text = self.transcribe_current()?;
        let mut results = self.finalized.clone();
        results.push(RecognitionResult::new(text, false));
        if !self.context.emit(RecognitionEvent::Result(results)) {
            return Err(RecognitionErrorKind::Aborted);
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), RecognitionErrorKind> {
        let text = self.transcribe_current()?;
        log::debug!("speech: utterance finalised ({} samples)", self.current.len());

        if !text.is_empty() {
            self.finalized.push(RecognitionResult::new(text, true));
            if !self
                .context
                .emit(RecognitionEvent::Result(self.finalized.clone()))
            {
                return Err(RecognitionErrorKind::Aborted);
            }
        }

        self.current.clear();
        self.heard_voice = false;
        self.trailing_silence = 0;
        self.leading_silence = 0;
        self.since_interim = 0;
        Ok(())
    }

    /// Wrap up after `stop()` or a closed audio channel.
    fn finish(&mut self) -> Result<(), RecognitionErrorKind> {
        if self.heard_voice {
            self.finalize()?;
        }
        if self.finalized.is_empty() {
            return Err(RecognitionErrorKind::NoSpeech);
        }
        Ok(())
    }
}

/// Drive one recognition session over `audio` until it ends, `stop` is set,
/// or the audio channel closes.  Always emits `Started` first and `Ended`
/// last.
fn run_session(context: &SessionContext, audio: &mpsc::Receiver<AudioChunk>, stop: &AtomicBool) {
    if !context.emit(RecognitionEvent::Started) {
        return;
    }
    log::debug!("speech: session started");

    let mut state = UtteranceState::new(context);

    let outcome = loop {
        if stop.load(Ordering::SeqCst) {
            log::debug!("speech: stop requested");
            break state.finish();
        }

        match audio.recv_timeout(POLL_INTERVAL) {
            Ok(chunk) => match state.push(chunk.into_mono_16k()) {
                Ok(Step::Continue) => {}
                Ok(Step::Finish) => break Ok(()),
                Err(kind) => break Err(kind),
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                log::debug!("speech: audio source closed");
                break state.finish();
            }
        }
    };

    if let Err(kind) = outcome {
        log::debug!("speech: session failed: {kind}");
        context.emit(RecognitionEvent::Error(kind));
    }
    context.emit(RecognitionEvent::Ended);
    log::debug!("speech: session ended");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
