//! Microphone input for the local speech engine.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → stereo_to_mono
//!           → resample_to_16k → utterance buffer → VadDetector
//! ```
//!
//! Everything downstream of the cpal callback runs on the recognition
//! worker thread (see [`crate::speech::local`]).

pub mod capture;
pub mod resample;
pub mod vad;

pub use capture::{
    is_supported_format, samples_to_f32, AudioCapture, AudioChunk, CaptureError, StreamHandle,
};
pub use resample::{resample_to_16k, stereo_to_mono, TARGET_SAMPLE_RATE};
pub use vad::VadDetector;
