//! Microphone capture via `cpal`.
//!
//! [`AudioCapture`] wraps the cpal host/device/stream lifecycle.  Call
//! [`AudioCapture::start`] to begin streaming [`AudioChunk`]s over an mpsc
//! channel.  The returned [`StreamHandle`] is a RAII guard; dropping it
//! stops the underlying cpal stream, which releases the microphone.
//!
//! `cpal::Stream` is not `Send` on every platform, so the capture is opened
//! and dropped on the thread that consumes the chunks.

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use thiserror::Error;

use super::resample::{resample_to_16k, stereo_to_mono};

// ---------------------------------------------------------------------------
// AudioChunk
// ---------------------------------------------------------------------------

/// A single buffer of raw audio as delivered by the cpal callback.
///
/// Samples are interleaved `f32` in the range `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Interleaved PCM samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Sample rate of this chunk in Hz (e.g. 44100, 48000, 16000).
    pub sample_rate: u32,
    /// Number of interleaved channels (1 = mono, 2 = stereo, …).
    pub channels: u16,
}

impl AudioChunk {
    /// Downmix and resample into the 16 kHz mono layout Whisper expects.
    pub fn into_mono_16k(self) -> Vec<f32> {
        let mono = if self.channels > 1 {
            stereo_to_mono(&self.samples, self.channels)
        } else {
            self.samples
        };
        resample_to_16k(&mono, self.sample_rate)
    }
}

// ---------------------------------------------------------------------------
// StreamHandle
// ---------------------------------------------------------------------------

/// Keeps the cpal stream alive; dropping it stops capture.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors that can occur while setting up or running the audio capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("input device delivers {0:?} samples; expected f32, i16 or u16")]
    UnsupportedFormat(SampleFormat),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

// ---------------------------------------------------------------------------
// Sample conversion
// ---------------------------------------------------------------------------

/// Sample formats the capture stream can convert to `f32`.
pub fn is_supported_format(format: SampleFormat) -> bool {
    matches!(format, SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16)
}

/// Convert a device buffer of any supported sample type to `f32` in
/// `[-1.0, 1.0]`.
pub fn samples_to_f32<T>(data: &[T]) -> Vec<f32>
where
    T: Copy,
    f32: FromSample<T>,
{
    data.iter().map(|&s| f32::from_sample_(s)).collect()
}

// ---------------------------------------------------------------------------
// AudioCapture
// ---------------------------------------------------------------------------

/// Default-microphone capture built on top of `cpal`.
pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: SampleFormat,
    sample_rate: u32,
    channels: u16,
}

impl AudioCapture {
    /// Capability probe: does the default input device exist and deliver a
    /// sample format the stream can convert?
    pub fn input_available() -> bool {
        let Some(device) = cpal::default_host().default_input_device() else {
            return false;
        };
        match device.default_input_config() {
            Ok(supported) if is_supported_format(supported.sample_format()) => true,
            Ok(supported) => {
                log::info!("audio: input format {:?} not supported", supported.sample_format());
                false
            }
            Err(e) => {
                log::info!("audio: cannot query input config: {e}");
                false
            }
        }
    }

    /// Open the system default input device with its preferred configuration.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NoDevice`] when no input device is available,
    /// [`CaptureError::DefaultConfig`] when the device cannot report a
    /// configuration, and [`CaptureError::UnsupportedFormat`] for devices
    /// that deliver neither `f32`, `i16` nor `u16` samples.
    pub fn new() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        if !is_supported_format(sample_format) {
            return Err(CaptureError::UnsupportedFormat(sample_format));
        }

        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            sample_format,
            sample_rate,
            channels,
        })
    }

    /// Start recording and send [`AudioChunk`]s to `tx`.
    ///
    /// Integer formats are converted to `f32` in the callback.
    pub fn start(&self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError> {
        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(tx)?,
            SampleFormat::I16 => self.build_stream::<i16>(tx)?,
            SampleFormat::U16 => self.build_stream::<u16>(tx)?,
            other => return Err(CaptureError::UnsupportedFormat(other)),
        };

        stream.play()?;
        log::debug!(
            "audio: capture started ({} Hz, {} ch, {:?})",
            self.sample_rate,
            self.channels,
            self.sample_format
        );
        Ok(StreamHandle { _stream: stream })
    }

    /// Send errors (receiver dropped) are ignored so the audio thread never
    /// panics.
    fn build_stream<T>(&self, tx: mpsc::Sender<AudioChunk>) -> Result<cpal::Stream, CaptureError>
    where
        T: SizedSample + Send + 'static,
        f32: FromSample<T>,
    {
        let sample_rate = self.sample_rate;
        let channels = self.channels;

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let _ = tx.send(AudioChunk {
                    samples: samples_to_f32(data),
                    sample_rate,
                    channels,
                });
            },
            |err: cpal::StreamError| {
                log::error!("audio: cpal stream error: {err}");
            },
            None,
        )?;
        Ok(stream)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_chunk_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AudioChunk>();
    }

    #[test]
    fn stereo_48k_chunk_becomes_mono_16k() {
        let chunk = AudioChunk {
            samples: vec![0.25_f32; 960], // 480 stereo frames @ 48 kHz = 10 ms
            sample_rate: 48_000,
            channels: 2,
        };
        let out = chunk.into_mono_16k();
        assert_eq!(out.len(), 160);
        assert!(out.iter().all(|s| (s - 0.25).abs() < 1e-5));
    }

    #[test]
    fn integer_formats_convert_to_unit_range() {
        assert_eq!(samples_to_f32(&[i16::MIN, 0_i16]), vec![-1.0, 0.0]);
        assert_eq!(samples_to_f32(&[0_u16, 32_768_u16]), vec![-1.0, 0.0]);

        let half = samples_to_f32(&[16_384_i16]);
        assert!((half[0] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn f32_samples_pass_through() {
        assert_eq!(samples_to_f32(&[0.25_f32, -0.5]), vec![0.25, -0.5]);
    }

    #[test]
    fn only_convertible_formats_are_supported() {
        assert!(is_supported_format(SampleFormat::F32));
        assert!(is_supported_format(SampleFormat::I16));
        assert!(is_supported_format(SampleFormat::U16));
        assert!(!is_supported_format(SampleFormat::I8));
        assert!(!is_supported_format(SampleFormat::F64));
    }

    #[test]
    fn mono_16k_chunk_passes_through() {
        let chunk = AudioChunk {
            samples: vec![0.1_f32; 320],
            sample_rate: 16_000,
            channels: 1,
        };
        assert_eq!(chunk.into_mono_16k().len(), 320);
    }
}
