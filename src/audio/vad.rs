//! Energy-based voice activity detection.
//!
//! Audio is split into 30 ms frames (480 samples @ 16 kHz).  A frame counts
//! as voice when its RMS amplitude exceeds the threshold.  The recognition
//! worker uses this to tell whether anything was said at all and to end an
//! utterance after a stretch of trailing silence.

/// 30 ms at 16 kHz.
const DEFAULT_FRAME_SIZE: usize = 480;

/// RMS threshold detector over fixed-size frames.
#[derive(Debug, Clone)]
pub struct VadDetector {
    rms_threshold: f32,
    frame_size: usize,
}

impl VadDetector {
    /// Detector with 30 ms frames.  `0.01` suits a quiet room; noisy
    /// environments want `0.02`–`0.05`.
    pub fn new(rms_threshold: f32) -> Self {
        Self {
            rms_threshold,
            frame_size: DEFAULT_FRAME_SIZE,
        }
    }

    /// Detector with a custom frame size.
    ///
    /// # Panics
    ///
    /// Panics when `frame_size` is zero.
    pub fn with_frame_size(rms_threshold: f32, frame_size: usize) -> Self {
        assert!(frame_size > 0, "frame_size must be > 0");
        Self {
            rms_threshold,
            frame_size,
        }
    }

    /// `true` when the RMS of `frame` exceeds the threshold.
    pub fn is_voice(&self, frame: &[f32]) -> bool {
        if frame.is_empty() {
            return false;
        }
        let mean_sq = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
        mean_sq.sqrt() > self.rms_threshold
    }

    /// `true` when any frame of `audio` is voice.
    pub fn contains_voice(&self, audio: &[f32]) -> bool {
        audio.chunks(self.frame_size).any(|f| self.is_voice(f))
    }

    /// Number of samples after the last voice frame.
    ///
    /// Equals `audio.len()` when there is no voice at all.
    ///
    /// ```
    /// use voice_panel::audio::VadDetector;
    ///
    /// let vad = VadDetector::new(0.01);
    /// let mut audio = vec![0.5_f32; 480];
    /// audio.extend(vec![0.0_f32; 960]);
    /// assert_eq!(vad.trailing_silence_samples(&audio), 960);
    /// ```
    pub fn trailing_silence_samples(&self, audio: &[f32]) -> usize {
        let frames = audio.len().div_ceil(self.frame_size);
        match (0..frames).rfind(|&i| {
            let start = i * self.frame_size;
            let end = (start + self.frame_size).min(audio.len());
            self.is_voice(&audio[start..end])
        }) {
            Some(last) => audio.len() - ((last + 1) * self.frame_size).min(audio.len()),
            None => audio.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(silent_pre: usize, voice: usize, silent_post: usize) -> Vec<f32> {
        let mut v = vec![0.0_f32; silent_pre];
        v.extend(vec![0.5_f32; voice]);
        v.extend(vec![0.0_f32; silent_post]);
        v
    }

    #[test]
    fn silence_has_no_voice() {
        let vad = VadDetector::new(0.01);
        assert!(!vad.contains_voice(&vec![0.0_f32; 1440]));
        assert!(!vad.contains_voice(&[]));
    }

    #[test]
    fn loud_middle_is_voice() {
        let vad = VadDetector::new(0.01);
        assert!(vad.contains_voice(&signal(480, 480, 480)));
    }

    #[test]
    fn trailing_silence_counts_samples_after_last_voice_frame() {
        let vad = VadDetector::new(0.01);
        assert_eq!(vad.trailing_silence_samples(&signal(480, 480, 960)), 960);
        assert_eq!(vad.trailing_silence_samples(&signal(0, 960, 0)), 0);
    }

    #[test]
    fn trailing_silence_of_pure_silence_is_everything() {
        let vad = VadDetector::new(0.01);
        assert_eq!(vad.trailing_silence_samples(&vec![0.0_f32; 700]), 700);
        assert_eq!(vad.trailing_silence_samples(&[]), 0);
    }

    #[test]
    fn partial_last_frame_is_handled() {
        let vad = VadDetector::with_frame_size(0.01, 160);
        // voice ends mid-way through a partial final frame
        let audio = signal(160, 100, 0);
        assert_eq!(vad.trailing_silence_samples(&audio), 0);
    }

    #[test]
    #[should_panic(expected = "frame_size must be > 0")]
    fn zero_frame_size_panics() {
        VadDetector::with_frame_size(0.01, 0);
    }
}
