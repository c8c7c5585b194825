//! Channel mixing and sample-rate conversion to Whisper's input layout.

/// Sample rate the speech engine consumes.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Average interleaved channels down to one.
///
/// The output length is `samples.len() / channels`; a trailing partial frame
/// is dropped.  `channels == 0` yields an empty vector.
///
/// ```
/// use voice_panel::audio::stereo_to_mono;
///
/// let mono = stereo_to_mono(&[1.0, 0.0, 0.5, 0.5], 2);
/// assert_eq!(mono, vec![0.5, 0.5]);
/// ```
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Linear-interpolation resample from `source_rate` to
/// [`TARGET_SAMPLE_RATE`].
///
/// Output length is `ceil(len * 16_000 / source_rate)`.  Input already at
/// 16 kHz is copied unchanged.  A `source_rate` of zero yields an empty
/// vector.
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == TARGET_SAMPLE_RATE {
        return samples.to_vec();
    }
    if samples.is_empty() || source_rate == 0 {
        return Vec::new();
    }

    let ratio = TARGET_SAMPLE_RATE as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos as usize;
            let frac = (src_pos - idx as f64) as f32;
            match (samples.get(idx), samples.get(idx + 1)) {
                (Some(a), Some(b)) => a * (1.0 - frac) + b * frac,
                (Some(a), None) => *a,
                _ => 0.0,
            }
        })
        .collect()
}
