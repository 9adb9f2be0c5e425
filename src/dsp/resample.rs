//! Sample rate conversion
//!
//! Wraps rubato's polynomial resampler for whole-buffer conversion. The
//! resampler's output delay is trimmed so the result lines up with the input.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::error::{AugmentError, Result};

/// Input frames fed to the resampler per call
const CHUNK_SIZE: usize = 1024;

/// Half the width of rubato's polynomial interpolation window, in input frames
const HALF_WINDOW: f64 = 4.0;

/// Resample `samples` by `ratio` (output rate / input rate)
///
/// Output length is `ceil(len * ratio)`.
pub fn resample_by_ratio(samples: &[f32], ratio: f64) -> Result<Vec<f32>> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(AugmentError::InvalidParameter {
            reason: format!("resample ratio must be positive, got {}", ratio),
        });
    }
    let expected_len = (samples.len() as f64 * ratio).ceil() as usize;
    resample_to_len(samples, ratio, expected_len)
}

/// Resample from one integer rate to another
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if source_rate == 0 || target_rate == 0 {
        return Err(AugmentError::InvalidParameter {
            reason: format!(
                "sample rates must be non-zero ({} -> {})",
                source_rate, target_rate
            ),
        });
    }
    if source_rate == target_rate {
        return Ok(samples.to_vec());
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let expected_len = (samples.len() as u64 * target_rate as u64).div_ceil(source_rate as u64);
    resample_to_len(samples, ratio, expected_len as usize)
}

fn resample_to_len(samples: &[f32], ratio: f64, expected_len: usize) -> Result<Vec<f32>> {
    if samples.is_empty() {
        return Ok(Vec::new());
    }
    if (ratio - 1.0).abs() < f64::EPSILON {
        return Ok(samples.to_vec());
    }

    let mut resampler =
        FastFixedIn::<f32>::new(ratio, 1.0, PolynomialDegree::Cubic, CHUNK_SIZE, 1).map_err(
            |e| AugmentError::Resample {
                reason: format!("failed to create resampler: {}", e),
            },
        )?;

    let delay = output_delay(ratio);
    let mut output = Vec::with_capacity(expected_len + delay);

    let mut pos = 0;
    while pos < samples.len() {
        let needed = resampler.input_frames_next();
        let end = (pos + needed).min(samples.len());
        let chunk: [&[f32]; 1] = [&samples[pos..end]];

        let frames = if end - pos == needed {
            resampler.process(&chunk[..], None)
        } else {
            resampler.process_partial(Some(&chunk[..]), None)
        }
        .map_err(|e| AugmentError::Resample {
            reason: e.to_string(),
        })?;

        output.extend_from_slice(&frames[0]);
        pos = end;
    }

    // Flush the tail still held inside the resampler
    while output.len() < expected_len + delay {
        let frames = resampler
            .process_partial::<Vec<f32>>(None, None)
            .map_err(|e| AugmentError::Resample {
                reason: e.to_string(),
            })?;
        if frames[0].is_empty() {
            break;
        }
        output.extend_from_slice(&frames[0]);
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected_len, 0.0);
    Ok(output)
}

/// Output frames to drop so the result lines up with the input
///
/// The first output frame sits at input position `1 / ratio - HALF_WINDOW`,
/// so the lag is `HALF_WINDOW * ratio - 1` output frames. The resampler's own
/// `output_delay()` floors `HALF_WINDOW * ratio` and overshoots by one.
fn output_delay(ratio: f64) -> usize {
    (HALF_WINDOW * ratio - 1.0).round().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Waveform;

    #[test]
    fn test_resample_length() {
        let wave = Waveform::sine(440.0, 1.0, 0.5, 44100);
        let out = resample(wave.samples(), 44100, 22050).unwrap();
        assert_eq!(out.len(), 22050);

        let up = resample(wave.samples(), 44100, 48000).unwrap();
        assert_eq!(up.len(), 48000);
    }

    #[test]
    fn test_resample_preserves_level() {
        let wave = Waveform::sine(440.0, 1.0, 0.5, 44100);
        let out = resample(wave.samples(), 44100, 22050).unwrap();
        let resampled = Waveform::new(out, 22050);
        assert!((resampled.rms_db() - wave.rms_db()).abs() < 0.5);
    }

    fn max_interior_error(actual: &[f32], expected: &[f32], margin: usize) -> f32 {
        let len = actual.len().min(expected.len());
        actual[margin..len - margin]
            .iter()
            .zip(&expected[margin..len - margin])
            .map(|(a, b)| (a - b).abs())
            .fold(0.0_f32, f32::max)
    }

    #[test]
    fn test_downsample_is_time_aligned() {
        let source = Waveform::sine(200.0, 0.5, 0.5, 44100);
        let expected = Waveform::sine(200.0, 0.5, 0.5, 22050);
        let out = resample(source.samples(), 44100, 22050).unwrap();

        let err = max_interior_error(&out, expected.samples(), 32);
        assert!(err < 1e-3, "max error against analytic tone {}", err);
    }

    #[test]
    fn test_upsample_is_time_aligned() {
        let source = Waveform::sine(200.0, 0.5, 0.5, 22050);
        let expected = Waveform::sine(200.0, 0.5, 0.5, 44100);
        let out = resample(source.samples(), 22050, 44100).unwrap();

        let err = max_interior_error(&out, expected.samples(), 32);
        assert!(err < 5e-3, "max error against analytic tone {}", err);
    }

    #[test]
    fn test_output_delay_rounding() {
        assert_eq!(output_delay(0.5), 1);
        assert_eq!(output_delay(2.0), 7);
        assert_eq!(output_delay(0.1), 0);
    }

    #[test]
    fn test_same_rate_is_copy() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 16000, 16000).unwrap(), samples);
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        assert!(resample_by_ratio(&[0.0; 8], 0.0).is_err());
        assert!(resample_by_ratio(&[0.0; 8], f64::NAN).is_err());
        assert!(resample(&[0.0; 8], 0, 16000).is_err());
    }

    #[test]
    fn test_empty_input() {
        assert!(resample_by_ratio(&[], 2.0).unwrap().is_empty());
    }
}
