//! Waveform transforms
//!
//! Pure functions from one waveform to a new one. Randomized transforms take
//! the random source as an argument so callers can seed them.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::dsp::resample::resample_by_ratio;
use crate::dsp::vocoder::time_stretch;
use crate::engine::Waveform;
use crate::error::{AugmentError, Result};

/// Semitones per octave
const SEMITONES_PER_OCTAVE: f64 = 12.0;

/// Change duration by `1 / rate` while keeping pitch
///
/// `rate > 1` is faster and shorter, `rate < 1` slower and longer.
pub fn stretch(audio: &Waveform, rate: f64) -> Result<Waveform> {
    let samples = time_stretch(audio.samples(), rate)?;
    Ok(audio.with_samples(samples))
}

/// Shift pitch by `semitones` keeping duration and sample rate
///
/// Stretches by `2^(-n/12)` and resamples by the same factor, so the
/// result has the input's length.
pub fn shift_pitch(audio: &Waveform, semitones: i32) -> Result<Waveform> {
    if semitones == 0 || audio.is_empty() {
        return Ok(audio.clone());
    }

    let rate = 2.0_f64.powf(-(semitones as f64) / SEMITONES_PER_OCTAVE);
    let stretched = time_stretch(audio.samples(), rate)?;
    let mut shifted = resample_by_ratio(&stretched, rate)?;
    shifted.resize(audio.len(), 0.0);
    Ok(audio.with_samples(shifted))
}

/// Add white Gaussian noise with absolute standard deviation `sigma`
pub fn add_noise<R: Rng + ?Sized>(audio: &Waveform, sigma: f32, rng: &mut R) -> Result<Waveform> {
    if !sigma.is_finite() {
        return Err(AugmentError::InvalidParameter {
            reason: format!("noise sigma must be finite, got {}", sigma),
        });
    }

    let samples = audio
        .samples()
        .iter()
        .map(|&s| {
            let n: f32 = rng.sample(StandardNormal);
            s + sigma * n
        })
        .collect();
    Ok(audio.with_samples(samples))
}

/// Circularly rotate samples by `offset` (positive moves audio later)
///
/// Samples pushed off one end wrap to the other; nothing is lost.
pub fn roll(audio: &Waveform, offset: i64) -> Waveform {
    let mut samples = audio.samples().to_vec();
    if samples.is_empty() {
        return audio.with_samples(samples);
    }

    let len = samples.len() as i64;
    let shift = offset.rem_euclid(len) as usize;
    samples.rotate_right(shift);
    audio.with_samples(samples)
}

/// Draw a random offset within `max_fraction` of the length and roll
pub fn shift_time<R: Rng + ?Sized>(
    audio: &Waveform,
    max_fraction: f64,
    rng: &mut R,
) -> Result<Waveform> {
    let offset = draw_time_offset(audio.len(), max_fraction, rng)?;
    Ok(roll(audio, offset))
}

/// Offset in samples drawn uniformly from `[-max_fraction, max_fraction] * len`
///
/// Truncated toward zero.
pub fn draw_time_offset<R: Rng + ?Sized>(
    len: usize,
    max_fraction: f64,
    rng: &mut R,
) -> Result<i64> {
    if !max_fraction.is_finite() || max_fraction < 0.0 {
        return Err(AugmentError::InvalidParameter {
            reason: format!("shift fraction must be non-negative, got {}", max_fraction),
        });
    }
    if max_fraction == 0.0 {
        return Ok(0);
    }

    let fraction = rng.gen_range(-max_fraction..=max_fraction);
    Ok((fraction * len as f64).trunc() as i64)
}

/// Multiply every sample by `factor`
pub fn scale_volume(audio: &Waveform, factor: f32) -> Waveform {
    audio.map(|s| s * factor)
}

/// Stretch by a rate drawn uniformly from `[min_rate, max_rate]`
pub fn random_speed_change<R: Rng + ?Sized>(
    audio: &Waveform,
    range: (f64, f64),
    rng: &mut R,
) -> Result<Waveform> {
    let (min_rate, max_rate) = range;
    if !(min_rate > 0.0 && min_rate <= max_rate && max_rate.is_finite()) {
        return Err(AugmentError::InvalidParameter {
            reason: format!("invalid speed range [{}, {}]", min_rate, max_rate),
        });
    }

    let rate = rng.gen_range(min_rate..=max_rate);
    stretch(audio, rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_case::test_case;

    fn tone() -> Waveform {
        Waveform::sine(330.0, 0.5, 0.5, 22050)
    }

    #[test]
    fn test_stretch_unit_rate_is_identity() {
        let wave = tone();
        let out = stretch(&wave, 1.0).unwrap();
        assert_eq!(out.len(), wave.len());
        for (a, b) in wave.samples().iter().zip(out.samples()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test_case(2 ; "two up")]
    #[test_case(-2 ; "two down")]
    #[test_case(1 ; "one up")]
    fn test_shift_pitch_keeps_length_and_rate(semitones: i32) {
        let wave = tone();
        let out = shift_pitch(&wave, semitones).unwrap();
        assert_eq!(out.len(), wave.len());
        assert_eq!(out.sample_rate(), wave.sample_rate());
        assert!(out.is_finite());
    }

    #[test]
    fn test_shift_pitch_moves_zero_crossings() {
        // An octave up doubles the zero-crossing rate
        let wave = Waveform::sine(200.0, 1.0, 0.5, 22050);
        let out = shift_pitch(&wave, 12).unwrap();

        let crossings = |w: &Waveform| {
            w.samples()
                .windows(2)
                .filter(|p| (p[0] < 0.0) != (p[1] < 0.0))
                .count() as f64
        };
        let ratio = crossings(&out) / crossings(&wave);
        assert!((ratio - 2.0).abs() < 0.2, "crossing ratio {}", ratio);
    }

    #[test]
    fn test_zero_sigma_noise_is_noop() {
        let wave = tone();
        let mut rng = StdRng::seed_from_u64(7);
        let out = add_noise(&wave, 0.0, &mut rng).unwrap();
        assert_eq!(out, wave);
    }

    #[test]
    fn test_noise_has_requested_sigma() {
        let wave = Waveform::silence(50_000, 22050);
        let mut rng = StdRng::seed_from_u64(11);
        let out = add_noise(&wave, 0.005, &mut rng).unwrap();

        let var: f64 = out.samples().iter().map(|&s| (s as f64).powi(2)).sum::<f64>()
            / out.len() as f64;
        assert_relative_eq!(var.sqrt(), 0.005, max_relative = 0.05);
    }

    #[test]
    fn test_noise_differs_between_calls() {
        let wave = tone();
        let mut rng = StdRng::seed_from_u64(3);
        let a = add_noise(&wave, 0.002, &mut rng).unwrap();
        let b = add_noise(&wave, 0.002, &mut rng).unwrap();
        assert_ne!(a, b);
    }

    #[test_case(0 ; "zero")]
    #[test_case(3 ; "positive")]
    #[test_case(-5 ; "negative")]
    #[test_case(1234 ; "wider than buffer")]
    fn test_roll_is_invertible(offset: i64) {
        let wave = Waveform::new((0..97).map(|i| i as f32).collect(), 8000);
        let back = roll(&roll(&wave, offset), -offset);
        assert_eq!(back, wave);
    }

    #[test]
    fn test_roll_direction_and_wrap() {
        let wave = Waveform::new(vec![1.0, 2.0, 3.0, 4.0], 8000);
        assert_eq!(roll(&wave, 1).samples(), &[4.0, 1.0, 2.0, 3.0]);
        assert_eq!(roll(&wave, -1).samples(), &[2.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn test_shift_time_offset_is_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let offset = draw_time_offset(1000, 0.15, &mut rng).unwrap();
            assert!(offset.abs() <= 150);
        }
    }

    #[test]
    fn test_shift_time_is_seeded_roll() {
        let wave = Waveform::new((0..200).map(|i| i as f32).collect(), 8000);
        let mut rng_a = StdRng::seed_from_u64(5);
        let mut rng_b = StdRng::seed_from_u64(5);

        let shifted = shift_time(&wave, 0.2, &mut rng_a).unwrap();
        let offset = draw_time_offset(wave.len(), 0.2, &mut rng_b).unwrap();
        assert_eq!(shifted, roll(&wave, offset));
    }

    #[test]
    fn test_scale_volume_inverse() {
        let wave = tone();
        for factor in [1.2_f32, 0.8, -0.5, 3.0] {
            let back = scale_volume(&scale_volume(&wave, factor), 1.0 / factor);
            for (a, b) in wave.samples().iter().zip(back.samples()) {
                assert!((a - b).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_scale_volume_zero_and_negative() {
        let wave = Waveform::new(vec![0.5, -0.25], 8000);
        assert_eq!(scale_volume(&wave, 0.0).samples(), &[0.0, -0.0]);
        assert_eq!(scale_volume(&wave, -1.0).samples(), &[-0.5, 0.25]);
    }

    #[test]
    fn test_random_speed_change_length_in_range() {
        let wave = tone();
        let mut rng = StdRng::seed_from_u64(9);
        let out = random_speed_change(&wave, (0.9, 1.1), &mut rng).unwrap();
        let min_len = (wave.len() as f64 / 1.1).round() as usize;
        let max_len = (wave.len() as f64 / 0.9).round() as usize;
        assert!(out.len() >= min_len && out.len() <= max_len);
    }

    #[test]
    fn test_random_speed_change_rejects_bad_range() {
        let wave = tone();
        let mut rng = StdRng::seed_from_u64(9);
        assert!(random_speed_change(&wave, (1.1, 0.9), &mut rng).is_err());
        assert!(random_speed_change(&wave, (0.0, 1.0), &mut rng).is_err());
    }
}
