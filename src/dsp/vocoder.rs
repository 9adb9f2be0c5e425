//! Phase vocoder time stretching
//!
//! STFT analysis with a Hann window, magnitude interpolation between
//! neighbouring frames with accumulated phase, then weighted overlap-add
//! resynthesis. A rate of 1.0 reconstructs the input up to FFT rounding.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::{AugmentError, Result};

/// FFT frame size
const N_FFT: usize = 2048;

/// Hop between analysis frames (75% overlap)
const HOP_LENGTH: usize = N_FFT / 4;

/// Window-sum floor below which overlap-add output is left unnormalized
const WINDOW_SUM_FLOOR: f32 = 1e-8;

/// Stretch `samples` so that duration scales by `1 / rate`
///
/// Output length is `round(len / rate)`.
pub fn time_stretch(samples: &[f32], rate: f64) -> Result<Vec<f32>> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(AugmentError::InvalidParameter {
            reason: format!("stretch rate must be positive and finite, got {}", rate),
        });
    }
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let target_len = (samples.len() as f64 / rate).round() as usize;
    let vocoder = PhaseVocoder::new();
    let spectrum = vocoder.analyze(samples);
    let stretched = vocoder.stretch_frames(&spectrum, rate);
    Ok(vocoder.synthesize(&stretched, target_len))
}

/// Wrap a phase into [-PI, PI]
#[inline]
fn principal_angle(phase: f32) -> f32 {
    phase - 2.0 * PI * (phase / (2.0 * PI)).round()
}

struct PhaseVocoder {
    window: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl PhaseVocoder {
    fn new() -> Self {
        let mut planner = FftPlanner::new();
        // Periodic Hann window
        let window = (0..N_FFT)
            .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / N_FFT as f32).cos())
            .collect();
        Self {
            window,
            forward: planner.plan_fft_forward(N_FFT),
            inverse: planner.plan_fft_inverse(N_FFT),
        }
    }

    fn num_bins() -> usize {
        N_FFT / 2 + 1
    }

    /// Centered STFT; each frame keeps the non-negative frequency bins
    fn analyze(&self, samples: &[f32]) -> Vec<Vec<Complex<f32>>> {
        let pad = N_FFT / 2;
        let padded_len = (samples.len() + 2 * pad).max(N_FFT);
        let mut padded = vec![0.0_f32; padded_len];
        padded[pad..pad + samples.len()].copy_from_slice(samples);

        let num_frames = 1 + (padded_len - N_FFT) / HOP_LENGTH;
        let mut frames = Vec::with_capacity(num_frames);
        let mut buffer = vec![Complex::new(0.0, 0.0); N_FFT];

        for frame in 0..num_frames {
            let start = frame * HOP_LENGTH;
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex::new(padded[start + i] * self.window[i], 0.0);
            }
            self.forward.process(&mut buffer);
            frames.push(buffer[..Self::num_bins()].to_vec());
        }

        frames
    }

    /// Resample the frame sequence at steps of `rate`, carrying phase forward
    fn stretch_frames(
        &self,
        frames: &[Vec<Complex<f32>>],
        rate: f64,
    ) -> Vec<Vec<Complex<f32>>> {
        let bins = Self::num_bins();
        let zero_frame = vec![Complex::new(0.0, 0.0); bins];
        let frame_at = |idx: usize| frames.get(idx).unwrap_or(&zero_frame);

        let expected_advance: Vec<f32> = (0..bins)
            .map(|k| 2.0 * PI * k as f32 * HOP_LENGTH as f32 / N_FFT as f32)
            .collect();
        let mut phase: Vec<f32> = frames[0].iter().map(|c| c.arg()).collect();

        let num_steps = (frames.len() as f64 / rate).ceil() as usize;
        let mut output = Vec::with_capacity(num_steps);

        for step in 0..num_steps {
            let t = step as f64 * rate;
            if t >= frames.len() as f64 {
                break;
            }
            let idx = t.floor() as usize;
            let alpha = (t - idx as f64) as f32;
            let left = frame_at(idx);
            let right = frame_at(idx + 1);

            let mut frame = Vec::with_capacity(bins);
            for k in 0..bins {
                let magnitude = (1.0 - alpha) * left[k].norm() + alpha * right[k].norm();
                frame.push(Complex::from_polar(magnitude, phase[k]));

                let delta = right[k].arg() - left[k].arg() - expected_advance[k];
                phase[k] = principal_angle(phase[k] + expected_advance[k] + principal_angle(delta));
            }
            output.push(frame);
        }

        output
    }

    /// Inverse STFT by weighted overlap-add, trimmed to `target_len`
    fn synthesize(&self, frames: &[Vec<Complex<f32>>], target_len: usize) -> Vec<f32> {
        let pad = N_FFT / 2;
        let total_len = N_FFT + HOP_LENGTH * frames.len().saturating_sub(1);
        let mut output = vec![0.0_f32; total_len];
        let mut window_sum = vec![0.0_f32; total_len];
        let mut buffer = vec![Complex::new(0.0, 0.0); N_FFT];
        let bins = Self::num_bins();

        for (frame_idx, frame) in frames.iter().enumerate() {
            // Rebuild the full Hermitian spectrum
            buffer[..bins].copy_from_slice(frame);
            buffer[0].im = 0.0;
            buffer[bins - 1].im = 0.0;
            for k in bins..N_FFT {
                buffer[k] = frame[N_FFT - k].conj();
            }
            self.inverse.process(&mut buffer);

            let start = frame_idx * HOP_LENGTH;
            for i in 0..N_FFT {
                let w = self.window[i];
                output[start + i] += buffer[i].re / N_FFT as f32 * w;
                window_sum[start + i] += w * w;
            }
        }

        for (sample, &wsum) in output.iter_mut().zip(window_sum.iter()) {
            if wsum > WINDOW_SUM_FLOOR {
                *sample /= wsum;
            }
        }

        let mut trimmed: Vec<f32> = output.into_iter().skip(pad).take(target_len).collect();
        trimmed.resize(target_len, 0.0);
        trimmed
    }
}
