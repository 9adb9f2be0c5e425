//! Waveform value type
//!
//! A mono sequence of f32 samples tagged with its sample rate. Transforms
//! never mutate a waveform they are handed; they build a new one.

/// Default sample rate used when loading sources (22.05kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Waveform
// ============================================================================

/// Mono audio samples with an associated sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Create a waveform from raw samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a waveform of `len` zero samples
    pub fn silence(len: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Generate a sine tone
    ///
    /// Useful for fixtures and for checking transforms by ear.
    pub fn sine(frequency: f32, duration_secs: f32, amplitude: f32, sample_rate: u32) -> Self {
        let num_samples = (duration_secs * sample_rate as f32) as usize;
        let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;
        let samples = (0..num_samples)
            .map(|i| amplitude * (angular_freq * i as f32).sin())
            .collect();
        Self::new(samples, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Build a new waveform at the same sample rate
    pub fn with_samples(&self, samples: Vec<f32>) -> Self {
        Self::new(samples, self.sample_rate)
    }

    /// Build a new waveform by mapping every sample
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        self.with_samples(self.samples.iter().map(|&s| f(s)).collect())
    }

    /// Consume the waveform and return its samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// True if every sample is finite (no NaN/Inf)
    pub fn is_finite(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }

    /// RMS level in dB. Returns -f32::INFINITY for empty or silent audio.
    pub fn rms_db(&self) -> f32 {
        if self.samples.is_empty() {
            return f32::NEG_INFINITY;
        }
        let sum_squares: f64 = self.samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        let rms = (sum_squares / self.samples.len() as f64).sqrt() as f32;
        linear_to_db(rms)
    }

    /// Peak absolute sample value
    pub fn peak(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
    }
}
