//! Augmentation Catalog
//!
//! Named transform configurations. The standard catalog has eleven entries;
//! each name becomes part of an output file name.

use std::collections::HashSet;

use rand::RngCore;
use serde::Serialize;

use crate::dsp;
use crate::engine::Waveform;
use crate::error::{AugmentError, Result};

/// Transform configuration bound to a catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformKind {
    Stretch { rate: f64 },
    PitchShift { semitones: i32 },
    Noise { sigma: f32 },
    TimeShift { max_fraction: f64 },
    Volume { factor: f32 },
    SpeedRange { min_rate: f64, max_rate: f64 },
    /// Stretch, then add noise to the stretched signal
    StretchNoise { rate: f64, sigma: f32 },
    /// Pitch shift, then scale the shifted signal
    PitchVolume { semitones: i32, factor: f32 },
}

impl TransformKind {
    /// Apply the configured transform to `audio`
    pub fn apply(&self, audio: &Waveform, rng: &mut dyn RngCore) -> Result<Waveform> {
        match *self {
            TransformKind::Stretch { rate } => dsp::stretch(audio, rate),
            TransformKind::PitchShift { semitones } => dsp::shift_pitch(audio, semitones),
            TransformKind::Noise { sigma } => dsp::add_noise(audio, sigma, rng),
            TransformKind::TimeShift { max_fraction } => dsp::shift_time(audio, max_fraction, rng),
            TransformKind::Volume { factor } => Ok(dsp::scale_volume(audio, factor)),
            TransformKind::SpeedRange { min_rate, max_rate } => {
                dsp::random_speed_change(audio, (min_rate, max_rate), rng)
            }
            TransformKind::StretchNoise { rate, sigma } => {
                let stretched = dsp::stretch(audio, rate)?;
                dsp::add_noise(&stretched, sigma, rng)
            }
            TransformKind::PitchVolume { semitones, factor } => {
                let shifted = dsp::shift_pitch(audio, semitones)?;
                Ok(dsp::scale_volume(&shifted, factor))
            }
        }
    }
}

/// A named transform configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformSpec {
    pub name: String,
    pub kind: TransformKind,
}

impl TransformSpec {
    pub fn new(name: impl Into<String>, kind: TransformKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn apply(&self, audio: &Waveform, rng: &mut dyn RngCore) -> Result<Waveform> {
        self.kind.apply(audio, rng)
    }
}

/// Ordered set of transform specs with unique, filesystem-safe names
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    specs: Vec<TransformSpec>,
}

impl Catalog {
    /// The standard eleven-entry catalog
    pub fn standard() -> Self {
        use TransformKind::*;

        let specs = vec![
            TransformSpec::new("time_stretch_fast", Stretch { rate: 1.1 }),
            TransformSpec::new("time_stretch_slow", Stretch { rate: 0.9 }),
            TransformSpec::new("pitch_up", PitchShift { semitones: 2 }),
            TransformSpec::new("pitch_down", PitchShift { semitones: -2 }),
            TransformSpec::new("noise_light", Noise { sigma: 0.002 }),
            TransformSpec::new("noise_medium", Noise { sigma: 0.005 }),
            TransformSpec::new("time_shift", TimeShift { max_fraction: 0.15 }),
            TransformSpec::new("volume_up", Volume { factor: 1.2 }),
            TransformSpec::new("volume_down", Volume { factor: 0.8 }),
            TransformSpec::new("combined_1", StretchNoise { rate: 1.05, sigma: 0.003 }),
            TransformSpec::new("combined_2", PitchVolume { semitones: 1, factor: 0.9 }),
        ];

        Self { specs }
    }

    /// Build a catalog from custom specs
    ///
    /// # Errors
    /// * `DuplicateTransform` - two specs share a name
    /// * `Config` - a name is empty or not a filesystem-safe token
    pub fn from_specs(specs: Vec<TransformSpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if !is_safe_token(&spec.name) {
                return Err(AugmentError::Config {
                    reason: format!("transform name '{}' is not a file-safe token", spec.name),
                });
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(AugmentError::DuplicateTransform {
                    name: spec.name.clone(),
                });
            }
        }
        Ok(Self { specs })
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TransformSpec> {
        self.specs.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&TransformSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransformSpec> {
        self.specs.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn is_safe_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
