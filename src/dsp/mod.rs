//! Transform Library
//!
//! Signal transforms used to build augmentation variants. Every transform
//! takes a waveform by reference and returns a new one.

mod resample;
mod transforms;
mod vocoder;

pub use resample::{resample, resample_by_ratio};
pub use transforms::{
    add_noise, draw_time_offset, random_speed_change, roll, scale_volume, shift_pitch,
    shift_time, stretch,
};
pub use vocoder::time_stretch;
