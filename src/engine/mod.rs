//! Audio Engine Module
//!
//! Waveform value type and file I/O.

pub mod io;
pub mod waveform;

pub use io::{
    has_extension, is_supported_source, load_audio, write_wav, OUTPUT_EXTENSION,
    SOURCE_EXTENSIONS,
};
pub use waveform::{Waveform, DEFAULT_SAMPLE_RATE};
