//! Audio file I/O
//!
//! Sources are WAV (read with hound) or MP3 (decoded with symphonia).
//! Everything is downmixed to mono and resampled to the requested rate on
//! load. Outputs are always mono 32-bit float WAV, which round-trips the
//! in-memory samples bit for bit.

use std::fs::File;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::dsp::resample;
use crate::engine::waveform::Waveform;
use crate::error::{AugmentError, Result};

/// Extension of every file the engine writes
pub const OUTPUT_EXTENSION: &str = "wav";

/// Source extensions the engine will load
pub const SOURCE_EXTENSIONS: [&str; 2] = ["wav", "mp3"];

/// True if `path` ends in `.<extension>`, ignoring ASCII case
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

/// True if `path` has one of the recognized source extensions
pub fn is_supported_source(path: &Path) -> bool {
    SOURCE_EXTENSIONS
        .iter()
        .any(|known| has_extension(path, known))
}

/// Load an audio file as mono at `target_rate`
///
/// # Errors
/// * `Load` - missing file, undecodable data, unsupported codec, or no samples
pub fn load_audio(path: &Path, target_rate: u32) -> Result<Waveform> {
    if !path.exists() {
        return Err(AugmentError::load(path, "file not found"));
    }

    let (samples, source_rate) = if has_extension(path, "wav") {
        decode_wav(path)?
    } else {
        decode_compressed(path)?
    };

    if samples.is_empty() {
        return Err(AugmentError::load(path, "audio contains no samples"));
    }

    let resampled = resample(&samples, source_rate, target_rate).map_err(|e| {
        AugmentError::Load {
            path: path.to_path_buf(),
            reason: format!("resampling {} Hz -> {} Hz failed", source_rate, target_rate),
            source: Some(Box::new(e)),
        }
    })?;

    if resampled.is_empty() {
        return Err(AugmentError::load(path, "resampled audio is empty"));
    }

    tracing::debug!(
        path = %path.display(),
        source_rate,
        target_rate,
        samples = resampled.len(),
        "Loaded audio"
    );

    Ok(Waveform::new(resampled, target_rate))
}

/// Write a waveform as a mono 32-bit float WAV file
///
/// # Errors
/// * `Write` - the file cannot be created or written
pub fn write_wav(wave: &Waveform, path: &Path) -> Result<()> {
    let write_err = |e: hound::Error| AugmentError::Write {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let spec = WavSpec {
        channels: 1,
        sample_rate: wave.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec).map_err(write_err)?;
    for &sample in wave.samples() {
        writer.write_sample(sample).map_err(write_err)?;
    }
    writer.finalize().map_err(write_err)?;

    Ok(())
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Decode a WAV file to mono f32 samples and its sample rate
fn decode_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let reader = WavReader::open(path).map_err(|e| AugmentError::Load {
        path: path.to_path_buf(),
        reason: format!("failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(AugmentError::load(path, "WAV header declares zero channels"));
    }

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)
        .map_err(|e| AugmentError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
            source: Some(Box::new(e)),
        })?;

    Ok((downmix(&interleaved, channels), spec.sample_rate))
}

/// Read samples from a WAV reader and convert to f32 in [-1, 1]
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> std::result::Result<Vec<f32>, hound::Error> {
    match sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect(),
        SampleFormat::Int => match bits_per_sample {
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect(),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect(),
            // 24-bit stored as i32 in hound
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect(),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect(),
            _ => Err(hound::Error::Unsupported),
        },
    }
}

/// Decode a compressed file (MP3) with symphonia
fn decode_compressed(path: &Path) -> Result<(Vec<f32>, u32)> {
    let load_err = |reason: String, e: SymphoniaError| AugmentError::Load {
        path: path.to_path_buf(),
        reason,
        source: Some(Box::new(e)),
    };

    let file = File::open(path).map_err(|e| AugmentError::Load {
        path: path.to_path_buf(),
        reason: "failed to open file".to_string(),
        source: Some(Box::new(e)),
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| load_err("unrecognized container".to_string(), e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AugmentError::load(path, "no audio track found"))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AugmentError::load(path, "sample rate unknown"))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| load_err("unsupported codec".to_string(), e))?;

    let mut mono = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(load_err("error reading packet".to_string(), e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channels = spec.channels.count().max(1);
                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                mono.extend(downmix(buffer.samples(), channels));
            }
            // Corrupt frames are skipped, matching common decoder behaviour
            Err(SymphoniaError::DecodeError(reason)) => {
                tracing::debug!(path = %path.display(), reason, "Skipping undecodable packet");
            }
            Err(e) => return Err(load_err("decode failed".to_string(), e)),
        }
    }

    Ok((mono, sample_rate))
}

/// Average interleaved frames down to one channel
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_int16_stereo(path: &Path, sample_rate: u32, frames: usize) {
        let spec = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            let v = ((i as f32 * 0.05).sin() * 16000.0) as i16;
            writer.write_sample(v).unwrap();
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_float_round_trip_is_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let original = Waveform::sine(440.0, 0.25, 0.7, 22050);
        write_wav(&original, &path).unwrap();
        let loaded = load_audio(&path, 22050).unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_stereo_int16_is_downmixed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_int16_stereo(&path, 22050, 4410);

        let loaded = load_audio(&path, 22050).unwrap();
        assert_eq!(loaded.len(), 4410);
        assert_eq!(loaded.sample_rate(), 22050);
        assert!(loaded.peak() > 0.4 && loaded.peak() < 0.5);
    }

    #[test]
    fn test_load_resamples_to_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hi_rate.wav");
        write_int16_stereo(&path, 44100, 44100);

        let loaded = load_audio(&path, 22050).unwrap();
        assert_eq!(loaded.sample_rate(), 22050);
        assert_eq!(loaded.len(), 22050);
    }

    #[test]
    fn test_missing_file_is_load_failure() {
        let err = load_audio(Path::new("/nonexistent/dir/bark.wav"), 22050).unwrap_err();
        assert_eq!(err.error_code(), "LOAD_FAILURE");
    }

    #[test]
    fn test_garbage_file_is_load_failure() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("broken.wav");
        let mp3 = dir.path().join("broken.mp3");
        std::fs::write(&wav, b"definitely not RIFF").unwrap();
        std::fs::write(&mp3, [0u8; 64]).unwrap();

        assert_eq!(load_audio(&wav, 22050).unwrap_err().error_code(), "LOAD_FAILURE");
        assert_eq!(load_audio(&mp3, 22050).unwrap_err().error_code(), "LOAD_FAILURE");
    }

    fn mp3_fixture() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/clip.mp3")
    }

    #[test]
    fn test_mp3_decodes_to_target_rate() {
        let loaded = load_audio(&mp3_fixture(), 22050).unwrap();

        assert_eq!(loaded.sample_rate(), 22050);
        assert!(loaded.duration_secs() > 0.5, "decoded {} samples", loaded.len());
        assert!(loaded.is_finite());
    }

    #[test]
    fn test_mp3_length_follows_target_rate() {
        let high = load_audio(&mp3_fixture(), 22050).unwrap();
        let low = load_audio(&mp3_fixture(), 16000).unwrap();

        let expected = high.len() as f64 * 16000.0 / 22050.0;
        assert!(
            (low.len() as f64 - expected).abs() < expected * 0.01,
            "{} samples at 16 kHz, expected about {}",
            low.len(),
            expected
        );
    }

    #[test]
    fn test_empty_wav_is_load_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav(&Waveform::new(Vec::new(), 22050), &path).unwrap();

        let err = load_audio(&path, 22050).unwrap_err();
        assert!(err.to_string().contains("no samples"));
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let wave = Waveform::sine(440.0, 0.1, 0.5, 22050);
        let err = write_wav(&wave, Path::new("/nonexistent/dir/out.wav")).unwrap_err();
        assert_eq!(err.error_code(), "WRITE_FAILURE");
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported_source(Path::new("a/bark.wav")));
        assert!(is_supported_source(Path::new("a/bark.MP3")));
        assert!(!is_supported_source(Path::new("a/notes.txt")));
        assert!(!is_supported_source(Path::new("a/noext")));
    }
}
