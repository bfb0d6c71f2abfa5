//! WAV file loading via hound

use super::LoadError;
use crate::audio::AudioData;
use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::debug;

/// Read a WAV file into 16-bit interleaved PCM
///
/// Integer samples are shifted to the 16-bit range (up for narrower formats,
/// down for wider ones); 32-bit float samples are clamped to [-1.0, 1.0] and
/// scaled.
pub fn load_wave_file(path: &Path) -> Result<AudioData, LoadError> {
    let wave_error = |source: hound::Error| LoadError::Wave {
        path: path.to_path_buf(),
        source,
    };

    let reader = WavReader::open(path).map_err(wave_error)?;
    let spec = reader.spec();

    let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 1..=16) => {
            let shift = 16 - spec.bits_per_sample;
            reader
                .into_samples::<i16>()
                .map(|s| s.map(|v| v << shift))
                .collect::<Result<_, _>>()
                .map_err(wave_error)?
        }
        (SampleFormat::Int, 17..=32) => {
            let shift = spec.bits_per_sample - 16;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| (v >> shift) as i16))
                .collect::<Result<_, _>>()
                .map_err(wave_error)?
        }
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .map(|s| s.map(float_to_i16))
            .collect::<Result<_, _>>()
            .map_err(wave_error)?,
        (format, bits) => {
            return Err(LoadError::UnsupportedWave {
                path: path.to_path_buf(),
                detail: format!("{:?} samples at {} bits", format, bits),
            })
        }
    };

    let audio = AudioData::new(samples, spec.sample_rate, spec.channels);
    if audio.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    debug!(
        file = %path.display(),
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        bits = spec.bits_per_sample,
        duration_ms = audio.duration_ms(),
        "Loaded WAV file"
    );

    Ok(audio)
}

fn float_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
