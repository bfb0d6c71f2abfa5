//! Chromaprint fingerprinter (rusty-chromaprint backend)
//!
//! Mono and stereo audio are fed as-is; wider layouts are downmixed to mono
//! first. The result is compressed into the form the AcoustID service accepts.

use super::{Fingerprint, FingerprintError, Fingerprinter};
use crate::audio::AudioData;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rusty_chromaprint::{Configuration, FingerprintCompressor, Fingerprinter as ChromaContext};
use tracing::debug;

/// Minimum audio duration accepted for fingerprinting
pub const MIN_DURATION_MS: u64 = 3000;

/// Chromaprint fingerprint generator (TEST2 preset)
#[derive(Debug, Default)]
pub struct ChromaprintFingerprinter;

impl ChromaprintFingerprinter {
    pub fn new() -> Self {
        Self
    }

    /// Raw (uncompressed) fingerprint items for `audio`
    pub fn raw_fingerprint(&self, audio: &AudioData) -> Result<Vec<u32>, FingerprintError> {
        compute(&Configuration::preset_test2(), audio)
    }
}

/// Compress raw fingerprint items and encode as URL-safe base64 without padding
///
/// The compressed header carries the algorithm id of `config`.
pub fn encode_fingerprint(config: &Configuration, raw: &[u32]) -> String {
    URL_SAFE_NO_PAD.encode(FingerprintCompressor::from(config).compress(raw))
}

fn compute(config: &Configuration, audio: &AudioData) -> Result<Vec<u32>, FingerprintError> {
    if audio.is_empty() {
        return Err(FingerprintError::EmptyAudio);
    }

    let duration_ms = audio.duration_ms();
    if duration_ms < MIN_DURATION_MS {
        return Err(FingerprintError::TooShort {
            duration_ms,
            minimum_ms: MIN_DURATION_MS,
        });
    }

    let downmixed;
    let audio = if audio.channels() > 2 {
        downmixed = audio.downmix_to_mono();
        &downmixed
    } else {
        audio
    };

    let mut context = ChromaContext::new(config);
    context
        .start(audio.sample_rate(), audio.channels() as u32)
        .map_err(|_| FingerprintError::StartFailed {
            sample_rate: audio.sample_rate(),
            channels: audio.channels(),
        })?;
    context.consume(audio.samples());
    context.finish();

    let raw = context.fingerprint().to_vec();
    if raw.is_empty() {
        return Err(FingerprintError::NoFingerprint);
    }
    Ok(raw)
}

impl Fingerprinter for ChromaprintFingerprinter {
    fn create_print(&self, audio: &AudioData) -> Result<Fingerprint, FingerprintError> {
        let config = Configuration::preset_test2();
        let raw = compute(&config, audio)?;
        let encoded = encode_fingerprint(&config, &raw);

        debug!(
            items = raw.len(),
            encoded_len = encoded.len(),
            duration_ms = audio.duration_ms(),
            "Generated Chromaprint fingerprint"
        );

        Ok(Fingerprint {
            encoded,
            duration_secs: audio.duration_secs(),
        })
    }
}
