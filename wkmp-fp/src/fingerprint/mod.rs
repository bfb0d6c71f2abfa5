//! Acoustic fingerprint creation
//!
//! The [`Fingerprinter`] trait is the seam between the driver and the
//! fingerprinting backend. [`ChromaprintFingerprinter`] is the production
//! implementation.

pub mod chromaprint;

use crate::audio::AudioData;
use thiserror::Error;

pub use chromaprint::ChromaprintFingerprinter;

/// Errors that can occur during fingerprint creation
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// No samples to analyze
    #[error("Empty sample buffer")]
    EmptyAudio,

    /// Audio shorter than the fingerprinting minimum
    #[error("Audio too short for fingerprinting: {duration_ms}ms (minimum {minimum_ms}ms)")]
    TooShort { duration_ms: u64, minimum_ms: u64 },

    /// Backend rejected the stream parameters
    #[error("Failed to start fingerprinting at {sample_rate} Hz, {channels} channel(s)")]
    StartFailed { sample_rate: u32, channels: u16 },

    /// Backend produced no fingerprint data
    #[error("Fingerprinting produced no data")]
    NoFingerprint,
}

/// Compressed fingerprint ready for lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Base64 (URL-safe, unpadded) compressed fingerprint
    pub encoded: String,
    /// Audio duration in whole seconds
    pub duration_secs: u32,
}

/// Computes a fingerprint from decoded audio
pub trait Fingerprinter: Send + Sync {
    fn create_print(&self, audio: &AudioData) -> Result<Fingerprint, FingerprintError>;
}
