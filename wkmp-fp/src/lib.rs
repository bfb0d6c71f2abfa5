//! wkmp-fp library interface
//!
//! Identifies audio files by acoustic fingerprint:
//! - `loader`: WAV loading and external decoders (lame, oggdec)
//! - `fingerprint`: Chromaprint fingerprint creation
//! - `lookup`: AcoustID metadata lookup
//! - `driver`: per-file identification loop

pub mod audio;
pub mod config;
pub mod driver;
pub mod fingerprint;
pub mod loader;
pub mod lookup;

pub use crate::audio::AudioData;
pub use crate::driver::{Driver, FailurePolicy, FileOutcome, RunReport, EXIT_FAILURE};
