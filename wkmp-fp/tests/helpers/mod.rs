//! Test Helper Utilities
//!
//! Shared utilities for testing wkmp-fp: WAV fixture generation and
//! in-memory fakes for the fingerprint and lookup seams.

#![allow(dead_code)]

pub mod audio_generator;
pub mod fakes;

pub use audio_generator::{generate_test_wav, AudioConfig};
pub use fakes::{FakeFingerprinter, FakeLookup};
