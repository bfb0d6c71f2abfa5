//! Driver integration tests
//!
//! Real file loading (hound fixtures, missing decoders) with fake fingerprint
//! and lookup collaborators.

mod helpers;

use helpers::{generate_test_wav, AudioConfig, FakeFingerprinter, FakeLookup};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wkmp_fp::fingerprint::ChromaprintFingerprinter;
use wkmp_fp::loader::{Decoder, DecoderKind, FileLoader};
use wkmp_fp::lookup::ClientIdentity;
use wkmp_fp::{Driver, FailurePolicy, FileOutcome, EXIT_FAILURE};

fn client() -> ClientIdentity {
    ClientIdentity {
        client_id: "test-key".to_string(),
        client_version: "wkmp-fp test".to_string(),
    }
}

/// Loader whose decoders cannot be launched, scratch output under `scratch`
fn loader_without_decoders(scratch: &Path) -> FileLoader {
    FileLoader::new(
        Decoder::new(DecoderKind::Lame, "wkmp-fp-test-missing-lame", scratch),
        Decoder::new(DecoderKind::OggDec, "wkmp-fp-test-missing-oggdec", scratch),
    )
}

fn wav_fixture(dir: &Path, name: &str) -> PathBuf {
    generate_test_wav(&dir.join(name), &AudioConfig::default()).unwrap()
}

fn output_lines(out: &[u8]) -> Vec<String> {
    String::from_utf8(out.to_vec())
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_identified_wav_prints_success_block() {
    let temp_dir = TempDir::new().unwrap();
    let song = wav_fixture(temp_dir.path(), "song.wav");

    let lookup = FakeLookup::found("A", "T", "ID123");
    let driver = Driver::new(
        loader_without_decoders(temp_dir.path()),
        FakeFingerprinter::default(),
        lookup.clone(),
        client(),
    );

    let mut out = Vec::new();
    let report = driver.run(&[song], &mut out).await.unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "Success.\nA\nT\nID123\n");
    assert_eq!(report.exit_code(), 0);

    let requests = lookup.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (fingerprint, identity, return_metadata) = &requests[0];
    assert_eq!(fingerprint.duration_secs, 5);
    assert_eq!(identity, &client());
    assert!(*return_metadata);
}

#[tokio::test]
async fn test_uppercase_wav_extension_loads_without_decoder() {
    let temp_dir = TempDir::new().unwrap();
    let song = wav_fixture(temp_dir.path(), "LOUD.WAV");

    let driver = Driver::new(
        loader_without_decoders(temp_dir.path()),
        FakeFingerprinter::default(),
        FakeLookup::found("A", "T", "ID"),
        client(),
    );

    let mut out = Vec::new();
    let report = driver.run(&[song], &mut out).await.unwrap();

    // The decoders would fail to launch; success means the WAV path was taken
    assert_eq!(report.exit_code(), 0);
    assert!(matches!(report.files[0].1, FileOutcome::Identified(_)));
}

#[tokio::test]
async fn test_missing_decoder_aborts_without_scratch_files() {
    let scratch = TempDir::new().unwrap();
    let fingerprinter = FakeFingerprinter::default();

    let driver = Driver::new(
        loader_without_decoders(scratch.path()),
        fingerprinter.clone(),
        FakeLookup::found("A", "T", "ID"),
        client(),
    );

    let mut out = Vec::new();
    let report = driver
        .run(&[PathBuf::from("missing.mp3")], &mut out)
        .await
        .unwrap();

    assert_eq!(
        output_lines(&out),
        vec!["Error decoding missing.mp3", "** Failed to load file"]
    );
    assert_eq!(report.exit_code(), EXIT_FAILURE);
    assert_eq!(fingerprinter.call_count(), 0);
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_scratch_root_is_a_load_failure() {
    let temp_dir = TempDir::new().unwrap();
    let scratch = temp_dir.path().join("no-such-scratch-dir");
    let fingerprinter = FakeFingerprinter::default();

    let driver = Driver::new(
        loader_without_decoders(&scratch),
        fingerprinter.clone(),
        FakeLookup::found("A", "T", "ID"),
        client(),
    );

    let mut out = Vec::new();
    let report = driver
        .run(&[PathBuf::from("song.ogg")], &mut out)
        .await
        .unwrap();

    // The decoder never ran, so this is not reported as a decoding error
    assert_eq!(output_lines(&out), vec!["** Failed to load file"]);
    assert_eq!(report.files[0].1, FileOutcome::LoadFailed);
    assert_eq!(fingerprinter.call_count(), 0);
    assert_eq!(report.exit_code(), EXIT_FAILURE);
}

#[tokio::test]
async fn test_unrecognized_extension_does_not_reuse_previous_audio() {
    let temp_dir = TempDir::new().unwrap();
    let first = wav_fixture(temp_dir.path(), "a.wav");
    let fingerprinter = FakeFingerprinter::default();
    let lookup = FakeLookup::found("A", "T", "ID123");

    let driver = Driver::new(
        loader_without_decoders(temp_dir.path()),
        fingerprinter.clone(),
        lookup.clone(),
        client(),
    );

    let mut out = Vec::new();
    let report = driver
        .run(&[first, PathBuf::from("b.xyz")], &mut out)
        .await
        .unwrap();

    assert_eq!(
        output_lines(&out),
        vec![
            "Success.",
            "A",
            "T",
            "ID123",
            "Unable to detect filetype.",
            "** Failed to load file",
        ]
    );
    assert_eq!(fingerprinter.call_count(), 1);
    assert_eq!(lookup.request_count(), 1);
    assert_eq!(report.files[1].1, FileOutcome::LoadFailed);
    assert_eq!(report.exit_code(), EXIT_FAILURE);
}

#[tokio::test]
async fn test_abort_policy_skips_remaining_files() {
    let temp_dir = TempDir::new().unwrap();
    let good = wav_fixture(temp_dir.path(), "good.wav");
    let fingerprinter = FakeFingerprinter::default();

    let driver = Driver::new(
        loader_without_decoders(temp_dir.path()),
        fingerprinter.clone(),
        FakeLookup::found("A", "T", "ID"),
        client(),
    );

    let mut out = Vec::new();
    let report = driver
        .run(&[PathBuf::from("notes.txt"), good], &mut out)
        .await
        .unwrap();

    assert_eq!(report.files.len(), 1);
    assert!(report.aborted);
    assert_eq!(fingerprinter.call_count(), 0);
    assert_eq!(report.exit_code(), EXIT_FAILURE);
}

#[tokio::test]
async fn test_continue_policy_processes_all_and_summarizes() {
    let temp_dir = TempDir::new().unwrap();
    let good = wav_fixture(temp_dir.path(), "good.wav");

    let driver = Driver::new(
        loader_without_decoders(temp_dir.path()),
        FakeFingerprinter::default(),
        FakeLookup::found("A", "T", "ID"),
        client(),
    )
    .with_policy(FailurePolicy::Continue);

    let mut out = Vec::new();
    let report = driver
        .run(&[PathBuf::from("notes.txt"), good], &mut out)
        .await
        .unwrap();

    let lines = output_lines(&out);
    assert_eq!(
        lines.last().map(String::as_str),
        Some("Processed 2 file(s): 1 identified, 0 unmatched, 1 failed")
    );
    assert!(!report.aborted);
    assert_eq!(report.files.len(), 2);
    assert_eq!(report.exit_code(), EXIT_FAILURE);
}

#[tokio::test]
async fn test_fingerprint_failure_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let first = wav_fixture(temp_dir.path(), "first.wav");
    let second = wav_fixture(temp_dir.path(), "second.wav");
    let lookup = FakeLookup::found("A", "T", "ID");

    let driver = Driver::new(
        loader_without_decoders(temp_dir.path()),
        FakeFingerprinter::failing(),
        lookup.clone(),
        client(),
    );

    let mut out = Vec::new();
    let report = driver.run(&[first, second], &mut out).await.unwrap();

    assert_eq!(output_lines(&out), vec!["** Failed to generate print."]);
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].1, FileOutcome::PrintFailed);
    assert_eq!(lookup.request_count(), 0);
    assert_eq!(report.exit_code(), EXIT_FAILURE);
}

#[tokio::test]
async fn test_missing_metadata_is_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let first = wav_fixture(temp_dir.path(), "first.wav");
    let second = wav_fixture(temp_dir.path(), "second.wav");
    let lookup = FakeLookup::not_found();

    let driver = Driver::new(
        loader_without_decoders(temp_dir.path()),
        FakeFingerprinter::default(),
        lookup.clone(),
        client(),
    );

    let mut out = Vec::new();
    let report = driver.run(&[first, second], &mut out).await.unwrap();

    assert_eq!(
        output_lines(&out),
        vec!["** Failed to get metadata.", "** Failed to get metadata."]
    );
    assert_eq!(lookup.request_count(), 2);
    assert_eq!(report.unmatched(), 2);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_lookup_error_is_reported_as_missing_metadata() {
    let temp_dir = TempDir::new().unwrap();
    let song = wav_fixture(temp_dir.path(), "song.wav");

    let driver = Driver::new(
        loader_without_decoders(temp_dir.path()),
        FakeFingerprinter::default(),
        FakeLookup::service_error(),
        client(),
    );

    let mut out = Vec::new();
    let report = driver.run(&[song], &mut out).await.unwrap();

    assert_eq!(output_lines(&out), vec!["** Failed to get metadata."]);
    assert_eq!(report.files[0].1, FileOutcome::Unmatched);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_chromaprint_fingerprint_reaches_lookup() {
    let temp_dir = TempDir::new().unwrap();
    let song = wav_fixture(temp_dir.path(), "tone.wav");
    let lookup = FakeLookup::found("A", "T", "ID");

    let driver = Driver::new(
        loader_without_decoders(temp_dir.path()),
        ChromaprintFingerprinter::new(),
        lookup.clone(),
        client(),
    );

    let mut out = Vec::new();
    let report = driver.run(&[song], &mut out).await.unwrap();
    assert_eq!(report.exit_code(), 0);

    let requests = lookup.requests.lock().unwrap();
    let (fingerprint, _, _) = &requests[0];
    assert!(fingerprint.encoded.starts_with("AQ"));
    assert_eq!(fingerprint.duration_secs, 5);
}

#[tokio::test]
async fn test_short_audio_fails_real_fingerprinter() {
    let temp_dir = TempDir::new().unwrap();
    let config = AudioConfig {
        duration_seconds: 1.0,
        ..Default::default()
    };
    let clip = generate_test_wav(&temp_dir.path().join("clip.wav"), &config).unwrap();

    let driver = Driver::new(
        loader_without_decoders(temp_dir.path()),
        ChromaprintFingerprinter::new(),
        FakeLookup::found("A", "T", "ID"),
        client(),
    );

    let mut out = Vec::new();
    let report = driver.run(&[clip], &mut out).await.unwrap();

    assert_eq!(output_lines(&out), vec!["** Failed to generate print."]);
    assert_eq!(report.exit_code(), EXIT_FAILURE);
}
