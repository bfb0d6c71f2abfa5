//! External decoder invocation
//!
//! Runs `lame` (MP3) or `oggdec` (Ogg Vorbis) to write a WAV file into a
//! private scratch directory, then loads that file. The decoder is started
//! directly with an argument vector; no shell is involved, so file names are
//! passed through untouched.
//!
//! The scratch directory is unique per call and is removed before `decode`
//! returns, whatever the outcome.

use super::{load_wave_file, LoadError};
use crate::audio::AudioData;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// File name of the decoder output inside the scratch directory
pub const SCRATCH_FILE_NAME: &str = "tempFile.wav";

/// Supported decoder command lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderKind {
    /// `lame --quiet --decode <input> <output>`
    Lame,
    /// `oggdec --quiet -o <output> <input>`
    OggDec,
}

impl DecoderKind {
    /// Program name used when none is configured
    pub fn default_program(self) -> &'static str {
        match self {
            DecoderKind::Lame => "lame",
            DecoderKind::OggDec => "oggdec",
        }
    }

    /// Argument vector (excluding the program) for decoding `input` to `output`
    pub fn args(self, input: &Path, output: &Path) -> Vec<OsString> {
        match self {
            DecoderKind::Lame => vec![
                "--quiet".into(),
                "--decode".into(),
                input.as_os_str().to_os_string(),
                output.as_os_str().to_os_string(),
            ],
            DecoderKind::OggDec => vec![
                "--quiet".into(),
                "-o".into(),
                output.as_os_str().to_os_string(),
                input.as_os_str().to_os_string(),
            ],
        }
    }
}

/// A configured decoder program
#[derive(Debug, Clone)]
pub struct Decoder {
    kind: DecoderKind,
    program: String,
    scratch_root: PathBuf,
}

impl Decoder {
    /// Create a decoder running `program`, with scratch output under `scratch_root`
    pub fn new(kind: DecoderKind, program: impl Into<String>, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            program: program.into(),
            scratch_root: scratch_root.into(),
        }
    }

    /// Default program name, scratch output in the OS temp directory
    pub fn with_defaults(kind: DecoderKind) -> Self {
        Self::new(kind, kind.default_program(), std::env::temp_dir())
    }

    pub fn kind(&self) -> DecoderKind {
        self.kind
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }

    /// Build the process command for decoding `input` to `output`
    pub fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.kind.args(input, output));
        command
    }

    /// Decode `input` and load the resulting WAV data
    ///
    /// # Errors
    /// - `LoadError::Scratch` if the scratch directory cannot be created
    /// - `LoadError::DecoderLaunch` if the program cannot be started
    /// - `LoadError::DecoderFailed` if the program exits unsuccessfully
    /// - any WAV loading error for the decoder output
    pub fn decode(&self, input: &Path) -> Result<AudioData, LoadError> {
        let scratch = tempfile::Builder::new()
            .prefix("wkmp-fp-")
            .tempdir_in(&self.scratch_root)
            .map_err(LoadError::Scratch)?;
        let output_path = scratch.path().join(SCRATCH_FILE_NAME);

        debug!(
            input = %input.display(),
            output = %output_path.display(),
            program = %self.program,
            "Running decoder"
        );

        let output = self
            .command(input, &output_path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| LoadError::DecoderLaunch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(LoadError::DecoderFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let result = load_wave_file(&output_path);

        if let Err(e) = scratch.close() {
            warn!("Failed to remove decoder scratch directory: {}", e);
        }

        result
    }
}
