//! Audio loading: native WAV files and decoder-backed compressed formats
//!
//! Files are classified by extension. WAV files are read directly; MP3 and
//! Ogg Vorbis files are converted to a scratch WAV file by an external
//! decoder program and then read the same way.

pub mod decoder;
pub mod wave;

use crate::audio::AudioData;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;

pub use decoder::{Decoder, DecoderKind, SCRATCH_FILE_NAME};
pub use wave::load_wave_file;

/// Errors that can occur while producing [`AudioData`] for a file
#[derive(Debug, Error)]
pub enum LoadError {
    /// Extension is not one of the supported formats
    #[error("Unable to detect filetype: {0}")]
    UnrecognizedFormat(PathBuf),

    /// Decoder process could not be started
    #[error("Failed to launch decoder {program}: {source}")]
    DecoderLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Decoder process ran and reported failure
    #[error("Decoder {program} exited with {status}: {stderr}")]
    DecoderFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Scratch directory for decoder output could not be created
    #[error("Failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    /// WAV file could not be opened or parsed
    #[error("Failed to read WAV file {path}: {source}")]
    Wave {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// WAV sample layout not handled
    #[error("Unsupported WAV format in {path}: {detail}")]
    UnsupportedWave { path: PathBuf, detail: String },

    /// File parsed but holds no samples
    #[error("No audio data in {0}")]
    Empty(PathBuf),
}

impl LoadError {
    /// True when the decoder program itself could not be started
    pub fn is_decoder_launch(&self) -> bool {
        matches!(self, LoadError::DecoderLaunch { .. })
    }
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Wave,
    Mp3,
    Ogg,
}

impl AudioFormat {
    /// Classify a path by the text after the last `.` of its file name
    ///
    /// Comparison is case-insensitive. Returns `None` for unrecognized or
    /// missing extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy();
        let (_, extension) = name.rsplit_once('.')?;
        Self::from_extension(extension)
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Some(AudioFormat::Wave),
            "mp3" => Some(AudioFormat::Mp3),
            "ogg" | "oga" => Some(AudioFormat::Ogg),
            _ => None,
        }
    }

    /// Decoder needed to turn this format into WAV, if any
    pub fn decoder_kind(self) -> Option<DecoderKind> {
        match self {
            AudioFormat::Wave => None,
            AudioFormat::Mp3 => Some(DecoderKind::Lame),
            AudioFormat::Ogg => Some(DecoderKind::OggDec),
        }
    }
}

/// Produces audio data for an input file
pub trait AudioSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<AudioData, LoadError>;
}

/// Loads files from disk, running external decoders for compressed formats
#[derive(Debug, Clone)]
pub struct FileLoader {
    lame: Decoder,
    oggdec: Decoder,
}

impl FileLoader {
    pub fn new(lame: Decoder, oggdec: Decoder) -> Self {
        Self { lame, oggdec }
    }

    /// Decoder the loader would run for `format`
    pub fn decoder_for(&self, format: AudioFormat) -> Option<&Decoder> {
        match format.decoder_kind()? {
            DecoderKind::Lame => Some(&self.lame),
            DecoderKind::OggDec => Some(&self.oggdec),
        }
    }
}

impl Default for FileLoader {
    fn default() -> Self {
        Self::new(
            Decoder::with_defaults(DecoderKind::Lame),
            Decoder::with_defaults(DecoderKind::OggDec),
        )
    }
}

impl AudioSource for FileLoader {
    fn load(&self, path: &Path) -> Result<AudioData, LoadError> {
        let format = AudioFormat::from_path(path)
            .ok_or_else(|| LoadError::UnrecognizedFormat(path.to_path_buf()))?;

        match self.decoder_for(format) {
            Some(decoder) => decoder.decode(path),
            None => load_wave_file(path),
        }
    }
}
