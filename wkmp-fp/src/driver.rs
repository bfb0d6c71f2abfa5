//! Per-file identification loop
//!
//! For each input: load audio, create a fingerprint, look up metadata, print
//! the result. Result and diagnostic lines go to the supplied writer
//! (standard output in the binary); detail goes to the tracing log.
//!
//! Load and fingerprint failures are fatal to the run under
//! [`FailurePolicy::Abort`]. A failed metadata lookup is never fatal.

use crate::fingerprint::{Fingerprint, FingerprintError, Fingerprinter};
use crate::loader::{AudioSource, LoadError};
use crate::lookup::{ClientIdentity, MetadataLookup, TrackInformation};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Exit code for a run that stopped on (or contained) a failed file
pub const EXIT_FAILURE: i32 = -1;

/// What to do after a file fails to load or fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the run at the first failed file
    #[default]
    Abort,
    /// Process every file, then print a summary
    Continue,
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Lookup returned track metadata
    Identified(TrackInformation),
    /// Fingerprinted, but the lookup produced nothing
    Unmatched,
    /// Audio could not be loaded (includes unrecognized extensions)
    LoadFailed,
    /// Audio loaded but no fingerprint could be created
    PrintFailed,
}

impl FileOutcome {
    /// Load and fingerprint failures count against the run
    pub fn is_failure(&self) -> bool {
        matches!(self, FileOutcome::LoadFailed | FileOutcome::PrintFailed)
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Processed files in order
    pub files: Vec<(PathBuf, FileOutcome)>,
    /// True when the run stopped before the last file
    pub aborted: bool,
}

impl RunReport {
    pub fn identified(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Identified(_)))
    }

    pub fn unmatched(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Unmatched))
    }

    pub fn failed(&self) -> usize {
        self.count(FileOutcome::is_failure)
    }

    /// 0 when every processed file loaded and fingerprinted, -1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.aborted || self.failed() > 0 {
            EXIT_FAILURE
        } else {
            0
        }
    }

    fn count(&self, predicate: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|(_, o)| predicate(o)).count()
    }
}

/// Result of the blocking load + fingerprint stage
enum Prepared {
    Ready(Fingerprint),
    LoadFailed(LoadError),
    PrintFailed(FingerprintError),
    TaskFailed(String),
}

/// Drives identification of a list of files
pub struct Driver<S, F, L> {
    source: Arc<S>,
    fingerprinter: Arc<F>,
    lookup: L,
    client: ClientIdentity,
    return_metadata: bool,
    policy: FailurePolicy,
}

impl<S, F, L> Driver<S, F, L>
where
    S: AudioSource + 'static,
    F: Fingerprinter + 'static,
    L: MetadataLookup,
{
    pub fn new(source: S, fingerprinter: F, lookup: L, client: ClientIdentity) -> Self {
        Self {
            source: Arc::new(source),
            fingerprinter: Arc::new(fingerprinter),
            lookup,
            client,
            return_metadata: true,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Process `files` in order, writing result lines to `out`
    ///
    /// Only write errors on `out` are returned as `Err`; per-file failures
    /// are reported in the [`RunReport`].
    pub async fn run<W: Write>(&self, files: &[PathBuf], out: &mut W) -> std::io::Result<RunReport> {
        let mut report = RunReport::default();

        for (index, path) in files.iter().enumerate() {
            let outcome = self.process_file(path, out).await?;
            let failed = outcome.is_failure();
            report.files.push((path.clone(), outcome));

            if failed && self.policy == FailurePolicy::Abort {
                report.aborted = index + 1 < files.len();
                if report.aborted {
                    warn!(
                        remaining = files.len() - index - 1,
                        "Stopping run after failed file"
                    );
                }
                break;
            }
        }

        if self.policy == FailurePolicy::Continue {
            writeln!(
                out,
                "Processed {} file(s): {} identified, {} unmatched, {} failed",
                report.files.len(),
                report.identified(),
                report.unmatched(),
                report.failed()
            )?;
        }

        info!(
            identified = report.identified(),
            unmatched = report.unmatched(),
            failed = report.failed(),
            "Run complete"
        );

        Ok(report)
    }

    /// Identify one file
    pub async fn process_file<W: Write>(&self, path: &Path, out: &mut W) -> std::io::Result<FileOutcome> {
        debug!(file = %path.display(), "Processing file");

        let fingerprint = match self.prepare(path).await {
            Prepared::Ready(fingerprint) => fingerprint,
            Prepared::LoadFailed(e) => {
                match &e {
                    LoadError::UnrecognizedFormat(_) => writeln!(out, "Unable to detect filetype.")?,
                    e if e.is_decoder_launch() => writeln!(out, "Error decoding {}", path.display())?,
                    _ => {}
                }
                warn!(file = %path.display(), error = %e, "Failed to load file");
                writeln!(out, "** Failed to load file")?;
                return Ok(FileOutcome::LoadFailed);
            }
            Prepared::TaskFailed(reason) => {
                error!(file = %path.display(), "Audio processing task failed: {}", reason);
                writeln!(out, "** Failed to load file")?;
                return Ok(FileOutcome::LoadFailed);
            }
            Prepared::PrintFailed(e) => {
                warn!(file = %path.display(), error = %e, "Failed to generate fingerprint");
                writeln!(out, "** Failed to generate print.")?;
                return Ok(FileOutcome::PrintFailed);
            }
        };

        let info = match self
            .lookup
            .lookup(&fingerprint, &self.client, self.return_metadata)
            .await
        {
            Ok(Some(info)) => info,
            Ok(None) => {
                info!(file = %path.display(), "No metadata match");
                writeln!(out, "** Failed to get metadata.")?;
                return Ok(FileOutcome::Unmatched);
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Metadata lookup failed");
                writeln!(out, "** Failed to get metadata.")?;
                return Ok(FileOutcome::Unmatched);
            }
        };

        writeln!(out, "Success.")?;
        writeln!(out, "{}", info.artist)?;
        writeln!(out, "{}", info.track)?;
        writeln!(out, "{}", info.id)?;

        Ok(FileOutcome::Identified(info))
    }

    /// Load and fingerprint on the blocking pool
    ///
    /// The audio data lives only inside the blocking task and is dropped
    /// before the fingerprint is returned.
    async fn prepare(&self, path: &Path) -> Prepared {
        let source = Arc::clone(&self.source);
        let fingerprinter = Arc::clone(&self.fingerprinter);
        let path = path.to_path_buf();

        let task = tokio::task::spawn_blocking(move || {
            let audio = match source.load(&path) {
                Ok(audio) => audio,
                Err(e) => return Prepared::LoadFailed(e),
            };
            match fingerprinter.create_print(&audio) {
                Ok(fingerprint) => Prepared::Ready(fingerprint),
                Err(e) => Prepared::PrintFailed(e),
            }
        });

        task.await
            .unwrap_or_else(|e| Prepared::TaskFailed(e.to_string()))
    }
}
