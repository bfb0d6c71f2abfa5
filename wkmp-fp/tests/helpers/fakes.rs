//! In-memory fakes for the fingerprint and lookup seams

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wkmp_fp::fingerprint::{Fingerprint, FingerprintError, Fingerprinter};
use wkmp_fp::lookup::{ClientIdentity, LookupError, MetadataLookup, TrackInformation};
use wkmp_fp::AudioData;

/// Fingerprinter returning a fixed print, or failing on demand
#[derive(Clone, Default)]
pub struct FakeFingerprinter {
    pub calls: Arc<AtomicUsize>,
    pub fail: bool,
}

impl FakeFingerprinter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fingerprinter for FakeFingerprinter {
    fn create_print(&self, audio: &AudioData) -> Result<Fingerprint, FingerprintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FingerprintError::NoFingerprint);
        }
        Ok(Fingerprint {
            encoded: "AQAAAQE".to_string(),
            duration_secs: audio.duration_secs(),
        })
    }
}

/// What the fake lookup answers
#[derive(Clone)]
pub enum LookupAnswer {
    Found(TrackInformation),
    NotFound,
    ServiceError,
}

/// Lookup returning a canned answer and recording requests
#[derive(Clone)]
pub struct FakeLookup {
    pub answer: LookupAnswer,
    pub requests: Arc<Mutex<Vec<(Fingerprint, ClientIdentity, bool)>>>,
}

impl FakeLookup {
    pub fn found(artist: &str, track: &str, id: &str) -> Self {
        Self::answering(LookupAnswer::Found(TrackInformation {
            artist: artist.to_string(),
            track: track.to_string(),
            id: id.to_string(),
        }))
    }

    pub fn not_found() -> Self {
        Self::answering(LookupAnswer::NotFound)
    }

    pub fn service_error() -> Self {
        Self::answering(LookupAnswer::ServiceError)
    }

    fn answering(answer: LookupAnswer) -> Self {
        Self {
            answer,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl MetadataLookup for FakeLookup {
    async fn lookup(
        &self,
        fingerprint: &Fingerprint,
        client: &ClientIdentity,
        return_metadata: bool,
    ) -> Result<Option<TrackInformation>, LookupError> {
        self.requests
            .lock()
            .unwrap()
            .push((fingerprint.clone(), client.clone(), return_metadata));

        match &self.answer {
            LookupAnswer::Found(info) => Ok(Some(info.clone())),
            LookupAnswer::NotFound => Ok(None),
            LookupAnswer::ServiceError => Err(LookupError::Service("invalid API key".to_string())),
        }
    }
}
