//! Fingerprint → track metadata lookup

pub mod acoustid;

use crate::fingerprint::Fingerprint;
use async_trait::async_trait;
use thiserror::Error;

pub use acoustid::AcoustIdClient;

/// Errors that can occur during metadata lookup
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request failed (network, timeout)
    #[error("Lookup request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// Non-success HTTP status
    #[error("Lookup service returned HTTP {0}")]
    HttpStatus(reqwest::StatusCode),

    /// Response body was not the expected JSON
    #[error("Failed to parse lookup response: {0}")]
    Parse(#[source] serde_json::Error),

    /// Service reported an error status
    #[error("Lookup service error: {0}")]
    Service(String),
}

/// Identifies the calling application to the lookup service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Service-issued client key
    pub client_id: String,
    /// Client name and version, e.g. "wkmp-fp 0.1.0"
    pub client_version: String,
}

/// Metadata for an identified track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackInformation {
    pub artist: String,
    pub track: String,
    /// Service identifier for the matched track
    pub id: String,
}

/// Resolves fingerprints to track metadata
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Look up `fingerprint`
    ///
    /// `Ok(None)` means the service answered but has no match. When
    /// `return_metadata` is false only the identifier is requested.
    async fn lookup(
        &self,
        fingerprint: &Fingerprint,
        client: &ClientIdentity,
        return_metadata: bool,
    ) -> Result<Option<TrackInformation>, LookupError>;
}
