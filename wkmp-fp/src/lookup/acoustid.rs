//! AcoustID API Client
//!
//! Resolves Chromaprint fingerprints to track metadata.
//!
//! # API Reference
//! - Endpoint: https://api.acoustid.org/v2/lookup
//! - Documentation: https://acoustid.org/webservice

use super::{ClientIdentity, LookupError, MetadataLookup, TrackInformation};
use crate::fingerprint::Fingerprint;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, info};

/// AcoustID API endpoint
pub const ACOUSTID_API_URL: &str = "https://api.acoustid.org/v2/lookup";

/// Public AcoustID demo client key, used when none is configured
pub const DEFAULT_CLIENT_KEY: &str = "8XaBELgH";

/// AcoustID allows 3 requests per second per client
const REQUESTS_PER_SECOND: u32 = 3;

#[derive(Debug, Deserialize)]
struct AcoustIdResponse {
    status: String,
    #[serde(default)]
    error: Option<AcoustIdErrorBody>,
    #[serde(default)]
    results: Vec<AcoustIdResult>,
}

#[derive(Debug, Deserialize)]
struct AcoustIdErrorBody {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct AcoustIdResult {
    id: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    recordings: Vec<AcoustIdRecording>,
}

#[derive(Debug, Deserialize)]
struct AcoustIdRecording {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    artists: Vec<AcoustIdArtist>,
}

#[derive(Debug, Deserialize)]
struct AcoustIdArtist {
    name: String,
}

/// AcoustID lookup client
pub struct AcoustIdClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl AcoustIdClient {
    /// Create client against the public AcoustID endpoint
    pub fn new() -> Result<Self, LookupError> {
        Self::with_base_url(ACOUSTID_API_URL)
    }

    /// Create client against another endpoint (mirrors, test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(LookupError::Client)?;

        let quota = Quota::per_second(NonZeroU32::new(REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            client,
            base_url: base_url.into(),
            rate_limiter: RateLimiter::direct(quota),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MetadataLookup for AcoustIdClient {
    async fn lookup(
        &self,
        fingerprint: &Fingerprint,
        client: &ClientIdentity,
        return_metadata: bool,
    ) -> Result<Option<TrackInformation>, LookupError> {
        let params = form_params(fingerprint, client, return_metadata);

        debug!(
            "Querying AcoustID API: duration={}s, fingerprint_len={}",
            fingerprint.duration_secs,
            fingerprint.encoded.len()
        );

        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .post(&self.base_url)
            .form(&params)
            .send()
            .await
            .map_err(LookupError::Request)?;

        let status = response.status();
        let body = response.text().await.map_err(LookupError::Request)?;

        let track = interpret_response(status, &body)?;
        match &track {
            Some(info) => info!(id = %info.id, "AcoustID match found"),
            None => info!("No AcoustID match"),
        }
        Ok(track)
    }
}

/// Form fields for a lookup request
fn form_params(
    fingerprint: &Fingerprint,
    client: &ClientIdentity,
    return_metadata: bool,
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("client", client.client_id.clone()),
        ("clientversion", client.client_version.clone()),
        ("format", "json".to_string()),
        ("duration", fingerprint.duration_secs.to_string()),
        ("fingerprint", fingerprint.encoded.clone()),
    ];
    if return_metadata {
        params.push(("meta", "recordings".to_string()));
    }
    params
}

/// Interpret an HTTP status and body together
///
/// Error responses carry a JSON body with a message; it is preferred over the
/// bare status.
fn interpret_response(
    status: StatusCode,
    body: &str,
) -> Result<Option<TrackInformation>, LookupError> {
    let parsed = parse_response(body);
    if status.is_success() {
        return parsed;
    }
    match parsed {
        Err(LookupError::Service(message)) => Err(LookupError::Service(message)),
        _ => Err(LookupError::HttpStatus(status)),
    }
}

/// Interpret an AcoustID JSON response body
///
/// The highest-scoring result supplies the identifier; its first recording
/// (if any) supplies title and artists.
fn parse_response(body: &str) -> Result<Option<TrackInformation>, LookupError> {
    let response: AcoustIdResponse = serde_json::from_str(body).map_err(LookupError::Parse)?;

    if response.status != "ok" {
        let message = match response.error {
            Some(AcoustIdErrorBody {
                code: Some(code),
                message,
            }) => format!("{} (code {})", message, code),
            Some(AcoustIdErrorBody { message, .. }) => message,
            None => format!("status {}", response.status),
        };
        return Err(LookupError::Service(message));
    }

    let best = response.results.into_iter().max_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(best.map(|result| {
        let recording = result.recordings.into_iter().next();
        let (track, artist) = match recording {
            Some(recording) => (
                recording.title.unwrap_or_default(),
                recording
                    .artists
                    .into_iter()
                    .map(|a| a.name)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            None => (String::new(), String::new()),
        };
        TrackInformation {
            artist,
            track,
            id: result.id,
        }
    }))
}
