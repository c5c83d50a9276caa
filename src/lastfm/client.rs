//! Minimal Last.fm web API client: just `user.getrecenttracks`.

use std::time::Duration;

use crate::config::LastFmConfig;
use crate::error::{Result, ScrobblePrintError};

use super::types::{RawTrackEvent, RecentTracksResponse};

/// Last.fm API root.
pub const API_ROOT: &str = "https://ws.audioscrobbler.com/2.0/";

/// Two entries are enough to see the now-playing track and the last scrobble.
const RECENT_TRACKS_LIMIT: &str = "2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated handle for read-only Last.fm calls.
#[derive(Debug, Clone)]
pub struct LastFmClient {
    http: reqwest::Client,
    api_root: String,
    api_key: String,
}

impl LastFmClient {
    /// Build a client from configuration.
    ///
    /// The shared secret is only needed for signed (write) calls, which this
    /// crate never makes.
    pub fn new(config: &LastFmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScrobblePrintError::PollerTransport(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            api_root: API_ROOT.to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Point the client at a different API root (mirrors, tests).
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    /// Fetch the user's most recent tracks, newest first.
    ///
    /// A now-playing track, if any, is always the first entry.
    pub async fn recent_tracks(&self, username: &str) -> Result<Vec<RawTrackEvent>> {
        let response = self
            .http
            .get(&self.api_root)
            .query(&[
                ("method", "user.getrecenttracks"),
                ("user", username),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
                ("limit", RECENT_TRACKS_LIMIT),
            ])
            .send()
            .await
            .map_err(|e| ScrobblePrintError::PollerTransport(format!("Request failed: {}", e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScrobblePrintError::PollerTransport(format!("Failed to read response: {}", e)))?;

        // Last.fm reports API errors in a JSON body, sometimes with a 200
        let body: Option<RecentTracksResponse> = serde_json::from_slice(&bytes).ok();

        if !status.is_success() {
            let detail = match body {
                Some(RecentTracksResponse::Error { error, message }) => {
                    format!(": Last.fm error {}: {}", error, message)
                }
                _ => String::new(),
            };
            return Err(ScrobblePrintError::PollerTransport(format!(
                "HTTP {}{}",
                status, detail
            )));
        }

        let body = body.ok_or_else(|| {
            ScrobblePrintError::PollerTransport(format!("Unreadable response (HTTP {})", status))
        })?;

        body.into_tracks().map_err(|(code, message)| {
            ScrobblePrintError::PollerTransport(format!("Last.fm error {}: {}", code, message))
        })
    }
}
