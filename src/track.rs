//! Canonical track record and the artwork gate.

use tracing::info;

use crate::error::{Result, ScrobblePrintError};
use crate::lastfm::RawTrackEvent;

/// Index of the image variant used as artwork ("extralarge", 300x300).
pub const ARTWORK_VARIANT: usize = 3;

/// A now-playing track that has printable artwork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    pub artist: String,
    pub album: String,
    pub image_url: String,
}

impl Track {
    /// Validate a raw event.
    ///
    /// Fails with [`ScrobblePrintError::NoArtwork`] when the event has no
    /// images, lacks the extralarge variant, or that variant's URL is blank.
    /// Text fields are copied verbatim.
    pub fn from_event(event: &RawTrackEvent) -> Result<Self> {
        let image_url = event
            .image
            .get(ARTWORK_VARIANT)
            .map(|variant| variant.url.as_str())
            .filter(|url| !url.trim().is_empty())
            .ok_or(ScrobblePrintError::NoArtwork)?;

        let track = Self {
            name: event.name.clone(),
            artist: event.artist.as_str().to_string(),
            album: event.album.as_str().to_string(),
            image_url: image_url.to_string(),
        };

        info!(
            name = %track.name,
            artist = %track.artist,
            album = %track.album,
            "Track info"
        );
        info!(url = %track.image_url, "Track image url");

        Ok(track)
    }
}
