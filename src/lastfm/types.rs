//! Typed Last.fm payloads.
//!
//! Last.fm's JSON is loose: text fields come as `{"#text": ".."}` objects,
//! a single track may arrive as an object instead of a one-element array,
//! and errors are reported in a 200 body. Everything is deserialized here so
//! the rest of the crate only sees typed values.

use serde::{Deserialize, Serialize};

/// A text field that is either a bare string or a `{"#text": ..}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextField {
    Plain(String),
    Tagged {
        #[serde(rename = "#text", default)]
        text: String,
    },
}

impl TextField {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Tagged { text } => text,
        }
    }
}

impl Default for TextField {
    fn default() -> Self {
        Self::Plain(String::new())
    }
}

impl From<&str> for TextField {
    fn from(text: &str) -> Self {
        Self::Plain(text.to_string())
    }
}

/// One resolution variant of a track's cover art.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageVariant {
    /// "small", "medium", "large" or "extralarge"
    #[serde(default)]
    pub size: String,
    #[serde(rename = "#text", default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackAttr {
    #[serde(default)]
    pub nowplaying: Option<String>,
}

/// Scrobble timestamp; only present on tracks that finished playing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrobbleDate {
    #[serde(default)]
    pub uts: String,
    #[serde(rename = "#text", default)]
    pub text: String,
}

/// A raw track entry as returned by `user.getrecenttracks`.
///
/// No invariants hold here; see [`crate::track::Track::from_event`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawTrackEvent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artist: TextField,
    #[serde(default)]
    pub album: TextField,
    #[serde(default)]
    pub image: Vec<ImageVariant>,
    #[serde(rename = "@attr", default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<TrackAttr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<ScrobbleDate>,
    #[serde(default)]
    pub url: String,
}

impl RawTrackEvent {
    /// Whether Last.fm marks this entry as currently playing.
    pub fn is_now_playing(&self) -> bool {
        self.attr
            .as_ref()
            .and_then(|attr| attr.nowplaying.as_deref())
            .is_some_and(|flag| flag == "true")
    }

    /// Same song, ignoring album and scrobble time.
    pub fn is_same_track(&self, other: &RawTrackEvent) -> bool {
        self.name == other.name && self.artist.as_str() == other.artist.as_str()
    }

    /// Same scrobble: same song played at the same time.
    pub fn is_same_scrobble(&self, other: &RawTrackEvent) -> bool {
        self.is_same_track(other)
            && self.date.as_ref().map(|d| &d.uts) == other.date.as_ref().map(|d| &d.uts)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecentTracksBody {
    #[serde(default)]
    track: Option<OneOrMany<RawTrackEvent>>,
}

/// Top-level response of `user.getrecenttracks`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecentTracksResponse {
    Error { error: u32, message: String },
    Tracks { recenttracks: RecentTracksBody },
}

impl RecentTracksResponse {
    /// Tracks newest first, or the API error as `(code, message)`.
    pub fn into_tracks(self) -> Result<Vec<RawTrackEvent>, (u32, String)> {
        match self {
            Self::Error { error, message } => Err((error, message)),
            Self::Tracks { recenttracks } => {
                Ok(recenttracks.track.map(Vec::from).unwrap_or_default())
            }
        }
    }
}
