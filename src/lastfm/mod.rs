//! # Last.fm Integration
//!
//! - [`types`]: serde models for `user.getrecenttracks`
//! - [`client`]: HTTP client for the web API
//! - [`stream`]: pausable now-playing event stream

pub mod client;
pub mod stream;
pub mod types;

pub use client::LastFmClient;
pub use stream::{LastFmStream, NowPlayingSource, PlaybackTracker, StreamEvent};
pub use types::RawTrackEvent;
