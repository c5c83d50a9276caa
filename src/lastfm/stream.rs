//! # Now-Playing Stream
//!
//! Polls `user.getrecenttracks` on a fixed interval and turns the snapshots
//! into change events.
//!
//! ## Events
//!
//! | Event | When |
//! |-------|------|
//! | `LastPlayed` | First successful poll, the newest finished scrobble |
//! | `NowPlaying` | A different track is now playing |
//! | `Scrobbled` | A finished scrobble newer than the last one seen |
//! | `StoppedPlaying` | The now-playing track went away |
//! | `Error` | The request failed; polling continues |
//!
//! ## Pausing
//!
//! ```text
//!   poll task ──events──► mpsc ──► orchestrator
//!       ▲                               │
//!       └────────── watch<bool> ◄───────┘  start() / stop()
//! ```
//!
//! While stopped the poll task parks on the watch channel and issues no
//! requests. The change-detection state survives a stop, so resuming does
//! not re-announce the track that was playing when the stream was paused.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::client::LastFmClient;
use super::types::RawTrackEvent;

/// Events buffered between the poll task and the consumer.
const EVENT_BUFFER: usize = 16;

/// Something the stream observed about the followed account.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    LastPlayed(RawTrackEvent),
    NowPlaying(RawTrackEvent),
    Scrobbled(RawTrackEvent),
    StoppedPlaying(RawTrackEvent),
    Error(String),
}

/// A pausable source of now-playing events.
///
/// `stop()` suspends emission of new observations and `start()` resumes it.
#[async_trait]
pub trait NowPlayingSource: Send {
    fn start(&mut self);
    fn stop(&mut self);

    /// Wait for the next event. `None` once the source has shut down.
    async fn next_event(&mut self) -> Option<StreamEvent>;
}

/// Change detection over successive recent-track snapshots.
#[derive(Debug, Default)]
pub struct PlaybackTracker {
    now_playing: Option<RawTrackEvent>,
    last_scrobble: Option<RawTrackEvent>,
    primed: bool,
}

impl PlaybackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one snapshot (newest first) and collect the resulting events.
    pub fn observe(&mut self, tracks: &[RawTrackEvent]) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        let playing = tracks.iter().find(|t| t.is_now_playing());
        let scrobble = tracks.iter().find(|t| !t.is_now_playing() && t.date.is_some());

        if let Some(scrobble) = scrobble {
            let is_new = self
                .last_scrobble
                .as_ref()
                .is_none_or(|last| !last.is_same_scrobble(scrobble));
            if is_new {
                if self.primed {
                    events.push(StreamEvent::Scrobbled(scrobble.clone()));
                } else {
                    events.push(StreamEvent::LastPlayed(scrobble.clone()));
                }
                self.last_scrobble = Some(scrobble.clone());
            }
        }

        match (playing, self.now_playing.take()) {
            (Some(current), Some(previous)) if current.is_same_track(&previous) => {
                self.now_playing = Some(previous);
            }
            (Some(current), _) => {
                events.push(StreamEvent::NowPlaying(current.clone()));
                self.now_playing = Some(current.clone());
            }
            (None, Some(previous)) => {
                events.push(StreamEvent::StoppedPlaying(previous));
            }
            (None, None) => {}
        }

        self.primed = true;
        events
    }
}

/// Last.fm-backed [`NowPlayingSource`].
///
/// Starts paused; call [`NowPlayingSource::start`] to begin polling.
pub struct LastFmStream {
    running: watch::Sender<bool>,
    events: mpsc::Receiver<StreamEvent>,
    task: JoinHandle<()>,
}

impl LastFmStream {
    /// Spawn the poll task for `username` on the current runtime.
    pub fn spawn(client: LastFmClient, username: String, interval: Duration) -> Self {
        let (running, running_rx) = watch::channel(false);
        let (tx, events) = mpsc::channel(EVENT_BUFFER);
        let task = tokio::spawn(poll_loop(client, username, interval, running_rx, tx));

        Self {
            running,
            events,
            task,
        }
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }
}

#[async_trait]
impl NowPlayingSource for LastFmStream {
    fn start(&mut self) {
        self.running.send_replace(true);
    }

    fn stop(&mut self) {
        self.running.send_replace(false);
    }

    async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }
}

impl Drop for LastFmStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_loop(
    client: LastFmClient,
    username: String,
    interval: Duration,
    mut running: watch::Receiver<bool>,
    events: mpsc::Sender<StreamEvent>,
) {
    let mut tracker = PlaybackTracker::new();
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Park while stopped; a closed channel means the stream was dropped
        if running.wait_for(|on| *on).await.is_err() {
            return;
        }

        ticker.tick().await;
        if !*running.borrow() {
            continue;
        }

        let batch = match client.recent_tracks(&username).await {
            Ok(tracks) => tracker.observe(&tracks),
            Err(e) => vec![StreamEvent::Error(e.to_string())],
        };

        for event in batch {
            if events.send(event).await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lastfm::types::{ScrobbleDate, TrackAttr};
    use pretty_assertions::assert_eq;

    fn playing(name: &str) -> RawTrackEvent {
        RawTrackEvent {
            name: name.to_string(),
            artist: "Band".into(),
            attr: Some(TrackAttr {
                nowplaying: Some("true".to_string()),
            }),
            ..Default::default()
        }
    }

    fn scrobbled(name: &str, uts: &str) -> RawTrackEvent {
        RawTrackEvent {
            name: name.to_string(),
            artist: "Band".into(),
            date: Some(ScrobbleDate {
                uts: uts.to_string(),
                text: String::new(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_poll_reports_last_played_and_now_playing() {
        let mut tracker = PlaybackTracker::new();
        let events = tracker.observe(&[playing("A"), scrobbled("Z", "100")]);
        assert_eq!(
            events,
            vec![
                StreamEvent::LastPlayed(scrobbled("Z", "100")),
                StreamEvent::NowPlaying(playing("A")),
            ]
        );
    }

    #[test]
    fn test_same_track_is_not_repeated() {
        let mut tracker = PlaybackTracker::new();
        tracker.observe(&[playing("A")]);
        assert!(tracker.observe(&[playing("A")]).is_empty());
        assert!(tracker.observe(&[playing("A")]).is_empty());
    }

    #[test]
    fn test_track_change_and_scrobble() {
        let mut tracker = PlaybackTracker::new();
        tracker.observe(&[playing("A"), scrobbled("Z", "100")]);

        let events = tracker.observe(&[playing("B"), scrobbled("A", "200")]);
        assert_eq!(
            events,
            vec![
                StreamEvent::Scrobbled(scrobbled("A", "200")),
                StreamEvent::NowPlaying(playing("B")),
            ]
        );
    }

    #[test]
    fn test_stopped_playing() {
        let mut tracker = PlaybackTracker::new();
        tracker.observe(&[playing("A")]);
        let events = tracker.observe(&[scrobbled("A", "200")]);
        assert_eq!(
            events,
            vec![
                StreamEvent::Scrobbled(scrobbled("A", "200")),
                StreamEvent::StoppedPlaying(playing("A")),
            ]
        );
        assert!(tracker.observe(&[scrobbled("A", "200")]).is_empty());
    }

    #[test]
    fn test_repeat_play_of_same_song_is_new_scrobble() {
        let mut tracker = PlaybackTracker::new();
        tracker.observe(&[scrobbled("A", "100")]);
        let events = tracker.observe(&[scrobbled("A", "400")]);
        assert_eq!(events, vec![StreamEvent::Scrobbled(scrobbled("A", "400"))]);
    }

    #[test]
    fn test_empty_history() {
        let mut tracker = PlaybackTracker::new();
        assert!(tracker.observe(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_stream_starts_paused_and_toggles() {
        let config = crate::config::LastFmConfig {
            api_key: "key".to_string(),
            secret: "secret".to_string(),
            user_agent: "scrobbleprint/test".to_string(),
            username: "someone".to_string(),
            poll_interval: Duration::from_secs(3600),
        };
        let client = LastFmClient::new(&config).unwrap();
        let mut stream = LastFmStream::spawn(client, config.username.clone(), config.poll_interval);

        assert!(!stream.is_running());
        stream.start();
        assert!(stream.is_running());
        stream.stop();
        assert!(!stream.is_running());
    }
}
