//! # Orchestrator
//!
//! Wires the now-playing stream to the artwork pipeline and the printer.
//!
//! ## Cycle
//!
//! ```text
//! NowPlaying ─► stop stream ─► validate ─► render ─► print ─► start stream
//!                                  │           │         │
//!                                  └───────────┴─────────┴──► (log) start stream
//! ```
//!
//! Events are handled one at a time, and the stream is paused for the whole
//! cycle, so a track change mid-print is never seen. Every exit path resumes
//! the stream exactly once.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::error::ScrobblePrintError;
use crate::lastfm::{NowPlayingSource, RawTrackEvent, StreamEvent};
use crate::printer::PrintDispatch;
use crate::render::ArtworkRenderer;
use crate::track::Track;

/// How a now-playing cycle ended.
#[derive(Debug)]
pub enum CycleOutcome {
    /// The artwork was rendered to `path` and printed.
    Printed { track: Track, path: PathBuf },
    /// The event failed validation (no artwork).
    Rejected(ScrobblePrintError),
    /// Download, decode, transform or save failed.
    RenderFailed(ScrobblePrintError),
    /// The printer reported an error.
    PrintFailed(ScrobblePrintError),
}

pub struct Orchestrator<S, R, P> {
    source: S,
    renderer: R,
    printer: P,
}

impl<S, R, P> Orchestrator<S, R, P>
where
    S: NowPlayingSource,
    R: ArtworkRenderer,
    P: PrintDispatch,
{
    pub fn new(source: S, renderer: R, printer: P) -> Self {
        Self {
            source,
            renderer,
            printer,
        }
    }

    /// Start the stream and process events until it shuts down.
    pub async fn run(&mut self) {
        self.source.start();
        info!("Listening for now playing tracks");

        while let Some(event) = self.source.next_event().await {
            self.handle_event(event).await;
        }

        warn!("Now playing stream closed");
    }

    /// Dispatch a single stream event.
    pub async fn handle_event(&mut self, event: StreamEvent) -> Option<CycleOutcome> {
        match event {
            StreamEvent::NowPlaying(raw) => Some(self.run_cycle(raw).await),
            StreamEvent::LastPlayed(raw) => {
                info!(name = %raw.name, artist = %raw.artist.as_str(), "Last played");
                None
            }
            StreamEvent::Scrobbled(raw) => {
                info!(name = %raw.name, artist = %raw.artist.as_str(), "Scrobbled");
                None
            }
            StreamEvent::StoppedPlaying(raw) => {
                info!(name = %raw.name, artist = %raw.artist.as_str(), "Stopped playing");
                None
            }
            StreamEvent::Error(message) => {
                error!(error = %message, "Now playing stream error");
                None
            }
        }
    }

    /// Pause the stream, process one track and resume.
    pub async fn run_cycle(&mut self, raw: RawTrackEvent) -> CycleOutcome {
        self.source.stop();
        info!("Paused track stream");
        let outcome = self.process(&raw).await;

        match &outcome {
            CycleOutcome::Printed { track, path } => {
                info!(name = %track.name, path = %path.display(), "Cycle complete")
            }
            CycleOutcome::Rejected(e) => {
                warn!(name = %raw.name, error = %e, "Skipping track")
            }
            CycleOutcome::RenderFailed(e) | CycleOutcome::PrintFailed(e) => {
                error!(name = %raw.name, error = %e, "Cycle failed")
            }
        }

        self.source.start();
        info!("Resumed track stream");
        outcome
    }

    async fn process(&mut self, raw: &RawTrackEvent) -> CycleOutcome {
        let track = match Track::from_event(raw) {
            Ok(track) => track,
            Err(e) => return CycleOutcome::Rejected(e),
        };

        let path = match self.renderer.render(&track).await {
            Ok(path) => path,
            Err(e) => return CycleOutcome::RenderFailed(e),
        };

        match self.printer.print_image(&path).await {
            Ok(()) => CycleOutcome::Printed { track, path },
            Err(e) => CycleOutcome::PrintFailed(e),
        }
    }
}
