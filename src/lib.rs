//! # Scrobbleprint - Now-Playing Album Art on a Thermal Printer
//!
//! Scrobbleprint follows a Last.fm account and prints the cover of every
//! newly playing track on a 58mm serial thermal printer. It provides:
//!
//! - **Now-playing stream**: pausable `user.getrecenttracks` poller
//! - **Artwork pipeline**: sharpen, dither, frame and caption the cover
//! - **Protocol implementation**: ESC/POS-style command builders
//! - **Transport**: raw-mode serial TTY
//!
//! ## Quick Start
//!
//! ```no_run
//! use scrobbleprint::{
//!     printer::{HeatConfig, PrintDispatch, PrinterConfig, ThermalPrinter},
//!     transport::SerialTransport,
//! };
//!
//! # async fn demo() -> scrobbleprint::Result<()> {
//! let transport = SerialTransport::open("/dev/ttyUSB0", 19200)?;
//! let mut printer =
//!     ThermalPrinter::open(transport, PrinterConfig::CSN_A2, HeatConfig::ALBUM_ART).await?;
//!
//! printer.print_image(std::path::Path::new("images/cover.png")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Environment configuration |
//! | [`lastfm`] | Last.fm client and now-playing stream |
//! | [`track`] | Track validation |
//! | [`render`] | Artwork download, dithering and text overlays |
//! | [`protocol`] | Printer command builders |
//! | [`printer`] | Printer configuration and print session |
//! | [`transport`] | Communication backends |
//! | [`orchestrator`] | The stop, render, print, resume cycle |
//! | [`error`] | Error types |
//!
//! ## Supported Printers
//!
//! Currently tested with:
//! - CSN-A2 (58mm paper, 384 dots, 203 DPI, TTL serial)

pub mod config;
pub mod error;
pub mod lastfm;
pub mod orchestrator;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod track;
pub mod transport;

// Re-exports for convenience
pub use config::Config;
pub use error::{Result, ScrobblePrintError};
pub use orchestrator::{CycleOutcome, Orchestrator};
pub use printer::{PrinterConfig, ThermalPrinter};
pub use track::Track;
#[cfg(unix)]
pub use transport::SerialTransport;
