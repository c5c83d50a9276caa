//! # Error Types
//!
//! This module defines error types used throughout the scrobbleprint crate.
//!
//! Only configuration errors (and failures while opening the printer or
//! loading fonts at startup) are fatal. Everything that can go wrong inside a
//! print cycle is caught by the orchestrator, logged, and followed by a
//! poller resume.

use thiserror::Error;

/// Main error type for scrobbleprint operations
#[derive(Debug, Error)]
pub enum ScrobblePrintError {
    /// One or more required environment settings are unset or empty
    #[error("Missing environment variables: {}", .0.join(", "))]
    ConfigurationMissing(Vec<&'static str>),

    /// A setting is present but cannot be used
    #[error("Invalid value {value:?} for {key}: {reason}")]
    ConfigurationInvalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    /// Last.fm request failed or returned an error body
    #[error("Poller transport error: {0}")]
    PollerTransport(String),

    /// The now-playing track carries no usable cover art
    #[error("No album art")]
    NoArtwork,

    /// Artwork download, transform, or write failed
    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    /// Printer rejected the job or is not ready
    #[error("Print error: {0}")]
    Print(String),

    /// Serial transport errors (open, configure, write)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ScrobblePrintError>;
