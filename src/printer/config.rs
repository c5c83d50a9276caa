//! # Printer Configuration
//!
//! Hardware specifications and driver tuning for the serial thermal printer.
//!
//! | Model | Width (dots) | Resolution | Paper |
//! |-------|--------------|------------|-------|
//! | CSN-A2 | 384 | 203 DPI | 58mm |
//!
//! ```
//! use scrobbleprint::printer::PrinterConfig;
//!
//! let config = PrinterConfig::CSN_A2;
//! assert_eq!(config.width_bytes, 48);
//! ```

use std::time::Duration;

/// Printable width of the head in dots. Artwork is rendered on a square
/// canvas of this size.
pub const PRINT_WIDTH: u32 = 384;

/// Blank lines fed after every print so the image clears the tear bar.
pub const FEED_LINES: u8 = 2;

/// # Printer Configuration
///
/// The head burns `width_dots` dots per line; one bitmap row is
/// `width_bytes` bytes, MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: &'static str,

    /// Maximum print width in dots (pixels)
    pub width_dots: u16,

    /// Print width in bytes (width_dots / 8)
    pub width_bytes: u8,

    /// Resolution in dots per inch
    pub dpi: u16,
}

impl PrinterConfig {
    /// # CSN-A2 Configuration
    ///
    /// The 58mm TTL/RS-232 panel printer commonly sold for hobby projects.
    pub const CSN_A2: Self = Self {
        name: "CSN-A2",
        width_dots: PRINT_WIDTH as u16,
        width_bytes: (PRINT_WIDTH / 8) as u8,
        dpi: 203,
    };
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::CSN_A2
    }
}

/// Print-head heating parameters, sent once when the printer is opened.
///
/// - **max_printing_dots**: dots heated at once = 8 × (n + 1). More is
///   faster and draws more peak current.
/// - **heating_time** (10µs units): more is darker and slower. Too short
///   prints blank.
/// - **heating_interval** (10µs units): more is clearer and slower.
/// - **command_delay**: pause after every command so the printer's small
///   buffer keeps up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatConfig {
    pub max_printing_dots: u8,
    pub heating_time: u8,
    pub heating_interval: u8,
    pub command_delay: Duration,
}

impl HeatConfig {
    /// Dense, slow settings tuned for dithered album art.
    pub const ALBUM_ART: Self = Self {
        max_printing_dots: 10,
        heating_time: 150,
        heating_interval: 120,
        command_delay: Duration::from_millis(2),
    };
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self::ALBUM_ART
    }
}
