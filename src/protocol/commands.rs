//! # Thermal Printer Commands
//!
//! Command builders for the common 58mm serial thermal printer mechanism
//! (CSN-A2 and compatibles, 384 dots per line) that speaks a small ESC/POS
//! dialect.
//!
//! ## Escape Sequence Structure
//!
//! - Single byte: `LF`
//! - Two bytes: `ESC @`
//! - With parameters: `ESC d n`, `ESC 7 n1 n2 n3`, `DC2 * r n data...`
//!
//! Every builder returns one self-contained command as `Vec<u8>`; the printer
//! session paces them individually.

// ============================================================================
// ESCAPE SEQUENCE CONSTANTS
// ============================================================================

/// ESC (Escape) - Command prefix byte
pub const ESC: u8 = 0x1B;

/// DC2 (Device Control 2) - Vendor command prefix, used for bitmaps
pub const DC2: u8 = 0x12;

/// LF (Line Feed) - Print the line buffer and advance one line
pub const LF: u8 = 0x0A;

// ============================================================================
// INITIALIZATION COMMANDS
// ============================================================================

/// # Initialize Printer (ESC @)
///
/// Clears the print buffer and resets formatting to power-on defaults.
///
/// | Format  | Bytes |
/// |---------|-------|
/// | Hex     | 1B 40 |
///
/// ```
/// use scrobbleprint::protocol::commands;
///
/// assert_eq!(commands::init(), vec![0x1B, 0x40]);
/// ```
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Set Heating Parameters (ESC 7 n1 n2 n3)
///
/// | Param | Range | Unit | Effect |
/// |-------|-------|------|--------|
/// | `n1` max printing dots | 0-255 | 8 dots | Heated at once = 8 × (n1 + 1). More is faster but draws more peak current |
/// | `n2` heating time | 3-255 | 10µs | Longer is darker but slower; too short prints blank |
/// | `n3` heating interval | 0-255 | 10µs | Longer is clearer but slower |
///
/// ```
/// use scrobbleprint::protocol::commands;
///
/// assert_eq!(commands::heating_params(10, 150, 120), vec![0x1B, b'7', 10, 150, 120]);
/// ```
#[inline]
pub fn heating_params(max_printing_dots: u8, heating_time: u8, heating_interval: u8) -> Vec<u8> {
    vec![ESC, b'7', max_printing_dots, heating_time, heating_interval]
}

// ============================================================================
// PAPER FEED COMMANDS
// ============================================================================

/// # Line Feed (LF)
#[inline]
pub fn line_feed() -> Vec<u8> {
    vec![LF]
}

/// # Print and Feed n Lines (ESC d n)
///
/// Prints the buffer and advances `n` text lines. `n = 0` degrades to a
/// single `LF`, matching how the printer treats an empty feed.
///
/// ```
/// use scrobbleprint::protocol::commands;
///
/// assert_eq!(commands::feed_lines(2), vec![0x1B, b'd', 2]);
/// assert_eq!(commands::feed_lines(0), vec![0x0A]);
/// ```
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    if n == 0 {
        line_feed()
    } else {
        vec![ESC, b'd', n]
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_heating_params_bytes() {
        let cmd = heating_params(7, 80, 2);
        assert_eq!(cmd, vec![27, 55, 7, 80, 2]);
    }

    #[test]
    fn test_feed_lines() {
        assert_eq!(feed_lines(1), vec![27, 100, 1]);
        assert_eq!(feed_lines(255), vec![27, 100, 255]);
        assert_eq!(feed_lines(0), vec![10]);
    }
}
