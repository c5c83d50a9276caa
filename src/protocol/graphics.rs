//! # Bitmap Graphics (DC2 *)
//!
//! ## Protocol Details
//!
//! | Format  | Bytes |
//! |---------|-------|
//! | ASCII   | DC2 * r n d1...dk |
//! | Hex     | 12 2A r n d1...dk |
//!
//! - `r`: rows in this command (1-255)
//! - `n`: bytes per row (1-48 for a 384-dot head)
//! - `k = r × n`
//!
//! ## Bit Packing
//!
//! - Bit 7 (MSB) = leftmost dot
//! - 1 = black (print), 0 = white
//!
//! ```text
//! 0xF0 = 11110000 = ████░░░░
//! ```
//!
//! Taller images are split into several commands of at most
//! [`MAX_CHUNK_ROWS`] rows.

use super::commands::DC2;

/// Largest row count a single `DC2 *` can carry.
pub const MAX_CHUNK_ROWS: usize = 255;

/// One `DC2 *` bitmap command.
///
/// ```
/// use scrobbleprint::protocol::graphics;
///
/// let data = vec![0xFF; 48 * 2];
/// let cmd = graphics::bitmap(48, 2, &data);
/// assert_eq!(&cmd[0..4], &[0x12, 0x2A, 2, 48]);
/// assert_eq!(cmd.len(), 4 + 96);
/// ```
pub fn bitmap(width_bytes: u8, rows: u8, data: &[u8]) -> Vec<u8> {
    debug_assert!(
        data.len() == width_bytes as usize * rows as usize,
        "Bitmap data length mismatch. Expected {} ({} bytes × {} rows), got {}",
        width_bytes as usize * rows as usize,
        width_bytes,
        rows,
        data.len()
    );

    let mut cmd = Vec::with_capacity(4 + data.len());
    cmd.push(DC2);
    cmd.push(b'*');
    cmd.push(rows);
    cmd.push(width_bytes);
    cmd.extend_from_slice(data);
    cmd
}

/// Split packed raster data into `DC2 *` commands.
///
/// `data` holds `height` rows of `width_bytes` each.
pub fn bitmap_chunks(width_bytes: u8, height: usize, data: &[u8]) -> Vec<Vec<u8>> {
    let row_len = width_bytes as usize;
    debug_assert_eq!(data.len(), row_len * height);

    if row_len == 0 {
        return Vec::new();
    }

    data.chunks(row_len * MAX_CHUNK_ROWS)
        .map(|chunk| bitmap(width_bytes, (chunk.len() / row_len) as u8, chunk))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
