//! # Dithering
//!
//! Converts continuous-tone (grayscale) images to binary (black/white) output
//! suitable for a thermal print head.
//!
//! ## Intensity Convention
//!
//! Internally every routine works on *intensity*: 0.0 = white (paper),
//! 1.0 = black (burn a dot). Luma images are converted with
//! `intensity = 1 - luma / 255`.
//!
//! ## Floyd-Steinberg Kernel
//!
//! ```text
//!            X    7/16
//!   3/16   5/16   1/16
//! ```
//!
//! Album art always goes through Floyd-Steinberg.

use image::{GrayImage, Luma};

const FLOYD_STEINBERG: &[(isize, isize, f32)] = &[
    (1, 0, 7.0 / 16.0),
    (-1, 1, 3.0 / 16.0),
    (0, 1, 5.0 / 16.0),
    (1, 1, 1.0 / 16.0),
];

/// Convert a luma value (0 = black, 255 = white) to intensity.
#[inline]
pub fn luma_to_intensity(luma: u8) -> f32 {
    1.0 - (luma as f32 / 255.0)
}

/// Floyd-Steinberg over an intensity buffer (row-major, `width * height`).
///
/// Thresholds at 0.5 and pushes the error to the unvisited neighbours.
/// Returns one `bool` per pixel, `true` = black.
pub fn floyd_steinberg(width: usize, height: usize, intensity: &[f32]) -> Vec<bool> {
    debug_assert_eq!(intensity.len(), width * height);

    let mut buffer = intensity.to_vec();
    let mut dots = vec![false; width * height];

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let old = buffer[idx];
            let black = old >= 0.5;
            dots[idx] = black;

            let error = old - if black { 1.0 } else { 0.0 };
            for &(dx, dy, weight) in FLOYD_STEINBERG {
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                if nx >= 0 && (nx as usize) < width && (ny as usize) < height {
                    buffer[ny as usize * width + nx as usize] += error * weight;
                }
            }
        }
    }

    dots
}

/// Dither a grayscale image to a pure black/white grayscale image.
///
/// Output pixels are exactly 0 or 255, so later stages (borders, text,
/// rotation) keep the image 1-bit.
pub fn dither_image(image: &GrayImage) -> GrayImage {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let intensity: Vec<f32> = image.pixels().map(|p| luma_to_intensity(p[0])).collect();
    let dots = floyd_steinberg(width, height, &intensity);

    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if dots[y as usize * width + x as usize] {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

/// Pack a row of boolean pixel values into bytes.
///
/// - Bit 7 (MSB) = leftmost pixel
/// - 1 = black (print dot), 0 = white
/// - A partial last byte is padded with white on the right
///
/// ```
/// use scrobbleprint::render::dither::pack_row;
///
/// let row = vec![true, true, true, true, false, false, false, false];
/// assert_eq!(pack_row(&row), vec![0xF0]);
///
/// let row = vec![true; 12];
/// assert_eq!(pack_row(&row), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let num_bytes = pixels.len().div_ceil(8);
    let mut bytes = vec![0u8; num_bytes];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            let byte_idx = i / 8;
            let bit_idx = 7 - (i % 8); // MSB first
            bytes[byte_idx] |= 1 << bit_idx;
        }
    }

    bytes
}

// ============================================================================
// TESTS
// ============================================================================
