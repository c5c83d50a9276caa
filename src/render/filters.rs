//! Whole-image transforms used by the artwork pipeline.
//!
//! All operate on 8-bit grayscale. Colours are plain luma: 0 = black,
//! 255 = white.

use image::{DynamicImage, GrayImage, Luma, imageops};

pub const BLACK: Luma<u8> = Luma([0]);
pub const WHITE: Luma<u8> = Luma([255]);

/// Unsharp mask on the colour source, before it loses its tones.
pub fn sharpen(image: &DynamicImage, sigma: f32) -> DynamicImage {
    image.unsharpen(sigma, 0)
}

/// Collapse to a single luma channel.
pub fn monochrome(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Surround the image with a solid border `width` pixels thick.
pub fn border(image: &GrayImage, width: u32, color: Luma<u8>) -> GrayImage {
    let mut framed = GrayImage::from_pixel(
        image.width() + 2 * width,
        image.height() + 2 * width,
        color,
    );
    imageops::replace(&mut framed, image, width as i64, width as i64);
    framed
}

/// Center the image on a `width`×`height` canvas filled with `background`.
///
/// Larger images are cropped around their center.
pub fn extent(image: &GrayImage, width: u32, height: u32, background: Luma<u8>) -> GrayImage {
    let mut canvas = GrayImage::from_pixel(width, height, background);
    let x = (width as i64 - image.width() as i64) / 2;
    let y = (height as i64 - image.height() as i64) / 2;
    imageops::replace(&mut canvas, image, x, y);
    canvas
}

/// Rotate clockwise by a multiple of 90 degrees.
///
/// Degrees are normalized first, so `-90` equals `270`. Other angles are
/// rounded down to the previous quarter turn.
pub fn rotate(image: &GrayImage, degrees: i32) -> GrayImage {
    match degrees.rem_euclid(360) / 90 {
        1 => imageops::rotate90(image),
        2 => imageops::rotate180(image),
        3 => imageops::rotate270(image),
        _ => image.clone(),
    }
}
