//! # Rendering Module
//!
//! Turns album art into a bitmap the thermal printer can burn.
//!
//! ## Modules
//!
//! - [`dither`]: Floyd-Steinberg dithering, row packing
//! - [`filters`]: sharpen, monochrome, border, extent, rotate
//! - [`text`]: TTF overlays and the title/date formatting rules
//! - [`pipeline`]: the full download → transform → write sequence
//!
//! ## Usage Example
//!
//! ```
//! use image::{GrayImage, Luma};
//! use scrobbleprint::render::{dither, filters};
//!
//! let gray = GrayImage::from_fn(300, 300, |x, _| Luma([(x % 256) as u8]));
//! let dots = dither::dither_image(&gray);
//! let canvas = filters::extent(&filters::border(&dots, 1, filters::BLACK), 384, 384, filters::WHITE);
//! assert_eq!(canvas.dimensions(), (384, 384));
//! ```

pub mod dither;
pub mod filters;
pub mod pipeline;
pub mod text;

pub use pipeline::{ArtworkPipeline, ArtworkRenderer};
