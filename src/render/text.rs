//! TTF text overlays for the artwork canvas.
//!
//! Renders text to an anti-aliased f32 coverage buffer using ab_glyph, then
//! stamps it onto the 1-bit canvas with a 50% coverage cut so the canvas
//! stays pure black/white.

use std::path::Path;

use ab_glyph::{Font, FontArc, ScaleFont};
use chrono::{DateTime, Utc};
use image::GrayImage;

use super::filters::BLACK;
use crate::error::{Result, ScrobblePrintError};

/// Overlay text longer than this is truncated.
pub const TEXT_MAX_LENGTH: usize = 22;

/// Glyph appended to truncated text.
pub const ELLIPSIS: char = '…';

/// Gap between the date and the time in the timestamp overlay.
const DATE_TIME_GAP: usize = 36;

pub const BOLD_FONT_FILE: &str = "dejavu-sans-bold.ttf";
pub const BOLD_ITALIC_FONT_FILE: &str = "dejavu-sans-bold-oblique.ttf";
pub const CONDENSED_FONT_FILE: &str = "dejavu-sans-condensed-bold.ttf";

/// The three faces used by the overlays.
#[derive(Clone)]
pub struct FontSet {
    /// Track title
    pub bold: FontArc,
    /// Artist and album
    pub bold_italic: FontArc,
    /// Timestamp
    pub condensed: FontArc,
}

impl FontSet {
    /// Load the three font files from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        Ok(Self {
            bold: load_font(&dir.join(BOLD_FONT_FILE))?,
            bold_italic: load_font(&dir.join(BOLD_ITALIC_FONT_FILE))?,
            condensed: load_font(&dir.join(CONDENSED_FONT_FILE))?,
        })
    }
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet").finish_non_exhaustive()
    }
}

fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path).map_err(|e| {
        ScrobblePrintError::ImageProcessing(format!("Failed to read font {}: {}", path.display(), e))
    })?;
    FontArc::try_from_vec(bytes).map_err(|e| {
        ScrobblePrintError::ImageProcessing(format!("Invalid font {}: {}", path.display(), e))
    })
}

/// Uppercase and clamp to [`TEXT_MAX_LENGTH`] characters.
///
/// ```
/// use scrobbleprint::render::text::process_text;
///
/// assert_eq!(process_text("Song"), "SONG");
/// assert_eq!(
///     process_text("a very extremely long song title indeed"),
///     "A VERY EXTREMELY LONG…"
/// );
/// ```
pub fn process_text(text: &str) -> String {
    let upper = text.to_uppercase();
    if upper.chars().count() <= TEXT_MAX_LENGTH {
        return upper;
    }

    let mut clipped: String = upper.chars().take(TEXT_MAX_LENGTH - 1).collect();
    clipped.push(ELLIPSIS);
    clipped
}

/// UTC timestamp as `YYYY-MM-DD`, a wide gap, then `HH:MM`.
///
/// The gap pushes the time to the far side of the print.
pub fn nice_date(now: DateTime<Utc>) -> String {
    format!(
        "{}{}{}",
        now.format("%Y-%m-%d"),
        " ".repeat(DATE_TIME_GAP),
        now.format("%H:%M")
    )
}

/// Rendered TTF text as an anti-aliased coverage buffer.
pub struct TtfRender {
    pub width: usize,
    pub height: usize,
    /// Coverage values: 0.0 = empty, 1.0 = fully inked.
    pub data: Vec<f32>,
}

/// Render a single line of text at `pixel_height`.
pub fn render_ttf_text(text: &str, font: &FontArc, pixel_height: f32) -> TtfRender {
    let scaled = font.as_scaled(pixel_height);

    let mut glyphs = Vec::new();
    let mut caret_x = 0.0f32;
    let mut previous = None;

    for ch in text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = previous {
            caret_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, caret_x));
        caret_x += scaled.h_advance(glyph_id);
        previous = Some(glyph_id);
    }

    let width = (caret_x.ceil() as usize).max(1);
    let ascent = scaled.ascent();
    let descent = scaled.descent();
    let height = ((ascent - descent).ceil() as usize).max(1);

    let mut data = vec![0.0f32; width * height];

    for &(glyph_id, glyph_x) in &glyphs {
        let glyph = glyph_id.with_scale_and_position(pixel_height, ab_glyph::point(glyph_x, ascent));

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;

                if x >= 0 && x < width as i32 && y >= 0 && y < height as i32 {
                    let idx = y as usize * width + x as usize;
                    data[idx] = (data[idx] + coverage).min(1.0);
                }
            });
        }
    }

    TtfRender {
        width,
        height,
        data,
    }
}

/// Where a text line is anchored on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gravity {
    /// Horizontally centered, `offset` pixels below the top edge
    North,
    /// Horizontally centered, `offset` pixels above the bottom edge
    South,
}

/// Top-left position of a `width`×`height` box anchored on the canvas.
pub fn anchor(
    canvas: (u32, u32),
    text: (usize, usize),
    gravity: Gravity,
    offset: u32,
) -> (i64, i64) {
    let (canvas_w, canvas_h) = (canvas.0 as i64, canvas.1 as i64);
    let (text_w, text_h) = (text.0 as i64, text.1 as i64);

    let x = (canvas_w - text_w) / 2;
    let y = match gravity {
        Gravity::North => offset as i64,
        Gravity::South => canvas_h - offset as i64 - text_h,
    };
    (x, y)
}

/// Stamp a rendered line onto the canvas in black.
pub fn stamp(canvas: &mut GrayImage, render: &TtfRender, origin: (i64, i64)) {
    let (canvas_w, canvas_h) = (canvas.width() as i64, canvas.height() as i64);

    for ty in 0..render.height {
        for tx in 0..render.width {
            if render.data[ty * render.width + tx] < 0.5 {
                continue;
            }
            let x = origin.0 + tx as i64;
            let y = origin.1 + ty as i64;
            if x >= 0 && x < canvas_w && y >= 0 && y < canvas_h {
                canvas.put_pixel(x as u32, y as u32, BLACK);
            }
        }
    }
}

/// Render `text` and stamp it on the canvas at `gravity`.
pub fn draw_text(
    canvas: &mut GrayImage,
    text: &str,
    font: &FontArc,
    pixel_height: f32,
    gravity: Gravity,
    offset: u32,
) {
    let render = render_ttf_text(text, font, pixel_height);
    let origin = anchor(
        canvas.dimensions(),
        (render.width, render.height),
        gravity,
        offset,
    );
    stamp(canvas, &render, origin);
}
