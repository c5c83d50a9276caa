//! # Artwork Pipeline
//!
//! Turns a [`Track`] into a printer-width 1-bit PNG on disk.
//!
//! ## Stages
//!
//! ```text
//! download ─► sharpen ─► monochrome ─► dither ─► border ─► extent 384×384
//!     ─► title (N) ─► rot +90 ─► artist (N) ─► rot -180 ─► album (N) ─► rot +90
//!     ─► date (S) ─► rot PRINTER_ROTATION ─► images/<stem>.png
//! ```
//!
//! Each title/artist/album line is drawn at the top edge and the whole canvas
//! is turned between draws, so the lines end up on three different sides:
//!
//! ```text
//!          ┌──── TITLE ────┐
//!          │               │
//!   TSITRA │    artwork    │ ALBUM
//!          │               │
//!          └─ 2024-03-09  07:05 ─┘
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::{DynamicImage, GrayImage, ImageFormat};
use tracing::{debug, info};

use super::dither;
use super::filters::{self, BLACK, WHITE};
use super::text::{self, FontSet, Gravity};
use crate::error::{Result, ScrobblePrintError};
use crate::printer::PRINT_WIDTH;
use crate::track::Track;

/// Overlay text height in pixels.
pub const FONT_SIZE: f32 = 16.0;

/// Distance of the overlay lines from their canvas edge.
const TEXT_OFFSET: u32 = 16;

/// Unsharp-mask sigma applied to the downloaded cover.
const SHARPEN_SIGMA: f32 = 5.0;

const BORDER_WIDTH: u32 = 1;

/// Produces a printable bitmap for a track.
#[async_trait]
pub trait ArtworkRenderer: Send + Sync {
    /// Render the track and return the path of the written bitmap.
    async fn render(&self, track: &Track) -> Result<PathBuf>;
}

/// Everything the pure transform sequence needs besides the pixels.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub date: String,
}

impl Overlay {
    /// Overlay lines for a track printed at `now`.
    pub fn for_track(track: &Track, now: DateTime<Utc>) -> Self {
        Self {
            title: text::process_text(&track.name),
            artist: text::process_text(&track.artist),
            album: text::process_text(&track.album),
            date: text::nice_date(now),
        }
    }
}

/// Run the transform sequence on a decoded cover.
///
/// Output is `PRINT_WIDTH`×`PRINT_WIDTH`, pixels strictly 0 or 255.
pub fn compose(source: &DynamicImage, overlay: &Overlay, fonts: &FontSet, rotation: u16) -> GrayImage {
    let sharpened = filters::sharpen(source, SHARPEN_SIGMA);
    let gray = filters::monochrome(&sharpened);
    let dithered = dither::dither_image(&gray);
    let framed = filters::border(&dithered, BORDER_WIDTH, BLACK);
    let mut canvas = filters::extent(&framed, PRINT_WIDTH, PRINT_WIDTH, WHITE);

    text::draw_text(&mut canvas, &overlay.title, &fonts.bold, FONT_SIZE, Gravity::North, TEXT_OFFSET);
    canvas = filters::rotate(&canvas, 90);

    text::draw_text(&mut canvas, &overlay.artist, &fonts.bold_italic, FONT_SIZE, Gravity::North, TEXT_OFFSET);
    canvas = filters::rotate(&canvas, -180);

    text::draw_text(&mut canvas, &overlay.album, &fonts.bold_italic, FONT_SIZE, Gravity::North, TEXT_OFFSET);
    canvas = filters::rotate(&canvas, 90);

    text::draw_text(&mut canvas, &overlay.date, &fonts.condensed, FONT_SIZE, Gravity::South, TEXT_OFFSET);

    filters::rotate(&canvas, rotation as i32)
}

/// File name for the rendered bitmap, derived from the artwork URL.
///
/// The last path segment keeps its stem and gets a `.png` extension, so
/// `https://lastfm.freetls.fastly.net/i/u/300x300/abc123.jpg` becomes
/// `abc123.png`. Query strings and fragments are ignored.
pub fn output_file_name(image_url: &str) -> String {
    let path = reqwest::Url::parse(image_url)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| {
            image_url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string()
        });

    let segment = path.rsplit('/').next().unwrap_or_default();
    let stem = Path::new(segment)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("artwork");

    format!("{}.png", stem)
}

/// Downloads artwork over HTTP and renders it with the configured fonts.
pub struct ArtworkPipeline {
    http: reqwest::Client,
    fonts: FontSet,
    images_dir: PathBuf,
    rotation: u16,
}

impl ArtworkPipeline {
    /// Build the pipeline, loading fonts from `fonts_dir` and creating
    /// `images_dir` if needed.
    pub fn new(
        http: reqwest::Client,
        fonts_dir: &Path,
        images_dir: impl Into<PathBuf>,
        rotation: u16,
    ) -> Result<Self> {
        let fonts = FontSet::load(fonts_dir)?;
        let images_dir = images_dir.into();
        std::fs::create_dir_all(&images_dir)?;

        Ok(Self {
            http,
            fonts,
            images_dir,
            rotation,
        })
    }

    async fn download(&self, url: &str) -> Result<DynamicImage> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ScrobblePrintError::ImageProcessing(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(ScrobblePrintError::ImageProcessing(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScrobblePrintError::ImageProcessing(format!("Failed to read image data: {}", e)))?;

        image::load_from_memory(&bytes)
            .map_err(|e| ScrobblePrintError::ImageProcessing(format!("Failed to decode image: {}", e)))
    }
}

#[async_trait]
impl ArtworkRenderer for ArtworkPipeline {
    async fn render(&self, track: &Track) -> Result<PathBuf> {
        info!("Dithering album art");

        let source = self.download(&track.image_url).await?;
        debug!(width = source.width(), height = source.height(), "Artwork downloaded");

        let overlay = Overlay::for_track(track, Utc::now());
        let fonts = self.fonts.clone();
        let rotation = self.rotation;

        // Transforms are CPU-bound; keep them off the async workers
        let png = tokio::task::spawn_blocking(move || {
            let bitmap = compose(&source, &overlay, &fonts, rotation);
            encode_png(&bitmap)
        })
        .await
        .map_err(|e| ScrobblePrintError::ImageProcessing(format!("Render task failed: {}", e)))??;

        let path = self.images_dir.join(output_file_name(&track.image_url));
        write_atomically(&path, &png).await?;
        Ok(path)
    }
}

/// Encode a grayscale bitmap as PNG bytes.
pub fn encode_png(bitmap: &GrayImage) -> Result<Vec<u8>> {
    let mut png = Vec::new();
    DynamicImage::ImageLuma8(bitmap.clone())
        .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ScrobblePrintError::ImageProcessing(format!("Failed to encode PNG: {}", e)))?;
    Ok(png)
}

/// Write through a temporary sibling and rename, so the final path only
/// ever holds a complete file.
pub async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".part");
    let tmp = PathBuf::from(tmp);

    let written = async {
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(ScrobblePrintError::ImageProcessing(format!(
            "Failed to write {}: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Inner edge of the 1px frame around a 300px cover on the 384px canvas.
    const FRAME_MIN: u32 = 41;
    const FRAME_MAX: u32 = 342;

    fn fonts_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fonts")
    }

    fn fonts() -> FontSet {
        FontSet::load(&fonts_dir()).unwrap()
    }

    fn blank_cover() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 300, Rgb([255, 255, 255])))
    }

    fn overlay(title: &str, artist: &str, album: &str, date: &str) -> Overlay {
        Overlay {
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            date: date.to_string(),
        }
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct Margins {
        top: usize,
        left: usize,
        right: usize,
        bottom: usize,
    }

    /// Count black pixels in the four strips outside the cover frame.
    fn ink_outside_frame(canvas: &GrayImage) -> Margins {
        let mut margins = Margins::default();
        for (x, y, pixel) in canvas.enumerate_pixels() {
            if pixel[0] != 0 {
                continue;
            }
            if y < FRAME_MIN {
                margins.top += 1;
            } else if y > FRAME_MAX {
                margins.bottom += 1;
            } else if x < FRAME_MIN {
                margins.left += 1;
            } else if x > FRAME_MAX {
                margins.right += 1;
            }
        }
        margins
    }

    #[test]
    fn test_compose_blank_cover_is_framed_binary_square() {
        let canvas = compose(&blank_cover(), &overlay("", "", "", ""), &fonts(), 0);

        assert_eq!(canvas.dimensions(), (PRINT_WIDTH, PRINT_WIDTH));
        assert!(canvas.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(ink_outside_frame(&canvas), Margins::default());

        for (x, y) in [(FRAME_MIN, FRAME_MIN), (FRAME_MAX, FRAME_MAX), (192, FRAME_MIN), (FRAME_MIN, 192)] {
            assert_eq!(canvas.get_pixel(x, y)[0], 0, "frame missing at ({}, {})", x, y);
        }
        assert_eq!(canvas.get_pixel(192, 192)[0], 255);
    }

    #[test]
    fn test_compose_places_each_line_on_its_own_side() {
        let fonts = fonts();
        let cover = blank_cover();

        let title = ink_outside_frame(&compose(&cover, &overlay("XTAL", "", "", ""), &fonts, 0));
        assert!(title.top > 0);
        assert_eq!((title.left, title.right, title.bottom), (0, 0, 0));

        let artist = ink_outside_frame(&compose(&cover, &overlay("", "APHEX TWIN", "", ""), &fonts, 0));
        assert!(artist.left > 0);
        assert_eq!((artist.top, artist.right, artist.bottom), (0, 0, 0));

        let album = ink_outside_frame(&compose(&cover, &overlay("", "", "SAW 85-92", ""), &fonts, 0));
        assert!(album.right > 0);
        assert_eq!((album.top, album.left, album.bottom), (0, 0, 0));

        let now = DateTime::parse_from_rfc3339("2024-03-09T07:05:42Z")
            .unwrap()
            .with_timezone(&Utc);
        let date = ink_outside_frame(&compose(&cover, &overlay("", "", "", &text::nice_date(now)), &fonts, 0));
        assert!(date.bottom > 0);
        assert_eq!((date.top, date.left, date.right), (0, 0, 0));
    }

    #[test]
    fn test_compose_applies_final_rotation() {
        let fonts = fonts();
        let cover = blank_cover();
        let upright = ink_outside_frame(&compose(&cover, &overlay("XTAL", "", "", ""), &fonts, 0));

        let quarter = ink_outside_frame(&compose(&cover, &overlay("XTAL", "", "", ""), &fonts, 90));
        assert_eq!(quarter.top, 0);
        assert_eq!(quarter.right, upright.top);

        let half = ink_outside_frame(&compose(&cover, &overlay("XTAL", "", "", ""), &fonts, 180));
        assert_eq!(half.top, 0);
        assert_eq!(half.bottom, upright.top);
    }

    /// Serve `body` once with `status`, returning the URL of `path`.
    async fn serve_once(status: &'static str, body: Vec<u8>, path: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
        });

        format!("http://{}{}", addr, path)
    }

    fn local_http() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    fn track(image_url: String) -> Track {
        Track {
            name: "Xtal".to_string(),
            artist: "Aphex Twin".to_string(),
            album: "Selected Ambient Works 85-92".to_string(),
            image_url,
        }
    }

    #[tokio::test]
    async fn test_render_downloads_and_writes_one_bitmap() {
        let cover = GrayImage::from_fn(300, 300, |x, _| image::Luma([(x * 255 / 299) as u8]));
        let url = serve_once("200 OK", encode_png(&cover).unwrap(), "/i/u/300x300/art.jpg").await;

        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        let pipeline = ArtworkPipeline::new(local_http(), &fonts_dir(), &images, 0).unwrap();

        let path = pipeline.render(&track(url)).await.unwrap();
        assert_eq!(path, images.join("art.png"));

        let names: Vec<String> = std::fs::read_dir(&images)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["art.png".to_string()]);

        let bitmap = image::open(&path).unwrap().to_luma8();
        assert_eq!(bitmap.dimensions(), (PRINT_WIDTH, PRINT_WIDTH));
        assert!(bitmap.pixels().all(|p| p[0] == 0 || p[0] == 255));
        // Gradient cover dithers to a mix of dots
        assert!(bitmap.pixels().any(|p| p[0] == 0));
        assert!(bitmap.pixels().any(|p| p[0] == 255));
    }

    #[tokio::test]
    async fn test_render_rejects_failed_download() {
        let url = serve_once("404 Not Found", b"gone".to_vec(), "/i/u/300x300/art.jpg").await;

        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        let pipeline = ArtworkPipeline::new(local_http(), &fonts_dir(), &images, 0).unwrap();

        let err = pipeline.render(&track(url)).await.unwrap_err();
        assert!(matches!(err, ScrobblePrintError::ImageProcessing(_)));
        assert!(err.to_string().contains("404"));
        assert_eq!(std::fs::read_dir(&images).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_render_rejects_undecodable_image() {
        let url = serve_once("200 OK", b"not an image".to_vec(), "/cover.jpg").await;

        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images");
        let pipeline = ArtworkPipeline::new(local_http(), &fonts_dir(), &images, 0).unwrap();

        let err = pipeline.render(&track(url)).await.unwrap_err();
        assert!(err.to_string().contains("decode"));
        assert_eq!(std::fs::read_dir(&images).unwrap().count(), 0);
    }

    #[test]
    fn test_output_file_name_from_lastfm_url() {
        assert_eq!(
            output_file_name("https://lastfm.freetls.fastly.net/i/u/300x300/4128a6eb29f94943c9d206c08e625904.jpg"),
            "4128a6eb29f94943c9d206c08e625904.png"
        );
        assert_eq!(output_file_name("http://x/art.jpg"), "art.png");
    }

    #[test]
    fn test_output_file_name_ignores_query() {
        assert_eq!(output_file_name("http://x/cover.png?size=300#top"), "cover.png");
    }

    #[test]
    fn test_output_file_name_fallback() {
        assert_eq!(output_file_name("http://x/"), "artwork.png");
        assert_eq!(output_file_name("not a url/thing.gif"), "thing.png");
    }

    #[test]
    fn test_overlay_lines() {
        let track = Track {
            name: "a very extremely long song title indeed".to_string(),
            artist: "Band".to_string(),
            album: "Album".to_string(),
            image_url: "http://x/art.jpg".to_string(),
        };
        let now = DateTime::parse_from_rfc3339("2024-03-09T07:05:42Z")
            .unwrap()
            .with_timezone(&Utc);
        let overlay = Overlay::for_track(&track, now);
        assert_eq!(overlay.title, "A VERY EXTREMELY LONG…");
        assert_eq!(overlay.artist, "BAND");
        assert_eq!(overlay.album, "ALBUM");
        assert!(overlay.date.starts_with("2024-03-09"));
        assert!(overlay.date.ends_with("07:05"));
    }

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let bitmap = GrayImage::from_pixel(8, 4, WHITE);
        let png = encode_png(&bitmap).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
    }

    #[tokio::test]
    async fn test_write_atomically_leaves_no_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.png");
        write_atomically(&path, b"data").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["art.png".to_string()]);
        assert_eq!(std::fs::read(&path).unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_write_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("art.png");
        let err = write_atomically(&path, b"data").await.unwrap_err();
        assert!(matches!(err, ScrobblePrintError::ImageProcessing(_)));
    }

    #[test]
    fn test_pipeline_requires_fonts() {
        let dir = tempfile::tempdir().unwrap();
        let result = ArtworkPipeline::new(
            reqwest::Client::new(),
            &dir.path().join("fonts"),
            dir.path().join("images"),
            0,
        );
        assert!(result.is_err());
    }
}
