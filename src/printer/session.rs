//! # Printer Session
//!
//! Owns the transport and sequences print jobs.
//!
//! ## Lifecycle
//!
//! ```text
//! open() ─► Opening ──(ESC @, ESC 7 ...)──► Ready ─► print() ─► Busy ─► Ready
//! ```
//!
//! Commands are written one at a time with `command_delay` between them,
//! on the blocking pool, because serial writes block.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::config::{FEED_LINES, HeatConfig, PrinterConfig};
use crate::error::{Result, ScrobblePrintError};
use crate::protocol::{commands, graphics};
use crate::render::dither::pack_row;
use crate::transport::Transport;

/// Luma below this prints as a dot.
const DARK_THRESHOLD: u8 = 128;

/// Sends a rendered bitmap to paper.
#[async_trait]
pub trait PrintDispatch: Send {
    /// Print the bitmap at `path`, feed the trailing blank lines, and resolve
    /// once every byte has been handed to the printer.
    async fn print_image(&mut self, path: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterState {
    Opening,
    Ready,
    Busy,
}

/// A 1-bit image packed for the print head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width_bytes: u8,
    pub height: usize,
    /// `height` rows of `width_bytes` bytes, MSB = leftmost dot.
    pub data: Vec<u8>,
}

impl Raster {
    /// Load an image file and pack it. The width must match the head.
    pub fn load(path: &Path, config: &PrinterConfig) -> Result<Self> {
        let image = image::open(path)
            .map_err(|e| ScrobblePrintError::Print(format!("Failed to load {}: {}", path.display(), e)))?
            .to_luma8();

        if image.width() != config.width_dots as u32 {
            return Err(ScrobblePrintError::Print(format!(
                "Image width must be {}px, got {}px",
                config.width_dots,
                image.width()
            )));
        }

        let mut data = Vec::with_capacity(config.width_bytes as usize * image.height() as usize);
        for row in image.rows() {
            let dots: Vec<bool> = row.map(|p| p[0] < DARK_THRESHOLD).collect();
            data.extend(pack_row(&dots));
        }

        Ok(Self {
            width_bytes: config.width_bytes,
            height: image.height() as usize,
            data,
        })
    }
}

/// An ordered list of printer commands.
///
/// ```
/// use scrobbleprint::printer::PrintJob;
///
/// let job = PrintJob::new().line_feed(2);
/// assert_eq!(job.commands(), &[vec![0x1B, b'd', 2]]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintJob {
    commands: Vec<Vec<u8>>,
}

impl PrintJob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bitmap.
    pub fn image(mut self, raster: &Raster) -> Self {
        self.commands
            .extend(graphics::bitmap_chunks(raster.width_bytes, raster.height, &raster.data));
        self
    }

    /// Append `n` blank lines.
    pub fn line_feed(mut self, n: u8) -> Self {
        self.commands.push(commands::feed_lines(n));
        self
    }

    pub fn commands(&self) -> &[Vec<u8>] {
        &self.commands
    }
}

/// A thermal printer on the other end of a [`Transport`].
pub struct ThermalPrinter<T: Transport> {
    transport: Arc<Mutex<T>>,
    config: PrinterConfig,
    heat: HeatConfig,
    state: PrinterState,
}

impl<T: Transport + 'static> ThermalPrinter<T> {
    /// Initialize the printer and wait until it is ready.
    ///
    /// Sends a reset followed by the heating parameters.
    pub async fn open(transport: T, config: PrinterConfig, heat: HeatConfig) -> Result<Self> {
        let mut printer = Self {
            transport: Arc::new(Mutex::new(transport)),
            config,
            heat,
            state: PrinterState::Opening,
        };

        let init = vec![
            commands::init(),
            commands::heating_params(heat.max_printing_dots, heat.heating_time, heat.heating_interval),
        ];
        printer.send(init).await?;
        printer.state = PrinterState::Ready;
        info!(model = config.name, "Printer ready!");

        Ok(printer)
    }

    pub fn state(&self) -> PrinterState {
        self.state
    }

    /// Run a job. Only one job runs at a time; the printer must be ready.
    pub async fn print(&mut self, job: PrintJob) -> Result<()> {
        if self.state != PrinterState::Ready {
            return Err(ScrobblePrintError::Print(format!(
                "Printer is not ready ({:?})",
                self.state
            )));
        }

        self.state = PrinterState::Busy;
        let result = self.send(job.commands).await;
        self.state = PrinterState::Ready;
        result
    }

    async fn send(&self, batch: Vec<Vec<u8>>) -> Result<()> {
        let transport = Arc::clone(&self.transport);
        let delay = self.heat.command_delay;

        tokio::task::spawn_blocking(move || write_paced(&transport, &batch, delay))
            .await
            .map_err(|e| ScrobblePrintError::Print(format!("Print task failed: {}", e)))?
    }
}

fn write_paced<T: Transport>(
    transport: &Mutex<T>,
    batch: &[Vec<u8>],
    delay: Duration,
) -> Result<()> {
    let mut transport = transport
        .lock()
        .map_err(|_| ScrobblePrintError::Print("Printer transport poisoned".to_string()))?;

    for command in batch {
        transport.write_all(command)?;
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    Ok(())
}

#[async_trait]
impl<T: Transport + 'static> PrintDispatch for ThermalPrinter<T> {
    async fn print_image(&mut self, path: &Path) -> Result<()> {
        let owned = path.to_path_buf();
        let config = self.config;
        let raster = tokio::task::spawn_blocking(move || Raster::load(&owned, &config))
            .await
            .map_err(|e| ScrobblePrintError::Print(format!("Load task failed: {}", e)))??;

        debug!(rows = raster.height, path = %path.display(), "Sending bitmap");
        self.print(PrintJob::new().image(&raster).line_feed(FEED_LINES))
            .await?;
        info!("Printed image");
        Ok(())
    }
}
