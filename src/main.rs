//! # Scrobbleprint CLI
//!
//! Prints the album art of whatever is playing on a Last.fm account.
//!
//! ## Usage
//!
//! ```bash
//! # Run the service (reads LASTFM_* and PRINTER_* from the environment)
//! scrobbleprint
//! scrobbleprint run
//!
//! # Render one cover without Last.fm or the printer
//! scrobbleprint preview --image-url https://.../cover.jpg \
//!     --name "Roygbiv" --artist "Boards of Canada" --album "Music Has the Right to Children"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use scrobbleprint::{
    Config, Orchestrator, ScrobblePrintError, ThermalPrinter, Track,
    config::parse_rotation,
    lastfm::{LastFmClient, LastFmStream},
    printer::{HeatConfig, PrinterConfig},
    render::{ArtworkPipeline, ArtworkRenderer},
    transport::SerialTransport,
};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Scrobbleprint - Now-playing album art on a thermal printer
#[derive(Parser, Debug)]
#[command(name = "scrobbleprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Follow the configured account and print every new track (default)
    Run,

    /// Render a single cover to the images directory and print its path
    Preview {
        /// Cover art URL
        #[arg(long)]
        image_url: String,

        /// Track title
        #[arg(long)]
        name: String,

        /// Artist name
        #[arg(long)]
        artist: String,

        /// Album name
        #[arg(long, default_value = "")]
        album: String,

        /// Final rotation in degrees (multiple of 90)
        #[arg(long, default_value = "0")]
        rotation: String,

        /// Directory holding the overlay fonts
        #[arg(long, default_value = "fonts")]
        fonts_dir: PathBuf,

        /// Output directory
        #[arg(long, default_value = "images")]
        images_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run().await,
        Commands::Preview {
            image_url,
            name,
            artist,
            album,
            rotation,
            fonts_dir,
            images_dir,
        } => {
            let track = Track {
                name,
                artist,
                album,
                image_url,
            };
            preview(track, &rotation, fonts_dir, images_dir).await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Fatal");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

async fn run() -> Result<(), ScrobblePrintError> {
    // Configuration is checked before the serial port is touched
    let config = Config::from_env()?;

    info!(
        device = %config.printer.device,
        baud = config.printer.baud_rate,
        rotation = config.printer.rotation,
        user = %config.lastfm.username,
        "Starting"
    );

    let transport = SerialTransport::open(&config.printer.device, config.printer.baud_rate)?;
    let printer = ThermalPrinter::open(transport, PrinterConfig::CSN_A2, HeatConfig::ALBUM_ART).await?;

    let pipeline = ArtworkPipeline::new(
        download_client()?,
        &config.fonts_dir,
        config.images_dir.clone(),
        config.printer.rotation,
    )?;

    let client = LastFmClient::new(&config.lastfm)?;
    let stream = LastFmStream::spawn(
        client,
        config.lastfm.username.clone(),
        config.lastfm.poll_interval,
    );

    let mut orchestrator = Orchestrator::new(stream, pipeline, printer);
    orchestrator.run().await;
    Ok(())
}

async fn preview(
    track: Track,
    rotation: &str,
    fonts_dir: PathBuf,
    images_dir: PathBuf,
) -> Result<(), ScrobblePrintError> {
    let rotation = parse_rotation(rotation)?;
    let pipeline = ArtworkPipeline::new(download_client()?, &fonts_dir, images_dir, rotation)?;

    let path = pipeline.render(&track).await?;
    println!("{}", path.display());
    Ok(())
}

fn download_client() -> Result<reqwest::Client, ScrobblePrintError> {
    reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| ScrobblePrintError::ImageProcessing(format!("HTTP client error: {}", e)))
}
