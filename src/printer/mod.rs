//! # Printer Module
//!
//! Hardware specifications and the print session.
//!
//! ## Modules
//!
//! - [`config`]: Printer hardware specifications and heat tuning
//! - [`session`]: Opening the printer and running print jobs

pub mod config;
pub mod session;

pub use config::{FEED_LINES, HeatConfig, PRINT_WIDTH, PrinterConfig};
pub use session::{PrintDispatch, PrintJob, PrinterState, Raster, ThermalPrinter};
