//! # Thermal Printer Protocol
//!
//! Low-level command builders for the serial thermal printer.
//!
//! ## Module Structure
//!
//! - [`commands`]: init, heating parameters, paper feed
//! - [`graphics`]: `DC2 *` bitmap commands
//!
//! ## Usage Example
//!
//! ```
//! use scrobbleprint::protocol::{commands, graphics};
//!
//! let mut job = Vec::new();
//! job.push(commands::init());
//! job.push(commands::heating_params(10, 150, 120));
//!
//! let rows = vec![0xAA; 48 * 24]; // vertical stripes
//! job.extend(graphics::bitmap_chunks(48, 24, &rows));
//! job.push(commands::feed_lines(2));
//!
//! assert_eq!(job.len(), 4);
//! ```

pub mod commands;
pub mod graphics;
