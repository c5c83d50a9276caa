//! # Printer Transport Layer
//!
//! Communication backends for sending bytes to the printer.
//!
//! ## Available Transports
//!
//! - [`serial`]: raw-mode serial TTY (Unix)
//! - [`memory`]: records writes, for dry runs and tests

pub mod memory;
#[cfg(unix)]
pub mod serial;

pub use memory::MemoryTransport;
#[cfg(unix)]
pub use serial::SerialTransport;

use crate::error::ScrobblePrintError;

/// A blocking byte sink connected to a printer.
pub trait Transport: Send {
    /// Write the whole buffer and flush it.
    fn write_all(&mut self, data: &[u8]) -> Result<(), ScrobblePrintError>;
}
