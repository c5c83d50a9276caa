//! In-memory transport that records every write.
//!
//! Handy for dry runs and for asserting the exact bytes a print job sends.

use std::sync::{Arc, Mutex};

use super::Transport;
use crate::error::ScrobblePrintError;

/// Records writes into a shared buffer.
///
/// Clones share the same buffer, so a test can keep one handle and give the
/// other to the printer.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    writes: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `write_all` call, in order.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl Transport for MemoryTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<(), ScrobblePrintError> {
        self.writes
            .lock()
            .map_err(|_| ScrobblePrintError::Transport("Memory transport poisoned".to_string()))?
            .push(data.to_vec());
        Ok(())
    }
}
