//! # Serial Transport
//!
//! Talks to the printer through a serial TTY (`/dev/ttyUSB0`, `/dev/serial0`,
//! ...).
//!
//! ## TTY Configuration
//!
//! The device is opened in raw mode so binary bitmap data is transmitted
//! without modification:
//!
//! - **Baud rate**: from `PRINTER_BAUDRATE`, applied to input and output
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, ... cleared
//! - **No output processing**: OPOST cleared (no CR/LF translation)
//! - **8-bit characters**: CS8, no parity
//! - **No echo, non-canonical**
//! - **No software flow control**: 0x11/0x13 appear in bitmap data
//!
//! ## Chunked Writes
//!
//! The printer's receive buffer is small and these mechanisms rarely wire up
//! hardware flow control, so large writes are split into chunks with a
//! short pause in between.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::Duration;

use super::Transport;
use crate::error::ScrobblePrintError;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 256;

/// Delay between chunks
const CHUNK_DELAY: Duration = Duration::from_millis(2);

/// # Serial Printer Transport
pub struct SerialTransport {
    file: File,
}

impl SerialTransport {
    /// Open and configure the serial device.
    ///
    /// ## Errors
    ///
    /// - The device doesn't exist
    /// - Permission denied (the user usually needs the `dialout` group)
    /// - The baud rate is not supported by the platform
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P, baud_rate: u32) -> Result<Self, ScrobblePrintError> {
        let path = device.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                ScrobblePrintError::Transport(format!("Failed to open {}: {}", path.display(), e))
            })?;

        configure_tty_raw(file.as_raw_fd(), baud_rate)?;

        Ok(Self { file })
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<(), ScrobblePrintError> {
        if data.is_empty() {
            return Ok(());
        }

        // A bitmap command is up to 12KB; the printer buffers far less
        let mut chunks = data.chunks(CHUNK_SIZE).peekable();
        while let Some(chunk) = chunks.next() {
            self.file
                .write_all(chunk)
                .map_err(|e| ScrobblePrintError::Transport(format!("Write failed: {}", e)))?;

            if chunks.peek().is_some() {
                thread::sleep(CHUNK_DELAY);
            }
        }

        self.file
            .flush()
            .map_err(|e| ScrobblePrintError::Transport(format!("Flush failed: {}", e)))
    }
}

/// Map a numeric baud rate to its termios speed constant.
pub fn baud_constant(baud_rate: u32) -> Option<libc::speed_t> {
    let speed = match baud_rate {
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        115200 => libc::B115200,
        230400 => libc::B230400,
        _ => return None,
    };
    Some(speed)
}

/// Configure a file descriptor for raw TTY mode at `baud_rate`.
///
/// IXON/IXOFF/IXANY are cleared because 0x11 (XON) and 0x13 (XOFF) occur in
/// raster data.
fn configure_tty_raw(fd: i32, baud_rate: u32) -> Result<(), ScrobblePrintError> {
    use std::mem::MaybeUninit;

    let speed = baud_constant(baud_rate).ok_or_else(|| {
        ScrobblePrintError::Transport(format!("Unsupported baud rate: {}", baud_rate))
    })?;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(ScrobblePrintError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    // 8N1, receiver on, ignore modem control lines
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CSTOPB);
    termios.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;

    let result = unsafe {
        libc::cfsetispeed(&mut termios, speed) | libc::cfsetospeed(&mut termios, speed)
    };
    if result != 0 {
        return Err(ScrobblePrintError::Transport(format!(
            "cfsetspeed failed: {}",
            io::Error::last_os_error()
        )));
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(ScrobblePrintError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
