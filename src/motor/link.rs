// Host side of the serial link: writes newline-terminated command lines
//
// Wire format: ASCII text, one command per line, terminated by 0x0A.
// The endpoint never answers, so the link is write-only.

use serialport::{self, SerialPort};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::config::{DEFAULT_BAUDRATE, LINE_CAPACITY, LINE_TERMINATOR, SERIAL_TIMEOUT};

/// Error types for sending command lines
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line contains a newline: {0:?}")]
    EmbeddedNewline(String),

    #[error("Line is {len} bytes, endpoint keeps only {max}")]
    TooLong { len: usize, max: usize },

    #[error("Link lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, LinkError>;

/// Destination for command lines
pub trait LineSink {
    /// Send `line` followed by the terminator
    fn send_line(&mut self, line: &str) -> Result<()>;
}

/// Reject lines the endpoint would mangle
fn check_line(line: &str) -> Result<()> {
    if line.bytes().any(|b| b == LINE_TERMINATOR) {
        return Err(LinkError::EmbeddedNewline(line.to_string()));
    }
    if line.len() > LINE_CAPACITY {
        return Err(LinkError::TooLong {
            len: line.len(),
            max: LINE_CAPACITY,
        });
    }
    Ok(())
}

/// Serial connection to the endpoint
pub struct SerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open at the endpoint's 9600 baud
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(SERIAL_TIMEOUT)
            .open()?;

        Ok(Self { port })
    }

    /// Wrap for sharing between several motors
    pub fn shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }
}

impl LineSink for SerialLink {
    fn send_line(&mut self, line: &str) -> Result<()> {
        check_line(line)?;
        debug!("Send: {}", line);
        self.port.write_all(line.as_bytes())?;
        self.port.write_all(&[LINE_TERMINATOR])?;
        self.port.flush()?;
        Ok(())
    }
}

impl LineSink for Vec<u8> {
    fn send_line(&mut self, line: &str) -> Result<()> {
        check_line(line)?;
        self.extend_from_slice(line.as_bytes());
        self.push(LINE_TERMINATOR);
        Ok(())
    }
}

impl<L: LineSink> LineSink for Arc<Mutex<L>> {
    fn send_line(&mut self, line: &str) -> Result<()> {
        let mut sink = self.lock().map_err(|_| LinkError::Poisoned)?;
        sink.send_line(line)
    }
}
