// Byte sources feeding the endpoint
//
// The endpoint only needs "is a byte ready?" and "read one byte"; the serial
// port and the in-memory queue below both provide that.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use serialport::SerialPort;
use tracing::info;

use crate::config::{DEFAULT_BAUDRATE, SERIAL_TIMEOUT};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Non-blocking byte source
pub trait ByteSource {
    /// True if at least one byte can be read without blocking
    fn available(&mut self) -> Result<bool>;

    /// Read one byte if one is ready
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

/// Serial link to the host
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open at the standard 9600 baud
    pub fn open(port_name: &str) -> Result<Self> {
        Self::open_with_baudrate(port_name, DEFAULT_BAUDRATE)
    }

    pub fn open_with_baudrate(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(SERIAL_TIMEOUT)
            .open()?;
        info!("Serial transport open on {} at {} baud", port_name, baudrate);
        Ok(Self { port })
    }
}

impl ByteSource for SerialTransport {
    fn available(&mut self) -> Result<bool> {
        Ok(self.port.bytes_to_read()? > 0)
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        if !self.available()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(TransportError::Io(e)),
        }
    }
}

/// In-memory byte queue, for tests and harnesses
#[derive(Debug, Clone, Default)]
pub struct QueueTransport {
    queue: VecDeque<u8>,
}

impl QueueTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes to the end of the queue
    pub fn push(&mut self, bytes: &[u8]) {
        self.queue.extend(bytes.iter().copied());
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl From<&[u8]> for QueueTransport {
    fn from(bytes: &[u8]) -> Self {
        let mut transport = Self::new();
        transport.push(bytes);
        transport
    }
}

impl ByteSource for QueueTransport {
    fn available(&mut self) -> Result<bool> {
        Ok(!self.queue.is_empty())
    }

    fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.queue.pop_front())
    }
}
