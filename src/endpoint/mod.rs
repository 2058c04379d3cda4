// Command endpoint: byte stream in, actuator effects out
//
// Provides:
// - Line framing with a fixed-capacity buffer
// - Exact-match command classification
// - Per-motor "next line is a speed" arming

mod dispatch;
mod framer;

pub use dispatch::{parse_speed, Dispatcher, MotorMode};
pub use framer::{Line, LineFramer};

use crate::config::LINE_CAPACITY;
use crate::messages::{Effect, Motor};

/// One command link: a line framer feeding a dispatcher
///
/// Instances are independent; nothing is shared between them.
#[derive(Debug, Clone, Default)]
pub struct Endpoint<const N: usize = LINE_CAPACITY> {
    framer: LineFramer<N>,
    dispatcher: Dispatcher,
}

impl Endpoint {
    /// Endpoint with the standard 64-byte line capacity
    pub fn new() -> Self {
        Self::with_line_capacity()
    }
}

impl<const N: usize> Endpoint<N> {
    pub fn with_line_capacity() -> Self {
        Self {
            framer: LineFramer::new(),
            dispatcher: Dispatcher::new(),
        }
    }

    /// Feed one byte from the transport
    ///
    /// Returns the effect of the line this byte terminates, if any. The effect
    /// must be applied before the next byte is fed.
    pub fn feed(&mut self, byte: u8) -> Option<Effect> {
        let line = self.framer.push(byte)?;
        self.dispatcher.dispatch(&line)
    }

    /// Pull effects out of a byte stream, one line at a time
    pub fn effects<I>(&mut self, bytes: I) -> Effects<'_, I::IntoIter, N>
    where
        I: IntoIterator<Item = u8>,
    {
        Effects {
            endpoint: self,
            bytes: bytes.into_iter(),
        }
    }

    pub fn is_awaiting_speed(&self, motor: Motor) -> bool {
        self.dispatcher.is_awaiting_speed(motor)
    }

    /// Bytes buffered for the current, unterminated line
    pub fn buffered(&self) -> usize {
        self.framer.pending_len()
    }
}

/// Iterator returned by [`Endpoint::effects`]
pub struct Effects<'a, I, const N: usize> {
    endpoint: &'a mut Endpoint<N>,
    bytes: I,
}

impl<I, const N: usize> Iterator for Effects<'_, I, N>
where
    I: Iterator<Item = u8>,
{
    type Item = Effect;

    fn next(&mut self) -> Option<Effect> {
        for byte in self.bytes.by_ref() {
            if let Some(effect) = self.endpoint.feed(byte) {
                return Some(effect);
            }
        }
        None
    }
}
