// Line framing: accumulate bytes until a newline, truncating long lines

use tracing::trace;

use crate::config::{LINE_CAPACITY, LINE_TERMINATOR};

/// A completed line, copied out of the framer as it stood at the terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<const N: usize = LINE_CAPACITY> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> Line<N> {
    /// Every byte received for this line, up to the capacity
    pub fn raw(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// The line as a C string: everything before the first NUL
    pub fn text(&self) -> &[u8] {
        let raw = self.raw();
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        &raw[..end]
    }

    /// True for a bare terminator with nothing buffered before it
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Fixed-capacity line accumulator
///
/// Bytes past the capacity are discarded until the next terminator, so an
/// over-long line is delivered as its first `N` bytes.
#[derive(Debug, Clone)]
pub struct LineFramer<const N: usize = LINE_CAPACITY> {
    buf: [u8; N],
    cursor: usize,
    dropped: usize,
}

impl<const N: usize> LineFramer<N> {
    pub fn new() -> Self {
        Self {
            buf: [0; N],
            cursor: 0,
            dropped: 0,
        }
    }

    /// Push one byte. Returns the completed line when `byte` is the terminator.
    pub fn push(&mut self, byte: u8) -> Option<Line<N>> {
        if byte == LINE_TERMINATOR {
            let line = Line {
                bytes: self.buf,
                len: self.cursor,
            };
            if self.dropped > 0 {
                trace!("Line truncated to {} bytes, dropped {}", N, self.dropped);
            }
            self.cursor = 0;
            self.dropped = 0;
            self.buf = [0; N];
            return Some(line);
        }

        if self.cursor < N {
            self.buf[self.cursor] = byte;
            self.cursor += 1;
        } else {
            self.dropped += 1;
        }
        None
    }

    /// Number of bytes buffered for the current, unterminated line
    pub fn pending_len(&self) -> usize {
        self.cursor
    }
}

impl<const N: usize> Default for LineFramer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_all<const N: usize>(framer: &mut LineFramer<N>, bytes: &[u8]) -> Vec<Line<N>> {
        bytes.iter().filter_map(|&b| framer.push(b)).collect()
    }

    #[test]
    fn test_splits_on_newline() {
        let mut framer = LineFramer::<64>::new();
        let lines = push_all(&mut framer, b"abc\ndef\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].raw(), b"abc");
        assert_eq!(lines[1].raw(), b"def");
        assert_eq!(framer.pending_len(), 0);
    }

    #[test]
    fn test_partial_line_stays_buffered() {
        let mut framer = LineFramer::<64>::new();
        assert!(push_all(&mut framer, b"MOTOR_").is_empty());
        assert_eq!(framer.pending_len(), 6);
        let lines = push_all(&mut framer, b"FORWARD MotorLeft\n");
        assert_eq!(lines[0].raw(), b"MOTOR_FORWARD MotorLeft");
    }

    #[test]
    fn test_carriage_return_is_payload() {
        let mut framer = LineFramer::<64>::new();
        let lines = push_all(&mut framer, b"200\r\n");
        assert_eq!(lines[0].raw(), b"200\r");
    }

    #[test]
    fn test_truncates_to_capacity() {
        let mut framer = LineFramer::<64>::new();
        let input: Vec<u8> = (0..70u8).map(|i| b'A' + (i % 26)).collect();
        assert!(push_all(&mut framer, &input).is_empty());
        assert_eq!(framer.pending_len(), 64);

        let line = framer.push(b'\n').unwrap();
        assert_eq!(line.raw(), &input[..64]);
        assert_eq!(framer.pending_len(), 0);

        // Next line starts clean after the overflow
        let lines = push_all(&mut framer, b"xy\n");
        assert_eq!(lines[0].raw(), b"xy");
    }

    #[test]
    fn test_no_stale_bytes_after_flush() {
        let mut framer = LineFramer::<64>::new();
        push_all(&mut framer, b"MOTOR_FORWARD MotorLeft\n");
        let lines = push_all(&mut framer, b"MOTOR\n");
        assert_eq!(lines[0].raw(), b"MOTOR");
        assert_eq!(lines[0].text(), b"MOTOR");
    }

    #[test]
    fn test_text_stops_at_nul() {
        let mut framer = LineFramer::<64>::new();
        let lines = push_all(&mut framer, b"12\x0034\n");
        assert_eq!(lines[0].raw(), b"12\x0034");
        assert_eq!(lines[0].text(), b"12");
    }

    #[test]
    fn test_bare_terminator_is_empty_line() {
        let mut framer = LineFramer::<64>::new();
        let line = framer.push(b'\n').unwrap();
        assert!(line.is_empty());
        assert_eq!(line.text(), b"");
    }
}
