//! Line-based codec for the serial transport.
//!
//! Commands arrive from the peer as text lines terminated with `\n` (or
//! `\r\n`; bare `\r` is also accepted since some serial stacks emit it).
//! The codec accumulates received bytes until a complete line is available
//! and hands lines out one at a time, in arrival order.

use bytes::BytesMut;

use crate::error::{ProtocolError, ProtocolResult};

/// Default maximum command line length.
pub const MAX_LINE_LENGTH: usize = 256;

/// Default chunk size for fragmented JSON responses.
///
/// This bounds every single write toward the peer, which typically drains
/// the serial link into a fixed-size buffer.
pub const DEFAULT_CHUNK_SIZE: usize = 128;

/// A codec for reading command lines off a byte stream.
///
/// This handles the line-based nature of the protocol:
/// - Accumulates received bytes until a complete line is found
/// - Strips `\r`/`\n` terminators and skips empty lines
/// - Rejects lines that exceed the configured maximum length
#[derive(Debug)]
pub struct LineCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
    /// Maximum accepted line length in bytes.
    max_line: usize,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new(MAX_LINE_LENGTH)
    }
}

impl LineCodec {
    /// Create a new line codec with the given maximum line length.
    pub fn new(max_line: usize) -> Self {
        LineCodec {
            buffer: BytesMut::with_capacity(max_line * 2),
            max_line,
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode a complete command line from the buffer.
    ///
    /// Returns `Ok(Some(line))` if a complete non-empty line is available,
    /// `Ok(None)` if more data is needed, or `Err(LineOverflow)` if the
    /// buffered data exceeds the maximum line length without a terminator.
    /// On overflow the buffered data is discarded so the session can
    /// resynchronize at the next terminator.
    pub fn decode_line(&mut self) -> ProtocolResult<Option<String>> {
        loop {
            let line_end = self
                .buffer
                .iter()
                .position(|&b| b == b'\r' || b == b'\n');

            let Some(end) = line_end else {
                if self.buffer.len() > self.max_line {
                    let actual = self.buffer.len();
                    log::warn!(
                        "discarding {} unterminated bytes (max line {})",
                        actual,
                        self.max_line
                    );
                    self.buffer.clear();
                    return Err(ProtocolError::LineOverflow {
                        max: self.max_line,
                        actual,
                    });
                }
                return Ok(None);
            };

            let line_data = self.buffer.split_to(end);
            // Skip the terminator character(s)
            while !self.buffer.is_empty()
                && (self.buffer[0] == b'\r' || self.buffer[0] == b'\n')
            {
                let _ = self.buffer.split_to(1);
            }

            if line_data.is_empty() {
                continue;
            }

            if line_data.len() > self.max_line {
                return Err(ProtocolError::LineOverflow {
                    max: self.max_line,
                    actual: line_data.len(),
                });
            }

            return Ok(Some(String::from_utf8_lossy(&line_data).to_string()));
        }
    }

    /// Encode a command line for transmission, appending the terminator.
    pub fn encode_line(line: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        buf
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_line() {
        let encoded = LineCodec::encode_line("c 30");
        assert_eq!(encoded, b"c 30\n");
    }

    #[test]
    fn test_decode_line() {
        let mut codec = LineCodec::default();
        codec.push(b"d\n");
        assert_eq!(codec.decode_line().unwrap(), Some("d".to_string()));
        assert!(codec.decode_line().unwrap().is_none());
    }

    #[test]
    fn test_decode_crlf_and_multiple_lines() {
        let mut codec = LineCodec::default();
        codec.push(b"c 30\r\np a b 1 0\n");
        assert_eq!(codec.decode_line().unwrap(), Some("c 30".to_string()));
        assert_eq!(codec.decode_line().unwrap(), Some("p a b 1 0".to_string()));
        assert!(codec.decode_line().unwrap().is_none());
    }

    #[test]
    fn test_partial_line() {
        let mut codec = LineCodec::default();
        codec.push(b"j thing sta");
        assert!(codec.decode_line().unwrap().is_none());
        codec.push(b"te 1\n");
        assert_eq!(codec.decode_line().unwrap(), Some("j thing state 1".to_string()));
    }

    #[test]
    fn test_empty_lines_skipped() {
        let mut codec = LineCodec::default();
        codec.push(b"\r\n\nd\n");
        assert_eq!(codec.decode_line().unwrap(), Some("d".to_string()));
    }

    #[test]
    fn test_line_overflow_discards_buffer() {
        let mut codec = LineCodec::new(8);
        codec.push(b"wayoverthelimitwithnoterminator");
        assert!(matches!(
            codec.decode_line(),
            Err(ProtocolError::LineOverflow { max: 8, .. })
        ));
        assert_eq!(codec.buffered_len(), 0);

        // Session can resynchronize afterwards
        codec.push(b"d\n");
        assert_eq!(codec.decode_line().unwrap(), Some("d".to_string()));
    }
}
