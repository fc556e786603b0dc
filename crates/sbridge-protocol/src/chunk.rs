//! Chunking codec for oversized JSON responses.
//!
//! A shadow document value can be much larger than the peer's serial receive
//! buffer. The value's bytes are partitioned into contiguous runs sized to
//! the transport's configured chunk size, each run prefixed with `"J "`, and
//! the prefixed runs are concatenated into a single write. The peer drains
//! the buffer in fixed chunk-size byte windows and strips the prefix from
//! each window, so every chunk except the last is exactly `chunk_size` bytes.
//!
//! Windows are byte-exact: a multi-byte character may straddle two chunks.
//! The peer reassembles the byte stream before interpreting it as text, and
//! concatenating the stripped chunk bodies restores the value exactly.

use crate::error::{ProtocolError, ProtocolResult};

/// Metadata prefix carried by every chunk: the JSON verb code plus delimiter.
pub const JSON_CHUNK_PREFIX: &str = "J ";

/// Split `value` into `"J "`-prefixed chunks and concatenate them into one
/// write buffer.
///
/// Every chunk except the last is exactly `chunk_size` bytes; the last is at
/// most `chunk_size`. A `chunk_size` that leaves no positive payload length
/// after the prefix is a configuration error, not a license to emit empty
/// chunks. An empty value yields an empty buffer.
pub fn format_into_chunks(value: &str, chunk_size: usize) -> ProtocolResult<Vec<u8>> {
    let prefix = JSON_CHUNK_PREFIX.as_bytes();
    let usable = chunk_size
        .checked_sub(prefix.len())
        .filter(|&u| u > 0)
        .ok_or(ProtocolError::ChunkSizeTooSmall {
            chunk_size,
            prefix: prefix.len(),
        })?;

    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() + prefix.len() * (bytes.len() / usable + 1));
    for run in bytes.chunks(usable) {
        out.extend_from_slice(prefix);
        out.extend_from_slice(run);
    }
    Ok(out)
}

/// Reconstruct the original value from a chunked write buffer (peer side).
///
/// Walks the buffer in fixed `chunk_size` byte windows, requiring each window
/// to start with the `"J "` prefix, and concatenates the stripped chunk
/// bodies in order. This is the inverse of [`format_into_chunks`].
pub fn reassemble_chunks(buffer: &[u8], chunk_size: usize) -> ProtocolResult<String> {
    let prefix = JSON_CHUNK_PREFIX.as_bytes();
    if chunk_size <= prefix.len() {
        return Err(ProtocolError::ChunkSizeTooSmall {
            chunk_size,
            prefix: prefix.len(),
        });
    }

    let mut out = Vec::with_capacity(buffer.len());
    for window in buffer.chunks(chunk_size) {
        if !window.starts_with(prefix) {
            return Err(ProtocolError::MalformedChunks(format!(
                "window does not start with {:?}",
                JSON_CHUNK_PREFIX
            )));
        }
        out.extend_from_slice(&window[prefix.len()..]);
    }
    String::from_utf8(out)
        .map_err(|e| ProtocolError::MalformedChunks(format!("payload is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk() {
        let buf = format_into_chunks("abc", 16).unwrap();
        assert_eq!(buf, b"J abc");
    }

    #[test]
    fn test_multiple_chunks() {
        // chunk_size 4 leaves 2 usable bytes per chunk
        let buf = format_into_chunks("abcde", 4).unwrap();
        assert_eq!(buf, b"J abJ cdJ e");
    }

    #[test]
    fn test_exact_multiple() {
        let buf = format_into_chunks("abcd", 4).unwrap();
        assert_eq!(buf, b"J abJ cd");
    }

    #[test]
    fn test_empty_value_yields_empty_buffer() {
        assert_eq!(format_into_chunks("", 16).unwrap(), b"");
    }

    #[test]
    fn test_chunk_size_too_small() {
        for chunk_size in [0, 1, 2] {
            assert!(matches!(
                format_into_chunks("abc", chunk_size),
                Err(ProtocolError::ChunkSizeTooSmall { .. })
            ));
        }
    }

    #[test]
    fn test_no_chunk_exceeds_chunk_size() {
        let value = "x".repeat(1000);
        for chunk_size in [3, 7, 32, 128] {
            let buf = format_into_chunks(&value, chunk_size).unwrap();
            for window in buf.chunks(chunk_size) {
                assert!(window.len() <= chunk_size);
                assert!(window.starts_with(JSON_CHUNK_PREFIX.as_bytes()));
            }
        }
    }

    #[test]
    fn test_multibyte_chunks_stay_within_byte_budget() {
        // 2-byte characters land mid-window; every chunk must still respect
        // the byte bound, with only the final chunk allowed to run short.
        let value = "é".repeat(10);
        let buf = format_into_chunks(&value, 8).unwrap();
        let windows: Vec<&[u8]> = buf.chunks(8).collect();
        for window in &windows[..windows.len() - 1] {
            assert_eq!(window.len(), 8);
        }
        for window in &windows {
            assert!(window.len() <= 8);
            assert!(window.starts_with(JSON_CHUNK_PREFIX.as_bytes()));
        }
        assert_eq!(reassemble_chunks(&buf, 8).unwrap(), value);
    }

    #[test]
    fn test_round_trip() {
        let values = [
            "{\"reported\":{\"temp\":72.5,\"mode\":\"auto\"}}",
            "température à l'étage: 21.5°C",
        ];
        for value in values {
            for chunk_size in [3, 5, 16, 64, 4096] {
                let buf = format_into_chunks(value, chunk_size).unwrap();
                assert_eq!(reassemble_chunks(&buf, chunk_size).unwrap(), value);
            }
        }
    }

    #[test]
    fn test_reassemble_rejects_garbage() {
        assert!(matches!(
            reassemble_chunks(b"X junk", 16),
            Err(ProtocolError::MalformedChunks(_))
        ));
    }
}
