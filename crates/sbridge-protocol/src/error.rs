//! Error types for the bridge wire protocol.

use thiserror::Error;

/// Errors that can occur when working with the wire protocol.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The command line was empty or contained only whitespace.
    #[error("empty command line")]
    EmptyLine,

    /// The command code token was not a single character.
    #[error("invalid command code: {0:?}")]
    InvalidCode(String),

    /// The command code is not registered with the dispatcher.
    #[error("unknown command code: {0:?}")]
    UnknownCommand(char),

    /// Failed to parse a status line.
    #[error("failed to parse status: {0}")]
    ParseError(String),

    /// The configured chunk size leaves no room for payload after the
    /// chunk metadata prefix.
    #[error("chunk size {chunk_size} too small for {prefix}-byte chunk prefix")]
    ChunkSizeTooSmall { chunk_size: usize, prefix: usize },

    /// A chunk buffer could not be reassembled.
    #[error("malformed chunk buffer: {0}")]
    MalformedChunks(String),

    /// Line exceeded the maximum allowed length.
    #[error("line overflow: max {max} bytes, got {actual}")]
    LineOverflow { max: usize, actual: usize },
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
