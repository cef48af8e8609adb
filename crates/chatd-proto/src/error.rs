//! Protocol error types.

use thiserror::Error;

/// Errors produced while framing or decoding the byte stream.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A buffered line exceeded the configured maximum length.
    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong { actual: usize, limit: usize },

    /// The line was not valid UTF-8.
    #[error("invalid utf-8 at byte {byte_pos}")]
    InvalidUtf8 { byte_pos: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
