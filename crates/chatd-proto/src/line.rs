//! Line-based codec for tokio.
//!
//! Reads newline-terminated lines out of a byte stream, tolerating partial
//! and coalesced reads: bytes accumulate in the buffer until a full line is
//! available, and one read may yield any number of complete lines.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Codec that frames the stream into newline-terminated lines.
///
/// Decoded lines are stripped of their `\n` (and an optional preceding
/// `\r`). A line that grows past `max_len` before its terminator arrives is
/// a protocol violation and surfaces as [`error::ProtocolError::LineTooLong`].
pub struct LineCodec {
    /// Index of next byte to check for newline.
    next_index: usize,
    /// Maximum line length, terminator included.
    max_len: usize,
}

impl LineCodec {
    /// Default maximum line length: 64 KiB.
    pub const DEFAULT_MAX_LEN: usize = 64 * 1024;

    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: Self::DEFAULT_MAX_LEN,
        }
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        // Look for newline starting from where we left off.
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(error::ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            let text = std::str::from_utf8(&line).map_err(|e| {
                error::ProtocolError::InvalidUtf8 {
                    byte_pos: e.valid_up_to(),
                }
            })?;

            Ok(Some(text.trim_end_matches(['\r', '\n']).to_string()))
        } else {
            // No complete line yet - remember where we stopped.
            self.next_index = src.len();

            // A partial line past the limit will never become a valid one.
            if src.len() > self.max_len {
                return Err(error::ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            // An unterminated trailing fragment at EOF is discarded.
            None => {
                src.clear();
                self.next_index = 0;
                Ok(None)
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    /// Writes the string verbatim; reply strings carry their own terminators.
    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend(msg.into_bytes());
        Ok(())
    }
}
