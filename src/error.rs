//! Unified error handling for chatd.
//!
//! Application-level misses ("channel not found", "user not found") are not
//! errors: handlers reply to the sender and return `Ok`. The variants here
//! are the outcomes that end or escalate out of command handling.

use thiserror::Error;

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The client asked to disconnect.
    #[error("client quit")]
    Quit,

    /// The session vanished from the table mid-command (concurrent removal).
    #[error("session missing from table")]
    SessionGone,

    /// The session's outbound queue is gone; the connection is tearing down.
    #[error("outbound queue closed")]
    QueueClosed,
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::SessionGone => "session_gone",
            Self::QueueClosed => "queue_closed",
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;
