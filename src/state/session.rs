//! Per-connection session state.

use crate::state::SessionId;

/// Protocol sub-state for a session's inbound byte stream.
///
/// `FileRecv` suspends line parsing while an upload's declared byte count
/// is drained; the tag lives here so the mode is explicit state, not an
/// artifact of which code path last ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionMode {
    #[default]
    Line,
    FileRecv,
}

/// Server-side state for one connected client.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    /// Starts as a generated placeholder, reassignable via `/name`.
    pub username: String,
    /// Current channel; a session is in at most one channel at a time.
    pub channel: Option<String>,
    pub mode: SessionMode,
    /// Unix timestamp of the accept.
    pub connected_at: i64,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            username: format!("user_{id}"),
            channel: None,
            mode: SessionMode::Line,
            connected_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionIdGenerator;

    #[test]
    fn test_placeholder_username() {
        let ids = SessionIdGenerator::new();
        let session = Session::new(ids.next());
        assert_eq!(session.username, "user_1");
        assert_eq!(session.channel, None);
        assert_eq!(session.mode, SessionMode::Line);
    }
}
