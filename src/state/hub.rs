//! The Hub - central shared state for the chat broker.
//!
//! The Hub owns all sessions, channels, the username index, and the
//! per-session outbound senders, in concurrent maps accessible from any
//! connection task. It is passed around as `Arc<Hub>`; there is no ambient
//! global state.
//!
//! Delivery to peers goes through bounded mpsc queues with `try_send`: a
//! full or closed queue drops the message with a log line, so a stalled
//! recipient can never block the sending session's task.

use crate::config::Config;
use crate::state::{Session, SessionId, SessionMode};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::debug;

/// A named channel. Created on demand, never deleted in normal operation.
#[derive(Debug)]
pub struct Channel {
    pub created: i64,
    pub members: HashSet<SessionId>,
}

impl Channel {
    fn new() -> Self {
        Self {
            created: chrono::Utc::now().timestamp(),
            members: HashSet::new(),
        }
    }
}

/// Configuration accessible to handlers and connections via the Hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub upload_dir: PathBuf,
    pub max_file_bytes: u64,
    pub outbound_queue_depth: usize,
}

/// Central shared state container.
pub struct Hub {
    /// All live sessions, indexed by id.
    sessions: DashMap<SessionId, Session>,
    /// All channels, indexed by name.
    channels: DashMap<String, Channel>,
    /// Lowercased username to session id, for `/msg` lookups and the
    /// uniqueness policy.
    usernames: DashMap<String, SessionId>,
    /// Session id to outbound queue sender, for message routing.
    senders: DashMap<SessionId, mpsc::Sender<String>>,
    /// Limits handlers need at dispatch time.
    pub config: HubConfig,
}

impl Hub {
    pub fn new(config: &Config) -> Self {
        Self {
            sessions: DashMap::new(),
            channels: DashMap::new(),
            usernames: DashMap::new(),
            senders: DashMap::new(),
            config: HubConfig {
                upload_dir: config.upload.dir.clone(),
                max_file_bytes: config.limits.max_file_bytes,
                outbound_queue_depth: config.limits.outbound_queue_depth,
            },
        }
    }

    // ------------------------------------------------------------------
    // Session table
    // ------------------------------------------------------------------

    /// Create the session for a freshly accepted connection, placeholder
    /// username included. Returns a snapshot of the new session.
    pub fn register_session(&self, sid: SessionId) -> Session {
        let session = Session::new(sid);
        // A session that claimed this exact name via `/name` keeps it; the
        // placeholder then simply is not reachable for DMs until renamed.
        self.usernames
            .entry(session.username.to_lowercase())
            .or_insert(sid);
        self.sessions.insert(sid, session.clone());
        session
    }

    /// Remove a session and every reference to it: channel membership,
    /// username index, and outbound sender.
    pub fn remove_session(&self, sid: SessionId) {
        self.leave(sid);
        if let Some((_, session)) = self.sessions.remove(&sid) {
            self.usernames
                .remove_if(&session.username.to_lowercase(), |_, owner| *owner == sid);
        }
        self.senders.remove(&sid);
    }

    /// Assign a username, enforcing uniqueness (case-insensitive).
    /// Returns `false` when the name belongs to another session.
    pub fn set_username(&self, sid: SessionId, name: &str) -> bool {
        let key = name.to_lowercase();
        match self.usernames.entry(key.clone()) {
            Entry::Occupied(occupied) => {
                if *occupied.get() != sid {
                    return false;
                }
                // Re-claiming our own name; only the spelling may change.
            }
            Entry::Vacant(vacant) => {
                vacant.insert(sid);
            }
        }

        let old = self
            .sessions
            .get_mut(&sid)
            .map(|mut session| std::mem::replace(&mut session.username, name.to_string()));

        match old {
            Some(old) => {
                let old_key = old.to_lowercase();
                if old_key != key {
                    self.usernames.remove_if(&old_key, |_, owner| *owner == sid);
                }
                true
            }
            None => {
                // Session vanished mid-command; drop the reservation.
                self.usernames.remove_if(&key, |_, owner| *owner == sid);
                false
            }
        }
    }

    pub fn find_by_username(&self, name: &str) -> Option<SessionId> {
        self.usernames.get(&name.to_lowercase()).map(|entry| *entry)
    }

    pub fn username_of(&self, sid: SessionId) -> Option<String> {
        self.sessions.get(&sid).map(|s| s.username.clone())
    }

    pub fn current_channel(&self, sid: SessionId) -> Option<String> {
        self.sessions.get(&sid).and_then(|s| s.channel.clone())
    }

    /// Record the session's protocol sub-state (line vs. file-receive).
    pub fn set_mode(&self, sid: SessionId, mode: SessionMode) {
        if let Some(mut session) = self.sessions.get_mut(&sid) {
            session.mode = mode;
        }
    }

    // ------------------------------------------------------------------
    // Channel registry
    // ------------------------------------------------------------------

    /// Create a channel if absent. Idempotent.
    pub fn create_channel(&self, name: &str) {
        self.channels.entry(name.to_string()).or_insert_with(Channel::new);
    }

    pub fn has_channel(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Join a channel, creating it if needed. A session is in at most one
    /// channel, so any previous membership is dropped first.
    pub fn join_channel(&self, name: &str, sid: SessionId) {
        self.leave(sid);
        self.channels
            .entry(name.to_string())
            .or_insert_with(Channel::new)
            .members
            .insert(sid);
        if let Some(mut session) = self.sessions.get_mut(&sid) {
            session.channel = Some(name.to_string());
        }
    }

    /// Remove the session from its current channel, if any.
    pub fn leave(&self, sid: SessionId) {
        let prev = self
            .sessions
            .get_mut(&sid)
            .and_then(|mut session| session.channel.take());
        if let Some(name) = prev
            && let Some(mut channel) = self.channels.get_mut(&name)
        {
            channel.members.remove(&sid);
        }
    }

    /// All channel names, sorted for deterministic enumeration.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Snapshot of a channel's member ids.
    pub fn member_ids(&self, name: &str) -> Vec<SessionId> {
        self.channels
            .get(name)
            .map(|channel| channel.members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Usernames of a channel's current members, sorted for deterministic
    /// enumeration.
    pub fn member_usernames(&self, name: &str) -> Vec<String> {
        let ids = self.member_ids(name);
        let mut names: Vec<String> = ids
            .into_iter()
            .filter_map(|sid| self.username_of(sid))
            .collect();
        names.sort();
        names
    }

    // ------------------------------------------------------------------
    // Message routing
    // ------------------------------------------------------------------

    /// Register a session's outbound queue for message routing.
    pub fn register_sender(&self, sid: SessionId, sender: mpsc::Sender<String>) {
        self.senders.insert(sid, sender);
    }

    /// Deliver one line to a session's queue. Best-effort: a full or closed
    /// queue drops the line. Returns whether it was queued.
    pub fn send_to(&self, sid: SessionId, line: &str) -> bool {
        let Some(sender) = self.senders.get(&sid) else {
            debug!(%sid, "Delivery skipped - no sender registered");
            return false;
        };
        match sender.try_send(line.to_string()) {
            Ok(()) => true,
            Err(e) => {
                debug!(%sid, error = %e, "Delivery dropped");
                false
            }
        }
    }

    /// Deliver one line to every current member of a channel except
    /// `exclude` (usually the sender). Per-recipient failures are logged
    /// and skipped; delivery to the rest continues.
    pub fn broadcast(&self, channel: &str, line: &str, exclude: Option<SessionId>) {
        for sid in self.member_ids(channel) {
            if exclude == Some(sid) {
                continue;
            }
            self.send_to(sid, line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionIdGenerator;

    fn hub() -> Hub {
        Hub::new(&Config::default())
    }

    #[test]
    fn test_join_implies_leave() {
        let hub = hub();
        let ids = SessionIdGenerator::new();
        let sid = ids.next();
        hub.register_session(sid);

        hub.join_channel("general", sid);
        hub.join_channel("random", sid);

        assert!(hub.member_ids("general").is_empty());
        assert_eq!(hub.member_ids("random"), vec![sid]);
        assert_eq!(hub.current_channel(sid), Some("random".to_string()));
    }

    #[test]
    fn test_channel_names_no_duplicates() {
        let hub = hub();
        hub.create_channel("general");
        hub.create_channel("general");
        hub.create_channel("random");

        assert_eq!(hub.channel_names(), vec!["general", "random"]);
    }

    #[test]
    fn test_username_uniqueness() {
        let hub = hub();
        let ids = SessionIdGenerator::new();
        let (a, b) = (ids.next(), ids.next());
        hub.register_session(a);
        hub.register_session(b);

        assert!(hub.set_username(a, "dave"));
        assert!(!hub.set_username(b, "dave"));
        assert!(!hub.set_username(b, "DAVE"));
        assert_eq!(hub.find_by_username("Dave"), Some(a));

        // Renaming frees the old name.
        assert!(hub.set_username(a, "dora"));
        assert!(hub.set_username(b, "dave"));
    }

    #[test]
    fn test_remove_session_cleans_everything() {
        let hub = hub();
        let ids = SessionIdGenerator::new();
        let sid = ids.next();
        hub.register_session(sid);
        hub.set_username(sid, "carol");
        hub.join_channel("general", sid);
        let (tx, _rx) = mpsc::channel(4);
        hub.register_sender(sid, tx);

        hub.remove_session(sid);

        assert!(hub.member_ids("general").is_empty());
        assert_eq!(hub.find_by_username("carol"), None);
        assert!(!hub.send_to(sid, "orphan\n"));
        // The channel itself survives.
        assert!(hub.has_channel("general"));
    }

    #[test]
    fn test_broadcast_excludes_sender() {
        let hub = hub();
        let ids = SessionIdGenerator::new();
        let (a, b, c) = (ids.next(), ids.next(), ids.next());
        let mut queues = Vec::new();
        for sid in [a, b, c] {
            hub.register_session(sid);
            hub.join_channel("general", sid);
            let (tx, rx) = mpsc::channel(4);
            hub.register_sender(sid, tx);
            queues.push(rx);
        }

        hub.broadcast("general", "[general] a: hi\n", Some(a));

        assert!(queues[0].try_recv().is_err());
        assert_eq!(queues[1].try_recv().unwrap(), "[general] a: hi\n");
        assert_eq!(queues[2].try_recv().unwrap(), "[general] a: hi\n");
    }

    #[test]
    fn test_broadcast_survives_disconnected_member() {
        let hub = hub();
        let ids = SessionIdGenerator::new();
        let (a, b) = (ids.next(), ids.next());
        for sid in [a, b] {
            hub.register_session(sid);
            hub.join_channel("general", sid);
        }
        let (tx, mut rx) = mpsc::channel(4);
        hub.register_sender(a, tx);
        // b has no sender registered (connection already torn down).

        hub.broadcast("general", "line\n", None);

        assert_eq!(rx.try_recv().unwrap(), "line\n");
    }

    #[test]
    fn test_member_usernames_sorted() {
        let hub = hub();
        let ids = SessionIdGenerator::new();
        let (a, b) = (ids.next(), ids.next());
        hub.register_session(a);
        hub.register_session(b);
        hub.set_username(a, "zoe");
        hub.set_username(b, "alice");
        hub.join_channel("general", a);
        hub.join_channel("general", b);

        assert_eq!(hub.member_usernames("general"), vec!["alice", "zoe"]);
    }
}
