//! Command handlers.
//!
//! This module contains the Handler trait and command registry for routing
//! decoded lines to appropriate handlers. The first token of a `/`-prefixed
//! line selects the handler; anything else - including slash words nobody
//! registered - is channel chatter and goes to the broadcast path.

mod channel;
mod file;
mod help;
mod messaging;
mod name;

use crate::error::{HandlerError, HandlerResult};
use crate::state::{Hub, SessionId};
use async_trait::async_trait;
use chatd_proto::{CommandRef, Input};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// A request to switch the connection into file-receive mode, produced by
/// the `/sendfile` handler and acted on by the connection loop after
/// dispatch returns.
#[derive(Debug)]
pub struct UploadRequest {
    pub filename: String,
    pub size: u64,
}

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The issuing session.
    pub sid: SessionId,
    /// Shared broker state.
    pub hub: &'a Arc<Hub>,
    /// This session's outbound queue.
    pub sender: &'a mpsc::Sender<String>,
    /// Set by `/sendfile` when a transfer was accepted.
    pub upload: Option<UploadRequest>,
}

impl Context<'_> {
    /// Queue a reply line to the issuing session. Best-effort: a full queue
    /// drops the reply rather than block the session's own task on itself.
    pub fn reply(&self, text: impl Into<String>) -> HandlerResult {
        match self.sender.try_send(text.into()) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(sid = %self.sid, "Reply dropped - outbound queue full");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(HandlerError::QueueClosed),
        }
    }
}

/// Trait implemented by all command handlers.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one command.
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult;
}

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        handlers.insert("name", Box::new(name::NameHandler));

        // Channel handlers
        handlers.insert("create", Box::new(channel::CreateHandler));
        handlers.insert("join", Box::new(channel::JoinHandler));
        handlers.insert("list", Box::new(channel::ListHandler));
        handlers.insert("users", Box::new(channel::UsersHandler));

        // Messaging handlers
        handlers.insert("msg", Box::new(messaging::MsgHandler));

        // File transfer
        handlers.insert("sendfile", Box::new(file::SendfileHandler));

        // Misc
        handlers.insert("help", Box::new(help::HelpHandler));
        handlers.insert("quit", Box::new(help::QuitHandler));

        Self { handlers }
    }

    /// Dispatch one decoded line.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, line: &str) -> HandlerResult {
        match Input::parse(line) {
            Input::Command(cmd) => match self.handlers.get(cmd.name()) {
                Some(handler) => handler.handle(ctx, &cmd).await,
                // Unregistered slash words are plain chatter.
                None => messaging::broadcast_text(ctx, cmd.raw()).await,
            },
            Input::Text(text) => messaging::broadcast_text(ctx, text).await,
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
