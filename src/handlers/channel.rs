//! Channel handlers: `/create`, `/join`, `/list`, `/users`.

use super::{Context, Handler};
use crate::error::HandlerResult;
use async_trait::async_trait;
use chatd_proto::{CommandRef, replies};
use tracing::info;

/// Maximum accepted channel name length.
const MAX_CHANNEL_LEN: usize = 64;

/// Channel names are single tokens; `#` is allowed for IRC-flavored taste.
fn valid_channel_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_CHANNEL_LEN
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '#'))
}

/// Handler for `/create <ch>`: idempotent create, then join.
pub struct CreateHandler;

#[async_trait]
impl Handler for CreateHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let Some(name) = cmd.arg(0) else {
            return ctx.reply(replies::INVALID_CHANNEL);
        };
        if cmd.arg(1).is_some() || !valid_channel_name(name) {
            return ctx.reply(replies::INVALID_CHANNEL);
        }
        ctx.hub.create_channel(name);
        ctx.hub.join_channel(name, ctx.sid);
        info!(sid = %ctx.sid, channel = %name, "Channel created");
        ctx.reply(replies::CHANNEL_CREATED)
    }
}

/// Handler for `/join <ch>`: joining a channel that does not exist is a
/// normal miss, not an implicit create.
pub struct JoinHandler;

#[async_trait]
impl Handler for JoinHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let Some(name) = cmd.arg(0) else {
            return ctx.reply(replies::CHANNEL_NOT_FOUND);
        };
        if !ctx.hub.has_channel(name) {
            return ctx.reply(replies::CHANNEL_NOT_FOUND);
        }
        ctx.hub.join_channel(name, ctx.sid);
        info!(sid = %ctx.sid, channel = %name, "Joined channel");
        ctx.reply(replies::JOINED_CHANNEL)
    }
}

/// Handler for `/list`.
pub struct ListHandler;

#[async_trait]
impl Handler for ListHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &CommandRef<'_>) -> HandlerResult {
        let names = ctx.hub.channel_names();
        ctx.reply(replies::channel_list(names.iter().map(String::as_str)))
    }
}

/// Handler for `/users`: members of the sender's current channel.
pub struct UsersHandler;

#[async_trait]
impl Handler for UsersHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &CommandRef<'_>) -> HandlerResult {
        let Some(channel) = ctx.hub.current_channel(ctx.sid) else {
            return ctx.reply(replies::NOT_IN_CHANNEL);
        };
        let names = ctx.hub.member_usernames(&channel);
        ctx.reply(replies::user_list(&channel, names.iter().map(String::as_str)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_channel_name() {
        assert!(valid_channel_name("general"));
        assert!(valid_channel_name("#dev-ops.2"));
        assert!(!valid_channel_name(""));
        assert!(!valid_channel_name("a b"));
        assert!(!valid_channel_name(&"c".repeat(65)));
    }
}
