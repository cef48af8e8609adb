//! Username assignment.

use super::{Context, Handler};
use crate::error::HandlerResult;
use async_trait::async_trait;
use chatd_proto::{CommandRef, replies};
use tracing::info;

/// Maximum accepted username length.
const MAX_USERNAME_LEN: usize = 32;

/// Usernames are single tokens so `/msg <user>` stays unambiguous.
fn valid_username(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_USERNAME_LEN
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Handler for `/name <n>`.
pub struct NameHandler;

#[async_trait]
impl Handler for NameHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let Some(name) = cmd.arg(0) else {
            return ctx.reply(replies::INVALID_USERNAME);
        };
        if cmd.arg(1).is_some() || !valid_username(name) {
            return ctx.reply(replies::INVALID_USERNAME);
        }
        if !ctx.hub.set_username(ctx.sid, name) {
            return ctx.reply(replies::USERNAME_TAKEN);
        }
        info!(sid = %ctx.sid, name = %name, "Username assigned");
        ctx.reply(replies::welcome(name))
    }
}
