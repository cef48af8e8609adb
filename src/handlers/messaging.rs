//! Message delivery: direct messages and channel chatter.

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use chatd_proto::{CommandRef, replies};
use tracing::debug;

/// Handler for `/msg <user> <text>`.
pub struct MsgHandler;

#[async_trait]
impl Handler for MsgHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        // A `/msg` without recipient or text is dropped silently.
        let (Some(target), Some(text)) = (cmd.arg(0), cmd.trailing(1)) else {
            return Ok(());
        };
        let sender_name = ctx
            .hub
            .username_of(ctx.sid)
            .ok_or(HandlerError::SessionGone)?;

        match ctx.hub.find_by_username(target) {
            Some(peer) => {
                let line = replies::direct_message(&sender_name, text);
                if !ctx.hub.send_to(peer, &line) {
                    debug!(from = %ctx.sid, to = %target, "DM dropped");
                }
                Ok(())
            }
            None => ctx.reply(replies::USER_NOT_FOUND),
        }
    }
}

/// Route free text into the sender's current channel, excluding the sender
/// from delivery.
pub(super) async fn broadcast_text(ctx: &mut Context<'_>, text: &str) -> HandlerResult {
    if text.trim().is_empty() {
        return Ok(());
    }
    let Some(channel) = ctx.hub.current_channel(ctx.sid) else {
        return ctx.reply(replies::NOT_IN_CHANNEL);
    };
    let sender_name = ctx
        .hub
        .username_of(ctx.sid)
        .ok_or(HandlerError::SessionGone)?;
    let line = replies::channel_message(&channel, &sender_name, text);
    ctx.hub.broadcast(&channel, &line, Some(ctx.sid));
    Ok(())
}
