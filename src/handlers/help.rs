//! `/help` and `/quit`.

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use chatd_proto::{CommandRef, replies};

/// Handler for `/help`.
pub struct HelpHandler;

#[async_trait]
impl Handler for HelpHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &CommandRef<'_>) -> HandlerResult {
        ctx.reply(replies::HELP_TEXT)
    }
}

/// Handler for `/quit`: surfaces as [`HandlerError::Quit`] so the
/// connection loop tears the session down.
pub struct QuitHandler;

#[async_trait]
impl Handler for QuitHandler {
    async fn handle(&self, _ctx: &mut Context<'_>, _cmd: &CommandRef<'_>) -> HandlerResult {
        Err(HandlerError::Quit)
    }
}
