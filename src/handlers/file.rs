//! File upload negotiation.
//!
//! `/sendfile <name> <size>` only validates and records the request; the
//! connection loop performs the transfer once dispatch returns, because the
//! raw socket is owned there.

use super::{Context, Handler, UploadRequest};
use crate::error::HandlerResult;
use crate::upload;
use async_trait::async_trait;
use chatd_proto::{CommandRef, replies};

/// Handler for `/sendfile <name> <size>`.
pub struct SendfileHandler;

#[async_trait]
impl Handler for SendfileHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let (Some(name), Some(size)) = (cmd.arg(0), cmd.arg(1)) else {
            return ctx.reply(replies::SENDFILE_USAGE);
        };
        let Ok(size) = size.parse::<u64>() else {
            return ctx.reply(replies::SENDFILE_USAGE);
        };
        if cmd.arg(2).is_some() {
            return ctx.reply(replies::SENDFILE_USAGE);
        }
        let Some(name) = upload::sanitize_filename(name) else {
            return ctx.reply(replies::INVALID_FILENAME);
        };
        if size > ctx.hub.config.max_file_bytes {
            return ctx.reply(replies::FILE_TOO_LARGE);
        }

        ctx.upload = Some(UploadRequest {
            filename: name.to_string(),
            size,
        });
        Ok(())
    }
}
