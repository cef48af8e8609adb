//! chatd-proto - protocol support for the chatd chat broker.
//!
//! The wire protocol is newline-terminated UTF-8 text. This crate provides
//! the framing codec that turns a byte stream into complete lines, the
//! command tokenizer that splits a line into a command word and arguments,
//! and the canonical reply strings the server speaks.

pub mod command;
pub mod error;
pub mod line;
pub mod replies;

pub use command::{CommandRef, Input};
pub use error::ProtocolError;
pub use line::LineCodec;
