//! chatd - a channel-based chat broker for trusted networks.
//!
//! Clients connect over TCP and speak a newline-terminated command protocol:
//! join or create named channels, broadcast to the current channel, send
//! direct messages, and upload files with an explicit byte count.
//!
//! The crate is a library so the integration tests can run a broker
//! in-process; the `chatd` binary is a thin wrapper around [`network::Gateway`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod state;
pub mod upload;
