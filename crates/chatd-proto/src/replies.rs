//! Canonical server reply strings.
//!
//! These are the exact bytes the server puts on the wire; clients are known
//! to match on them, so they are centralized here and covered by tests.
//! Every string carries its own line terminator.

pub const CHANNEL_CREATED: &str = "Channel created.\n";
pub const JOINED_CHANNEL: &str = "Joined channel.\n";
pub const CHANNEL_NOT_FOUND: &str = "Channel not found.\n";
pub const NOT_IN_CHANNEL: &str = "You are not in a channel. Use /join first.\n";
pub const USER_NOT_FOUND: &str = "User not found.\n";
pub const UPLOAD_DONE: &str = "Upload done\n";

pub const USERNAME_TAKEN: &str = "Username already taken.\n";
pub const INVALID_USERNAME: &str = "Invalid username.\n";
pub const INVALID_CHANNEL: &str = "Invalid channel name.\n";
pub const SENDFILE_USAGE: &str = "Usage: /sendfile <name> <size>\n";
pub const INVALID_FILENAME: &str = "Invalid filename.\n";
pub const FILE_TOO_LARGE: &str = "File too large.\n";
pub const UPLOAD_FAILED: &str = "Upload failed.\n";

pub const HELP_TEXT: &str = "Available commands:\n\
/name <name>            - Set your username\n\
/list                   - List available channels\n\
/create <name>          - Create a new channel\n\
/join <name>            - Join a channel\n\
/users                  - List users in current channel\n\
/msg <user> <message>   - Send a private message\n\
/sendfile <name> <size> - Upload a file of <size> bytes\n\
/help                   - Show this help message\n\
/quit                   - Disconnect\n";

/// Greeting after a successful `/name`.
pub fn welcome(name: &str) -> String {
    format!("Welcome, {name}!\n")
}

/// `/list` reply: header plus one bullet per channel.
pub fn channel_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::from("Channels:\n");
    for name in names {
        out.push_str("- ");
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// `/users` reply: header plus one bullet per member.
pub fn user_list<'a>(channel: &str, names: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = format!("Users in [{channel}]:\n");
    for name in names {
        out.push_str("- ");
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// A direct message as seen by the recipient.
pub fn direct_message(sender: &str, text: &str) -> String {
    format!("[DM] {sender}: {text}\n")
}

/// A channel broadcast as seen by the other members.
pub fn channel_message(channel: &str, sender: &str, text: &str) -> String {
    format!("[{channel}] {sender}: {text}\n")
}
