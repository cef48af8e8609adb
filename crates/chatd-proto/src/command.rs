//! Command tokenization.
//!
//! A decoded line is either a slash command (`/join general`) or free text.
//! [`CommandRef`] borrows from the line and hands out arguments on demand,
//! so handlers pull exactly the tokens they need.

/// One decoded input line, classified.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    /// A `/`-prefixed command.
    Command(CommandRef<'a>),
    /// Anything else: channel chatter.
    Text(&'a str),
}

impl<'a> Input<'a> {
    /// Classify a decoded line. The line must already be stripped of its
    /// terminator (the codec does this).
    pub fn parse(line: &'a str) -> Input<'a> {
        match line.strip_prefix('/') {
            Some(rest) => {
                let (name, args) = rest
                    .split_once(char::is_whitespace)
                    .unwrap_or((rest, ""));
                Input::Command(CommandRef {
                    name,
                    args,
                    raw: line,
                })
            }
            None => Input::Text(line),
        }
    }
}

/// A borrowed view of a slash command and its argument text.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandRef<'a> {
    name: &'a str,
    args: &'a str,
    raw: &'a str,
}

impl<'a> CommandRef<'a> {
    /// The command word, without the leading slash.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The n-th whitespace-separated argument token.
    pub fn arg(&self, n: usize) -> Option<&'a str> {
        self.args.split_whitespace().nth(n)
    }

    /// The remainder of the argument text after skipping `n` tokens,
    /// with internal spacing preserved. `None` when nothing remains.
    pub fn trailing(&self, n: usize) -> Option<&'a str> {
        let mut rest = self.args.trim_start();
        for _ in 0..n {
            let idx = rest.find(char::is_whitespace)?;
            rest = rest[idx..].trim_start();
        }
        if rest.is_empty() { None } else { Some(rest) }
    }

    /// The full original line, slash included.
    pub fn raw(&self) -> &'a str {
        self.raw
    }
}
