//! Slash-command parsing for the chat composer.
//!
//! Anything not starting with `/` is a plain message. Commands take their
//! arguments separated by whitespace; parse failures come back as
//! [`Command::InvalidArgs`] so the caller can show usage in the status line.

use std::path::PathBuf;

use parley_proto::ReactionCode;

/// Parsed composer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain chat message.
    Message {
        /// Message text.
        text: String,
    },
    /// `/disconnect` — end the session, back to the connect form.
    Disconnect,
    /// `/quit` — exit the application.
    Quit,
    /// `/image <path>` — attach an image to the next send.
    Image {
        /// File to attach.
        path: PathBuf,
    },
    /// `/react <n> <code>` — react to the n-th latest message.
    React {
        /// 1-based position counting back from the latest message.
        nth_latest: usize,
        /// Reaction code (heart, thumbsup, laugh, wow, sad).
        code: ReactionCode,
    },
    /// Unrecognized command.
    Unknown {
        /// The offending input.
        input: String,
    },
    /// Recognized command with bad arguments.
    InvalidArgs {
        /// Command name without the slash.
        command: &'static str,
        /// Usage description.
        error: String,
    },
}

/// Parse one line of composer input.
#[must_use]
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Message { text: input.to_string() };
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();

    match name {
        "quit" | "q" => Command::Quit,
        "disconnect" | "dc" => Command::Disconnect,
        "image" | "img" => parse_image(parts),
        "react" | "r" => parse_react(parts),
        _ => Command::Unknown { input: trimmed.to_string() },
    }
}

fn parse_image<'a>(mut parts: impl Iterator<Item = &'a str>) -> Command {
    match parts.next() {
        Some(path) => Command::Image { path: PathBuf::from(path) },
        None => Command::InvalidArgs {
            command: "image",
            error: "usage: /image <path>".to_string(),
        },
    }
}

fn parse_react<'a>(mut parts: impl Iterator<Item = &'a str>) -> Command {
    let usage = || Command::InvalidArgs {
        command: "react",
        error: "usage: /react <n> <heart|thumbsup|laugh|wow|sad>".to_string(),
    };

    let Some(nth) = parts.next().and_then(|n| n.parse::<usize>().ok()) else {
        return usage();
    };
    if nth == 0 {
        return usage();
    }

    let Some(code) = parts.next().and_then(ReactionCode::parse) else {
        return usage();
    };

    Command::React { nth_latest: nth, code }
}
