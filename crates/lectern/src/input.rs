// SPDX-FileCopyrightText: 2026 Lectern Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading conversation input from a file or stdin.

use std::io::Read;
use std::path::Path;

use lectern_core::{LecternError, Message};
use serde::Deserialize;

/// A JSON array entry: either a bare string or a `{ "content", "role" }` object.
#[derive(Deserialize)]
#[serde(untagged)]
enum InputMessage {
    Plain(String),
    Full(Message),
}

/// Reads messages from `path`, or stdin when `path` is `None`.
pub fn read_messages(path: Option<&Path>, plain_text: bool) -> Result<Vec<Message>, LecternError> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            LecternError::Validation(format!("failed to read {}: {e}", path.display()))
        })?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| LecternError::Validation(format!("failed to read stdin: {e}")))?;
            buf
        }
    };
    parse_messages(&raw, plain_text)
}

pub fn parse_messages(raw: &str, plain_text: bool) -> Result<Vec<Message>, LecternError> {
    if plain_text {
        return Ok(vec![Message::new(raw.trim())]);
    }
    let entries: Vec<InputMessage> = serde_json::from_str(raw).map_err(|e| {
        LecternError::Validation(format!(
            "input is not a JSON message array ({e}); pass --text for plain text"
        ))
    })?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            InputMessage::Plain(content) => Message::new(content),
            InputMessage::Full(message) => message,
        })
        .collect())
}
