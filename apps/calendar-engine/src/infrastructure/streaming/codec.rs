//! Event feed message decoding.

use serde_json::Value;

use super::types::StreamError;

/// One decoded feed message.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// Regular data message.
    Data(Value),
    /// `{"error": "..."}` reported by the server.
    ServerError(String),
}

/// Decode one JSON message.
pub fn parse_message(text: &str) -> Result<FeedMessage, StreamError> {
    let value: Value = serde_json::from_str(text).map_err(|e| StreamError::Parse {
        message: e.to_string(),
    })?;
    match value.get("error") {
        Some(Value::String(message)) => Ok(FeedMessage::ServerError(message.clone())),
        Some(Value::Null) | None => Ok(FeedMessage::Data(value)),
        Some(other) => Ok(FeedMessage::ServerError(other.to_string())),
    }
}

/// Splits a chunked body into lines, carrying a partial trailing line over
/// to the next chunk. Bytes are held undecoded until their line is complete,
/// so a character split across chunks survives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Append a chunk and return the complete, non-empty, trimmed lines.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);
        complete
            .split(|&b| b == b'\n')
            .map(|line| String::from_utf8_lossy(line).trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Bytes held back waiting for a newline.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Drop any partial line.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
