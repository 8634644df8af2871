//! Free-form chat against the completion service.
//!
//! Each message is sent as a standalone prompt; the transcript is only kept for display.

use crate::completion::Completer;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Who wrote a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Me,
    Assistant,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Me => write!(f, "Me"),
            Speaker::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One line of the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl ChatEntry {
    fn new(speaker: Speaker, text: String) -> Self {
        Self {
            speaker,
            text,
            at: Utc::now(),
        }
    }
}

impl std::fmt::Display for ChatEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.speaker, self.text)
    }
}

/// Ordered chat transcript.
pub struct ChatLog {
    completer: Arc<dyn Completer>,
    max_tokens: u32,
    entries: Vec<ChatEntry>,
}

impl ChatLog {
    /// Create an empty log.
    pub fn new(completer: Arc<dyn Completer>, max_tokens: u32) -> Self {
        Self {
            completer,
            max_tokens,
            entries: Vec::new(),
        }
    }

    /// Send a message.
    ///
    /// Blank input is ignored and returns `Ok(None)`. On failure the user's entry stays in
    /// the log and no reply is appended.
    pub async fn send(&mut self, text: &str) -> Result<Option<&ChatEntry>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        self.entries.push(ChatEntry::new(Speaker::Me, text.to_string()));
        debug!("Sending chat message ({} entries)", self.entries.len());

        let reply = match self.completer.complete(text, self.max_tokens).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Chat completion failed: {}", e);
                return Err(e);
            }
        };

        self.entries
            .push(ChatEntry::new(Speaker::Assistant, reply.trim().to_string()));
        Ok(self.entries.last())
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Forget the transcript.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
