use serde::{Deserialize, Serialize};

use super::nullable;

/// Opening line shown before the first exchange.
pub const GREETING: &str = "Hi! I'm the BOH AI Assistant. Ask me anything about Brothers of the \
Highway TC - bylaws, prospects, meetings, chain of command, and more!";

/// Reply appended when the chat request fails.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Body for `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Response of `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    #[serde(default, deserialize_with = "nullable")]
    pub response: String,
}

/// In-memory conversation with the assistant. Not persisted.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    awaiting_reply: bool,
}

impl Default for Transcript {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
            awaiting_reply: false,
        }
    }
}

impl Transcript {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Record an outgoing message. Returns the trimmed text to send, or
    /// `None` if the input is blank or a reply is still pending.
    pub fn begin_send(&mut self, input: &str) -> Option<String> {
        let text = input.trim();
        if text.is_empty() || self.awaiting_reply {
            return None;
        }
        self.messages.push(ChatMessage::user(text));
        self.awaiting_reply = true;
        Some(text.to_string())
    }

    /// Record the assistant's reply, or the apology if the request failed.
    pub fn finish(&mut self, reply: Option<String>) {
        let content = reply.unwrap_or_else(|| APOLOGY.to_string());
        self.messages.push(ChatMessage::assistant(content));
        self.awaiting_reply = false;
    }
}
