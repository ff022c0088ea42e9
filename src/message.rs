//! Chat messages as read from the conversation store
//!
//! Messages are owned by the persistence layer. This crate only reads an
//! ordered slice of them, oldest first.

use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    /// Wire name used by chat-completion style APIs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }

    /// Label used when a turn is flattened into plain text
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MessageRole::User => "USER",
            MessageRole::Assistant => "ASSISTANT",
            MessageRole::System => "SYSTEM",
        }
    }
}

/// A single turn in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Ordinal of the turn within its conversation
    #[serde(default)]
    pub position: usize,
    /// Token count recorded by the store, if it keeps one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_count: Option<usize>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>, position: usize) -> Self {
        Self {
            role,
            content: content.into(),
            position,
            token_count: None,
        }
    }

    pub fn user(content: impl Into<String>, position: usize) -> Self {
        Self::new(MessageRole::User, content, position)
    }

    pub fn assistant(content: impl Into<String>, position: usize) -> Self {
        Self::new(MessageRole::Assistant, content, position)
    }

    pub fn system(content: impl Into<String>, position: usize) -> Self {
        Self::new(MessageRole::System, content, position)
    }

    #[must_use]
    pub fn with_token_count(mut self, tokens: usize) -> Self {
        self.token_count = Some(tokens);
        self
    }

    /// Tokens this message costs in a prompt.
    ///
    /// Uses the stored count when present, otherwise roughly four characters
    /// per token.
    #[must_use]
    pub fn tokens(&self) -> usize {
        self.token_count
            .unwrap_or_else(|| self.content.chars().count().div_ceil(4))
    }
}

/// Renumber positions to match slice order.
///
/// Transcripts loaded from JSON often omit positions.
pub fn assign_positions(messages: &mut [Message]) {
    for (position, message) in messages.iter_mut().enumerate() {
        message.position = position;
    }
}

/// Whether positions strictly increase along the slice
#[must_use]
pub fn is_in_turn_order(messages: &[Message]) -> bool {
    messages.windows(2).all(|w| w[0].position < w[1].position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names() {
        assert_eq!(MessageRole::User.as_str(), "user");
        assert_eq!(MessageRole::Assistant.label(), "ASSISTANT");
        assert_eq!(MessageRole::System.as_str(), "system");
    }

    #[test]
    fn test_token_estimate() {
        assert_eq!(Message::user("", 0).tokens(), 0);
        assert_eq!(Message::user("abc", 0).tokens(), 1);
        assert_eq!(Message::user("abcdefgh", 0).tokens(), 2);
        assert_eq!(Message::user("abcdefghi", 0).tokens(), 3);
        assert_eq!(Message::user("abcdefghi", 0).with_token_count(42).tokens(), 42);
    }

    #[test]
    fn test_deserialize_without_position() {
        let msg: Message =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.position, 0);
        assert_eq!(msg.token_count, None);
    }

    #[test]
    fn test_assign_positions() {
        let mut messages = vec![
            Message::user("a", 0),
            Message::assistant("b", 0),
            Message::user("c", 0),
        ];
        assert!(!is_in_turn_order(&messages));
        assign_positions(&mut messages);
        assert!(is_in_turn_order(&messages));
        assert_eq!(messages[2].position, 2);
    }
}
