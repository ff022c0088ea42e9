//! Flattening chat history into a single prompt block

use crate::message::{is_in_turn_order, Message};

/// Default token budget for flattened history
pub const DEFAULT_HISTORY_TOKEN_LIMIT: usize = 2048;

/// Bounds applied when flattening history.
///
/// Both limits trim from the oldest end so the latest turns always survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    pub token_limit: Option<usize>,
    pub message_limit: Option<usize>,
}

impl HistoryLimits {
    /// No trimming at all
    pub const UNBOUNDED: Self = Self {
        token_limit: None,
        message_limit: None,
    };
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            token_limit: Some(DEFAULT_HISTORY_TOKEN_LIMIT),
            message_limit: None,
        }
    }
}

/// Combine messages into one text block, oldest first.
///
/// Each turn renders as `ROLE:\n<content>` and turns are separated by a blank
/// line. Walking back from the newest message, the first message that would
/// overflow the token budget ends the walk; it and everything older are left
/// out. An empty slice yields an empty string.
#[must_use]
pub fn combine_message_chain(messages: &[Message], limits: HistoryLimits) -> String {
    if !is_in_turn_order(messages) {
        tracing::warn!(turns = messages.len(), "History positions are not in turn order");
    }

    let start = limits
        .message_limit
        .map_or(0, |limit| messages.len().saturating_sub(limit));

    let mut kept: Vec<&Message> = Vec::new();
    let mut total_tokens = 0usize;

    for message in messages[start..].iter().rev() {
        // Caller-supplied counts can be arbitrarily large
        let next_total = total_tokens.saturating_add(message.tokens());
        if limits.token_limit.is_some_and(|limit| next_total > limit) {
            break;
        }
        total_tokens = next_total;
        kept.push(message);
    }

    if kept.len() < messages.len() {
        tracing::debug!(
            total = messages.len(),
            kept = kept.len(),
            tokens = total_tokens,
            "Trimmed oldest history turns"
        );
    }

    kept.iter()
        .rev()
        .map(|m| format!("{}:\n{}", m.role.label(), m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}
