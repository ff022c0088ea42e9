//! Conversation naming using a language model
//!
//! Produces a short title from the whole conversation. The model is asked for
//! a bare name; whatever it returns is cleaned of surrounding whitespace and
//! quotes and used as-is.

use crate::history::{combine_message_chain, HistoryLimits};
use crate::llm::{LlmError, ModelInvoker};
use crate::message::Message;
use crate::prompts::PromptTemplates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cleaned conversation title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationTitle(String);

impl ConversationTitle {
    /// Build a title from raw model output
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        Self(sanitize_title(raw).to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConversationTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConversationTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strip surrounding whitespace and double quotes.
///
/// Both are trimmed together, so `' " Title " '` becomes `Title` in one pass
/// and a second pass changes nothing.
#[must_use]
pub fn sanitize_title(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '"')
}

/// Name a conversation with explicit templates and history limits.
///
/// # Errors
///
/// Propagates any error from the model invoker.
pub async fn name_conversation_with(
    history: &[Message],
    invoker: &dyn ModelInvoker,
    templates: &PromptTemplates,
    limits: HistoryLimits,
) -> Result<ConversationTitle, LlmError> {
    let history_text = combine_message_chain(history, limits);
    let prompt = templates.chat_naming(&history_text);

    let raw = invoker.invoke(&prompt).await?;
    let title = ConversationTitle::from_raw(&raw);

    tracing::debug!(title = %title, "New session name");

    Ok(title)
}

/// Name a conversation with the default template and history limits.
///
/// An empty history is still sent; the title is whatever the model makes of
/// it.
///
/// # Errors
///
/// Propagates any error from the model invoker.
pub async fn name_conversation(
    history: &[Message],
    invoker: &dyn ModelInvoker,
) -> Result<ConversationTitle, LlmError> {
    name_conversation_with(
        history,
        invoker,
        &PromptTemplates::default(),
        HistoryLimits::default(),
    )
    .await
}
