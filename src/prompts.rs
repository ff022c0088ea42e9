//! Prompt templates and builders for search gating and conversation naming
//!
//! Templates are plain text with `{chat_history}` and `{final_query}` slots.
//! The defaults below can be swapped out wholesale through [`PromptTemplates`];
//! only the slots and marker phrases are load-bearing.

use crate::llm::PromptMessage;
use crate::message::Message;
use thiserror::Error;

/// Slot filled with the flattened conversation
pub const CHAT_HISTORY_SLOT: &str = "{chat_history}";
/// Slot filled with the latest user query
pub const FINAL_QUERY_SLOT: &str = "{final_query}";

/// Reply the conversational gate asks for when retrieval is unnecessary.
/// Its first word, followed by a space, is the marker the parser looks for.
pub const NO_SEARCH: &str = "NO_SEARCH, <short reason>";
/// Reply the aggressive gate asks for when retrieval is unnecessary
pub const SKIP_SEARCH: &str = "SKIP_SEARCH";
/// Reply both gates ask for when retrieval should run
pub const YES_SEARCH: &str = "YES_SEARCH";

pub const REQUIRE_SEARCH_SYSTEM_MSG: &str = r#"You are a large language model whose only job is to decide if the system should call an external search tool before the user's last message is answered.

Reply that no search is needed if:
- the chat history already contains enough information to fully answer the last message
- the last message does not depend on any specific or private knowledge (greetings, rewording requests, small talk)

Otherwise reply "YES_SEARCH". When unsure, reply "YES_SEARCH"."#;

pub const REQUIRE_SEARCH_HINT: &str = r#"Hint: reply with EXACTLY "YES_SEARCH", or with "NO_SEARCH, " followed by a short reason."#;

pub const AGGRESSIVE_SEARCH_TEMPLATE: &str = r#"You are a helpful assistant. Given the conversation history and a follow up query, decide whether the system should call an external search tool to better answer the latest user input.

Respond "SKIP_SEARCH" only if either:
- The conversation history contains enough information to FULLY and ACCURATELY answer the query, and more detail would add little or no value.
- The query is a request that needs no additional information, such as rephrasing or summarizing the conversation.

Conversation History:
{chat_history}

If you are unsure, respond with "YES_SEARCH".
Respond with EXACTLY and ONLY "YES_SEARCH" or "SKIP_SEARCH".

Follow Up Input:
{final_query}"#;

pub const CHAT_NAMING_TEMPLATE: &str = r"Given the following conversation, provide a SHORT name for the conversation.
IMPORTANT: TRY NOT TO USE MORE THAN 5 WORDS, MAKE IT AS CONCISE AS POSSIBLE.
Focus the name on the important keywords to convey the topic of the conversation.

Chat History:
{chat_history}

Based on the above, what is a short name to convey the topic of the conversation?";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Template `{template}` is missing the {slot} slot")]
    MissingSlot {
        template: &'static str,
        slot: &'static str,
    },
}

/// The four prompt texts the gate and namer use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    /// System instruction for the conversational gate
    pub require_search_system: String,
    /// Appended to the query in the conversational gate
    pub require_search_hint: String,
    /// Single-prompt template for the aggressive gate
    pub aggressive_search: String,
    /// Single-prompt template for naming
    pub chat_naming: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            require_search_system: REQUIRE_SEARCH_SYSTEM_MSG.to_string(),
            require_search_hint: REQUIRE_SEARCH_HINT.to_string(),
            aggressive_search: AGGRESSIVE_SEARCH_TEMPLATE.to_string(),
            chat_naming: CHAT_NAMING_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Check every template carries its required slots
    ///
    /// # Errors
    ///
    /// Returns the first missing slot found.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let required: [(&'static str, &str, &'static str); 3] = [
            ("aggressive_search", self.aggressive_search.as_str(), CHAT_HISTORY_SLOT),
            ("aggressive_search", self.aggressive_search.as_str(), FINAL_QUERY_SLOT),
            ("chat_naming", self.chat_naming.as_str(), CHAT_HISTORY_SLOT),
        ];
        for (template, text, slot) in required {
            if !text.contains(slot) {
                return Err(TemplateError::MissingSlot { template, slot });
            }
        }
        Ok(())
    }

    /// Prompt for the conversational gate.
    ///
    /// System instruction, then each history turn under its own role, then
    /// the query with the hint appended.
    #[must_use]
    pub fn conversational_search(&self, query: &Message, history: &[Message]) -> Vec<PromptMessage> {
        let mut prompt = Vec::with_capacity(history.len() + 2);
        prompt.push(PromptMessage::system(self.require_search_system.as_str()));
        prompt.extend(history.iter().map(PromptMessage::from));
        prompt.push(PromptMessage::user(format!(
            "{}\n\n{}",
            query.content, self.require_search_hint
        )));
        prompt
    }

    /// Single user prompt for the aggressive gate
    #[must_use]
    pub fn aggressive_search(&self, query: &str, history_text: &str) -> Vec<PromptMessage> {
        let filled = fill_slots(
            &self.aggressive_search,
            &[(CHAT_HISTORY_SLOT, history_text), (FINAL_QUERY_SLOT, query)],
        );
        vec![PromptMessage::user(filled.trim())]
    }

    /// Single user prompt asking for a conversation name
    #[must_use]
    pub fn chat_naming(&self, history_text: &str) -> Vec<PromptMessage> {
        vec![PromptMessage::user(fill_slots(
            &self.chat_naming,
            &[(CHAT_HISTORY_SLOT, history_text)],
        ))]
    }
}

/// Substitute slots in a single pass over the template.
///
/// Inserted values are never rescanned, so slot text inside a value stays literal.
fn fill_slots(template: &str, slots: &[(&str, &str)]) -> String {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let next = slots
            .iter()
            .filter_map(|&(slot, value)| rest.find(slot).map(|at| (at, slot, value)))
            .min_by_key(|&(at, _, _)| at);
        let Some((at, slot, value)) = next else {
            filled.push_str(rest);
            return filled;
        };
        filled.push_str(&rest[..at]);
        filled.push_str(value);
        rest = &rest[at + slot.len()..];
    }
}
