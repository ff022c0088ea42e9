//! Deciding whether retrieval should run before the next answer
//!
//! Two strategies share one policy enum:
//!
//! - `Conversational` frames the whole history as role-tagged turns under a
//!   system instruction. The first turn of a conversation always searches.
//! - `AggregateAggressive` flattens history into one prompt and can be
//!   switched off by configuration, in which case it always searches.
//!
//! Both lean towards search: skipping needs an explicit marker in the model
//! output (see [`parser`]).

mod parser;
#[cfg(test)]
mod proptests;

pub use parser::{DecisionParser, OptOutMarker};

use crate::history::{combine_message_chain, HistoryLimits};
use crate::llm::{LlmError, ModelInvoker};
use crate::message::Message;
use crate::prompts::PromptTemplates;
use serde::{Deserialize, Serialize};

/// Whether retrieval should run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDecision {
    Search,
    NoSearch,
}

impl SearchDecision {
    #[must_use]
    pub fn should_search(self) -> bool {
        matches!(self, SearchDecision::Search)
    }
}

impl From<bool> for SearchDecision {
    fn from(search: bool) -> Self {
        if search {
            SearchDecision::Search
        } else {
            SearchDecision::NoSearch
        }
    }
}

/// Which gating strategy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDecisionPolicy {
    /// Multi-turn prompt, one model call per turn after the first
    Conversational,
    /// Single flattened prompt, can be disabled by configuration
    AggregateAggressive,
}

impl SearchDecisionPolicy {
    /// Parser matching this policy's prompt
    #[must_use]
    pub fn parser(self) -> OptOutMarker {
        match self {
            SearchDecisionPolicy::Conversational => OptOutMarker::conversational(),
            SearchDecisionPolicy::AggregateAggressive => OptOutMarker::aggregate_aggressive(),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SearchDecisionPolicy::Conversational => "conversational",
            SearchDecisionPolicy::AggregateAggressive => "aggregate_aggressive",
        }
    }
}

/// Conversational gate with explicit templates and parser.
///
/// # Errors
///
/// Propagates any error from the model invoker.
pub async fn decide_conversational(
    query: &Message,
    history: &[Message],
    invoker: &dyn ModelInvoker,
    templates: &PromptTemplates,
    parser: &dyn DecisionParser,
) -> Result<SearchDecision, LlmError> {
    // Always start with a retrieval
    if history.is_empty() {
        tracing::debug!(policy = "conversational", "First turn, searching");
        return Ok(SearchDecision::Search);
    }

    let prompt = templates.conversational_search(query, history);
    let output = invoker.invoke(&prompt).await?;
    let decision = parser.parse(&output);

    tracing::debug!(
        policy = "conversational",
        history_turns = history.len(),
        output = %output,
        decision = ?decision,
        "Search decision"
    );

    Ok(decision)
}

/// Aggressive single-prompt gate with explicit templates, limits and parser.
///
/// # Errors
///
/// Propagates any error from the model invoker.
pub async fn decide_aggregate_aggressive(
    query: &Message,
    history: &[Message],
    invoker: &dyn ModelInvoker,
    templates: &PromptTemplates,
    limits: HistoryLimits,
    parser: &dyn DecisionParser,
    disable_check: bool,
) -> Result<SearchDecision, LlmError> {
    if disable_check {
        tracing::debug!(policy = "aggregate_aggressive", "LLM check disabled, searching");
        return Ok(SearchDecision::Search);
    }

    let history_text = combine_message_chain(history, limits);
    let prompt = templates.aggressive_search(&query.content, &history_text);
    let output = invoker.invoke(&prompt).await?;
    let decision = parser.parse(&output);

    tracing::debug!(
        policy = "aggregate_aggressive",
        output = %output,
        decision = ?decision,
        "Run search prediction"
    );

    Ok(decision)
}

/// Decide with the multi-turn strategy and default prompts.
///
/// An empty history returns [`SearchDecision::Search`] without calling the
/// model.
///
/// # Errors
///
/// Propagates any error from the model invoker.
pub async fn decide_search_multi_turn(
    query: &Message,
    history: &[Message],
    invoker: &dyn ModelInvoker,
) -> Result<SearchDecision, LlmError> {
    let policy = SearchDecisionPolicy::Conversational;
    decide_conversational(
        query,
        history,
        invoker,
        &PromptTemplates::default(),
        &policy.parser(),
    )
    .await
}

/// Decide with the single-prompt strategy and default prompts and limits.
///
/// With `disable_check` set the model is not called and the answer is
/// [`SearchDecision::Search`].
///
/// # Errors
///
/// Propagates any error from the model invoker.
pub async fn decide_search_single_shot(
    query: &Message,
    history: &[Message],
    invoker: &dyn ModelInvoker,
    disable_check: bool,
) -> Result<SearchDecision, LlmError> {
    let policy = SearchDecisionPolicy::AggregateAggressive;
    decide_aggregate_aggressive(
        query,
        history,
        invoker,
        &PromptTemplates::default(),
        HistoryLimits::default(),
        &policy.parser(),
        disable_check,
    )
    .await
}
