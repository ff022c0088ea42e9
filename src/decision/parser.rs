//! Turning free-text model output into a search decision
//!
//! Skipping retrieval needs an explicit marker in the output. Anything else,
//! including empty or garbled text, means search.

use super::SearchDecision;
use crate::prompts::{NO_SEARCH, SKIP_SEARCH};

/// Maps raw model output to a decision
pub trait DecisionParser: Send + Sync {
    fn parse(&self, output: &str) -> SearchDecision;
}

/// Case-insensitive substring match on the first word of an opt-out phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptOutMarker {
    /// Lowercased needle searched for in the output
    needle: String,
}

impl OptOutMarker {
    /// Marker is the phrase's first word, lowercased, with nothing appended
    #[must_use]
    pub fn first_word(phrase: &str) -> Self {
        Self {
            needle: first_word_lowercase(phrase),
        }
    }

    /// Marker is the phrase's first word, lowercased, followed by one space
    #[must_use]
    pub fn first_word_then_space(phrase: &str) -> Self {
        let mut needle = first_word_lowercase(phrase);
        needle.push(' ');
        Self { needle }
    }

    /// Marker for the conversational gate: `"no_search, "`
    #[must_use]
    pub fn conversational() -> Self {
        Self::first_word_then_space(NO_SEARCH)
    }

    /// Marker for the aggressive gate: `"skip_search"`
    #[must_use]
    pub fn aggregate_aggressive() -> Self {
        Self::first_word(SKIP_SEARCH)
    }

    #[must_use]
    pub fn needle(&self) -> &str {
        &self.needle
    }
}

impl DecisionParser for OptOutMarker {
    fn parse(&self, output: &str) -> SearchDecision {
        // An empty needle would match every output and suppress retrieval
        if self.needle.trim().is_empty() {
            return SearchDecision::Search;
        }
        if output.to_lowercase().contains(&self.needle) {
            SearchDecision::NoSearch
        } else {
            SearchDecision::Search
        }
    }
}

fn first_word_lowercase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase()
}
