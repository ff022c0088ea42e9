//! Property-based tests for search gating
//!
//! These tests verify the asymmetry the gates rely on:
//! - Output carrying the opt-out marker (any case, anywhere) skips search
//! - Output without the marker always searches
//! - The first conversational turn and a disabled aggressive check never
//!   reach the model

use super::parser::{DecisionParser, OptOutMarker};
use super::{decide_search_multi_turn, decide_search_single_shot, SearchDecision};
use crate::llm::testing::MockInvoker;
use crate::message::Message;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Free text that cannot contain an underscore, so neither marker can appear
fn arb_plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.!?'\n]{0,120}"
}

/// A case variant of `word`
fn arb_case_variant(word: &'static str) -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
        word.chars()
            .zip(upper)
            .map(|(c, up)| {
                if up {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect()
    })
}

fn arb_history() -> impl Strategy<Value = Vec<Message>> {
    proptest::collection::vec("[a-zA-Z ?]{1,40}", 0..6).prop_map(|texts| {
        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                if i % 2 == 0 {
                    Message::user(text, i)
                } else {
                    Message::assistant(text, i)
                }
            })
            .collect()
    })
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

// ============================================================================
// Parser properties
// ============================================================================

proptest! {
    /// Marker followed by a space anywhere in the output → NoSearch
    #[test]
    fn prop_conversational_marker_anywhere_skips(
        prefix in arb_plain_text(),
        marker in arb_case_variant("NO_SEARCH,"),
        suffix in arb_plain_text(),
    ) {
        let output = format!("{prefix}{marker} {suffix}");
        prop_assert_eq!(
            OptOutMarker::conversational().parse(&output),
            SearchDecision::NoSearch
        );
    }

    /// Aggressive marker anywhere, no trailing space needed → NoSearch
    #[test]
    fn prop_aggressive_marker_anywhere_skips(
        prefix in arb_plain_text(),
        marker in arb_case_variant("SKIP_SEARCH"),
        suffix in arb_plain_text(),
    ) {
        let output = format!("{prefix}{marker}{suffix}");
        prop_assert_eq!(
            OptOutMarker::aggregate_aggressive().parse(&output),
            SearchDecision::NoSearch
        );
    }

    /// Output without either marker → Search for both parsers
    #[test]
    fn prop_unmarked_output_searches(output in arb_plain_text()) {
        prop_assert_eq!(
            OptOutMarker::conversational().parse(&output),
            SearchDecision::Search
        );
        prop_assert_eq!(
            OptOutMarker::aggregate_aggressive().parse(&output),
            SearchDecision::Search
        );
    }

    /// A truncated marker never skips
    #[test]
    fn prop_partial_marker_searches(
        cut in 1usize.."NO_SEARCH,".len(),
        suffix in "[a-z ]{0,20}",
    ) {
        let partial: String = "NO_SEARCH,".chars().take(cut).collect();
        let output = format!("{partial}{suffix}");
        prop_assert_eq!(
            OptOutMarker::conversational().parse(&output),
            SearchDecision::Search
        );
    }
}

// ============================================================================
// Gate properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Empty history → Search, zero model calls, whatever the model would say
    #[test]
    fn prop_first_turn_never_invokes(query in "[a-zA-Z ?]{0,60}", reply in arb_plain_text()) {
        let mock = MockInvoker::replying(reply);
        let query = Message::user(query, 0);
        let decision = block_on(decide_search_multi_turn(&query, &[], &mock)).unwrap();
        prop_assert_eq!(decision, SearchDecision::Search);
        prop_assert_eq!(mock.call_count(), 0);
    }

    /// Disabled check → Search, zero model calls, whatever the history
    #[test]
    fn prop_disabled_check_never_invokes(history in arb_history(), query in "[a-z ]{0,30}") {
        let mock = MockInvoker::replying("SKIP_SEARCH");
        let query = Message::user(query, history.len());
        let decision = block_on(decide_search_single_shot(&query, &history, &mock, true)).unwrap();
        prop_assert_eq!(decision, SearchDecision::Search);
        prop_assert_eq!(mock.call_count(), 0);
    }

    /// The conversational prompt carries every history turn, in order
    #[test]
    fn prop_conversational_prompt_preserves_order(history in arb_history()) {
        prop_assume!(!history.is_empty());
        let mock = MockInvoker::replying("YES_SEARCH");
        let query = Message::user("next?", history.len());
        block_on(decide_search_multi_turn(&query, &history, &mock)).unwrap();

        let prompt = &mock.recorded_prompts()[0];
        prop_assert_eq!(prompt.len(), history.len() + 2);
        for (sent, original) in prompt[1..=history.len()].iter().zip(&history) {
            prop_assert_eq!(sent.role, original.role);
            prop_assert_eq!(&sent.content, &original.content);
        }
    }
}
