//! Shared entry point bundling a model with its settings
//!
//! A `SearchGate` is built once at startup and cloned into request handlers.
//! It holds no mutable state, so concurrent requests share it freely.

use crate::config::{Config, DecisionConfig};
use crate::decision::{
    decide_aggregate_aggressive, decide_conversational, SearchDecision, SearchDecisionPolicy,
};
use crate::history::HistoryLimits;
use crate::llm::{LlmError, ModelInvoker};
use crate::message::Message;
use crate::naming::{name_conversation_with, ConversationTitle};
use crate::prompts::{PromptTemplates, TemplateError};
use std::sync::Arc;

/// Read-only settings every gate call consults
#[derive(Debug, Clone, Default)]
pub struct GateSettings {
    pub decision: DecisionConfig,
    pub limits: HistoryLimits,
    pub templates: PromptTemplates,
}

impl From<&Config> for GateSettings {
    fn from(config: &Config) -> Self {
        Self {
            decision: config.decision,
            limits: config.history,
            templates: PromptTemplates::default(),
        }
    }
}

#[derive(Clone)]
pub struct SearchGate {
    invoker: Arc<dyn ModelInvoker>,
    settings: Arc<GateSettings>,
}

impl SearchGate {
    /// # Errors
    ///
    /// Fails when a template lacks a required slot.
    pub fn new(invoker: Arc<dyn ModelInvoker>, settings: GateSettings) -> Result<Self, TemplateError> {
        settings.templates.validate()?;
        Ok(Self {
            invoker,
            settings: Arc::new(settings),
        })
    }

    #[must_use]
    pub fn settings(&self) -> &GateSettings {
        &self.settings
    }

    #[must_use]
    pub fn model_id(&self) -> &str {
        self.invoker.model_id()
    }

    /// Run the chosen strategy with the configured defaults
    ///
    /// # Errors
    ///
    /// Propagates any error from the model invoker.
    pub async fn should_search(
        &self,
        policy: SearchDecisionPolicy,
        query: &Message,
        history: &[Message],
    ) -> Result<SearchDecision, LlmError> {
        match policy {
            SearchDecisionPolicy::Conversational => {
                decide_conversational(
                    query,
                    history,
                    self.invoker.as_ref(),
                    &self.settings.templates,
                    &policy.parser(),
                )
                .await
            }
            SearchDecisionPolicy::AggregateAggressive => {
                self.should_search_single_shot(query, history, None).await
            }
        }
    }

    /// Aggressive strategy; `disable_check` overrides the configured flag
    ///
    /// # Errors
    ///
    /// Propagates any error from the model invoker.
    pub async fn should_search_single_shot(
        &self,
        query: &Message,
        history: &[Message],
        disable_check: Option<bool>,
    ) -> Result<SearchDecision, LlmError> {
        let disable_check =
            disable_check.unwrap_or(self.settings.decision.llm_check_disabled);
        let policy = SearchDecisionPolicy::AggregateAggressive;
        decide_aggregate_aggressive(
            query,
            history,
            self.invoker.as_ref(),
            &self.settings.templates,
            self.settings.limits,
            &policy.parser(),
            disable_check,
        )
        .await
    }

    /// # Errors
    ///
    /// Propagates any error from the model invoker.
    pub async fn name_conversation(
        &self,
        history: &[Message],
    ) -> Result<ConversationTitle, LlmError> {
        name_conversation_with(
            history,
            self.invoker.as_ref(),
            &self.settings.templates,
            self.settings.limits,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::MockInvoker;

    fn gate_with(mock: &Arc<MockInvoker>, settings: GateSettings) -> SearchGate {
        SearchGate::new(mock.clone(), settings).unwrap()
    }

    fn history() -> Vec<Message> {
        vec![
            Message::user("What's your return policy?", 0),
            Message::assistant("30 days.", 1),
        ]
    }

    #[test]
    fn test_rejects_broken_templates() {
        let mock = Arc::new(MockInvoker::new("mock-model"));
        let settings = GateSettings {
            templates: PromptTemplates {
                chat_naming: "no slot here".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(SearchGate::new(mock, settings).is_err());
    }

    #[tokio::test]
    async fn test_configured_disable_flag_applies() {
        let mock = Arc::new(MockInvoker::replying("SKIP_SEARCH"));
        let settings = GateSettings {
            decision: DecisionConfig {
                llm_check_disabled: true,
            },
            ..Default::default()
        };
        let gate = gate_with(&mock, settings);
        let query = Message::user("thanks", 2);

        let decision = gate
            .should_search(SearchDecisionPolicy::AggregateAggressive, &query, &history())
            .await
            .unwrap();
        assert_eq!(decision, SearchDecision::Search);
        assert_eq!(mock.call_count(), 0);

        // An explicit override wins over the configured flag
        let decision = gate
            .should_search_single_shot(&query, &history(), Some(false))
            .await
            .unwrap();
        assert_eq!(decision, SearchDecision::NoSearch);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_conversational_uses_custom_templates() {
        let mock = Arc::new(MockInvoker::replying("no_search, covered above"));
        let settings = GateSettings {
            templates: PromptTemplates {
                require_search_system: "Custom gate instruction".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let gate = gate_with(&mock, settings);

        let decision = gate
            .should_search(
                SearchDecisionPolicy::Conversational,
                &Message::user("so 30 days?", 2),
                &history(),
            )
            .await
            .unwrap();
        assert_eq!(decision, SearchDecision::NoSearch);
        assert_eq!(mock.recorded_prompts()[0][0].content, "Custom gate instruction");
    }

    #[tokio::test]
    async fn test_naming_respects_limits() {
        let mock = Arc::new(MockInvoker::replying("\"Returns\""));
        let settings = GateSettings {
            limits: HistoryLimits {
                token_limit: None,
                message_limit: Some(1),
            },
            ..Default::default()
        };
        let gate = gate_with(&mock, settings);

        let title = gate.name_conversation(&history()).await.unwrap();
        assert_eq!(title.as_str(), "Returns");
        let sent = &mock.recorded_prompts()[0][0].content;
        assert!(sent.contains("ASSISTANT:\n30 days."));
        assert!(!sent.contains("return policy"));
    }

    #[tokio::test]
    async fn test_gate_is_shareable_across_tasks() {
        let mock = Arc::new(MockInvoker::new("mock-model"));
        for _ in 0..4 {
            mock.queue_output("YES_SEARCH");
        }
        let gate = gate_with(&mock, GateSettings::default());

        let mut handles = Vec::new();
        for i in 0..4 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                let query = Message::user(format!("question {i}"), 2);
                gate.should_search(SearchDecisionPolicy::Conversational, &query, &history())
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), SearchDecision::Search);
        }
        assert_eq!(mock.call_count(), 4);
        assert_eq!(gate.model_id(), "mock-model");
    }
}
