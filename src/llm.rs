//! Model invocation abstraction
//!
//! Provides a common interface for running a prompt against a language model
//! and getting its raw text back.

mod anthropic;
mod error;
mod models;
mod openai;
mod registry;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use anthropic::{AnthropicModel, AnthropicService};
pub use error::{LlmError, LlmErrorKind};
pub use models::{all_models, find_model, FactoryArgs, ModelDef, Provider};
pub use openai::{OpenAIModel, OpenAIService};
pub use registry::{LlmConfig, ModelRegistry};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for model providers
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Run the prompt and return the model's raw text output
    async fn invoke(&self, prompt: &[PromptMessage]) -> Result<String, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

#[async_trait]
impl<T: ModelInvoker + ?Sized> ModelInvoker for Arc<T> {
    async fn invoke(&self, prompt: &[PromptMessage]) -> Result<String, LlmError> {
        (**self).invoke(prompt).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

/// Logging wrapper for model invokers
pub struct LoggingInvoker {
    inner: Arc<dyn ModelInvoker>,
    model_id: String,
}

impl LoggingInvoker {
    pub fn new(inner: Arc<dyn ModelInvoker>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl ModelInvoker for LoggingInvoker {
    async fn invoke(&self, prompt: &[PromptMessage]) -> Result<String, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.invoke(prompt).await;
        let duration = start.elapsed();

        match &result {
            Ok(output) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    prompt_messages = prompt.len(),
                    prompt_chars = prompt_chars(prompt),
                    output_chars = output.chars().count(),
                    "Model invocation completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "Model invocation failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockInvoker;
    use super::*;

    #[tokio::test]
    async fn test_logging_invoker_passes_through() {
        let mock = Arc::new(MockInvoker::new("mock-model"));
        mock.queue_output("YES_SEARCH");
        let logging = LoggingInvoker::new(mock.clone());

        assert_eq!(logging.model_id(), "mock-model");
        let out = logging.invoke(&[PromptMessage::user("hi")]).await.unwrap();
        assert_eq!(out, "YES_SEARCH");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_logging_invoker_propagates_errors() {
        let mock = Arc::new(MockInvoker::new("mock-model"));
        mock.queue_error(LlmError::rate_limit("slow down"));
        let logging = LoggingInvoker::new(mock);

        let err = logging.invoke(&[]).await.unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::RateLimit);
    }
}
