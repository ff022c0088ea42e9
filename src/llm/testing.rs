//! Mock invoker for tests
//!
//! Returns queued outputs and records every prompt it receives.

use super::{LlmError, ModelInvoker, PromptMessage};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock model that returns queued outputs
pub struct MockInvoker {
    outputs: Mutex<VecDeque<Result<String, LlmError>>>,
    model_id: String,
    /// Record of all prompts received
    pub prompts: Mutex<Vec<Vec<PromptMessage>>>,
}

impl MockInvoker {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            outputs: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Mock with a single queued output
    pub fn replying(output: impl Into<String>) -> Self {
        let mock = Self::new("mock-model");
        mock.queue_output(output);
        mock
    }

    /// Queue a successful output
    pub fn queue_output(&self, output: impl Into<String>) {
        self.outputs.lock().unwrap().push_back(Ok(output.into()));
    }

    /// Queue an error
    pub fn queue_error(&self, error: LlmError) {
        self.outputs.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded prompts
    pub fn recorded_prompts(&self) -> Vec<Vec<PromptMessage>> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelInvoker for MockInvoker {
    async fn invoke(&self, prompt: &[PromptMessage]) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_vec());
        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock output queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
