//! Model registry for managing available providers
//!
//! Built once at startup. The default invoker it hands out is the shared
//! process-wide model; callers pass it down explicitly.

use super::models::FactoryArgs;
use super::{all_models, LlmError, LoggingInvoker, ModelDef, ModelInvoker};
use std::collections::HashMap;
use std::sync::Arc;

/// Preferred default when the config names none
const PREFERRED_DEFAULT: &str = "gpt-4o";

/// Configuration for model providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Gateway URL that handles provider auth (e.g., `http://169.254.169.254/gateway/llm`)
    pub gateway: Option<String>,
    /// `OpenAI`-compatible server to use instead of api.openai.com
    pub openai_base_url: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            gateway: std::env::var("LLM_GATEWAY").ok(),
            openai_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            default_model: std::env::var("DEFAULT_MODEL").ok(),
        }
    }
}

/// Registry of available models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn ModelInvoker>>,
    default_model: String,
}

impl ModelRegistry {
    #[must_use]
    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn ModelInvoker>> = HashMap::new();

        for model_def in all_models() {
            if let Some(service) = Self::try_create_model(model_def, config) {
                services.insert(model_def.id.to_string(), service);
            }
        }

        let default_model = config
            .default_model
            .clone()
            .or_else(|| {
                if services.contains_key(PREFERRED_DEFAULT) {
                    Some(PREFERRED_DEFAULT.to_string())
                } else {
                    // First available in catalog order, so the choice is stable
                    all_models()
                        .iter()
                        .find(|m| services.contains_key(m.id))
                        .map(|m| m.id.to_string())
                }
            })
            .unwrap_or_else(|| PREFERRED_DEFAULT.to_string());

        Self {
            services,
            default_model,
        }
    }

    /// Try to create a model service, validating prerequisites
    fn try_create_model(model_def: &ModelDef, config: &LlmConfig) -> Option<Arc<dyn ModelInvoker>> {
        // The gateway handles authentication itself
        let api_key = if config.gateway.is_some() {
            "implicit"
        } else {
            match model_def.provider {
                super::Provider::Anthropic => config.anthropic_api_key.as_deref()?,
                super::Provider::OpenAI => config.openai_api_key.as_deref()?,
            }
        };

        let args = FactoryArgs {
            api_key,
            gateway: config.gateway.as_deref(),
            openai_base_url: config.openai_base_url.as_deref(),
        };

        match (model_def.factory)(args) {
            Ok(service) => {
                tracing::debug!(model = %model_def.summary(), "Model registered");
                Some(Arc::new(LoggingInvoker::new(service)))
            }
            Err(e) => {
                tracing::debug!(model = %model_def.summary(), error = %e, "Model unavailable");
                None
            }
        }
    }

    /// Get a model by ID
    #[must_use]
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn ModelInvoker>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    #[must_use]
    pub fn default(&self) -> Option<Arc<dyn ModelInvoker>> {
        self.get(&self.default_model)
    }

    /// The default model, or an error naming what is missing
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` when the default model has no usable credentials.
    pub fn default_invoker(&self) -> Result<Arc<dyn ModelInvoker>, LlmError> {
        self.default().ok_or_else(|| {
            LlmError::not_configured(format!(
                "Model {} is not available. Set OPENAI_API_KEY, ANTHROPIC_API_KEY or LLM_GATEWAY.",
                self.default_model
            ))
        })
    }

    /// Get the default model ID
    #[must_use]
    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    #[must_use]
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Check if any models are available
    #[must_use]
    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }

    /// Get a cheap/fast model for gating and naming calls.
    /// Falls back to the default model when no cheap model is configured.
    #[must_use]
    pub fn get_cheap_model(&self) -> Option<Arc<dyn ModelInvoker>> {
        all_models()
            .iter()
            .filter(|m| m.cheap)
            .find_map(|m| self.get(m.id))
            .or_else(|| self.default())
    }

    /// The cheap model, or an error naming what is missing
    ///
    /// # Errors
    ///
    /// Returns `NotConfigured` when neither a cheap model nor the default is available.
    pub fn cheap_invoker(&self) -> Result<Arc<dyn ModelInvoker>, LlmError> {
        self.get_cheap_model().ok_or_else(|| {
            LlmError::not_configured(format!(
                "No cheap model and default model {} is not available. \
                 Set OPENAI_API_KEY, ANTHROPIC_API_KEY or LLM_GATEWAY.",
                self.default_model
            ))
        })
    }
}
