//! Centralized model definitions for all providers

use super::anthropic::AnthropicModel;
use super::openai::OpenAIModel;
use super::{AnthropicService, LlmError, ModelInvoker, OpenAIService};
use std::sync::Arc;

/// Model provider enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    /// Get the display name for this provider
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Anthropic => "Anthropic",
            Provider::OpenAI => "OpenAI",
        }
    }

    /// Environment variable holding this provider's API key
    #[must_use]
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

/// Everything a factory needs to build a service
#[derive(Debug, Clone, Copy)]
pub struct FactoryArgs<'a> {
    pub api_key: &'a str,
    pub gateway: Option<&'a str>,
    pub openai_base_url: Option<&'a str>,
}

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID (e.g., "gpt-4o-mini")
    pub id: &'static str,
    pub provider: Provider,
    /// Human-readable description
    pub description: &'static str,
    /// Small and fast enough for gating and naming calls
    pub cheap: bool,
    /// Factory function to create the service
    pub factory: fn(FactoryArgs<'_>) -> Result<Arc<dyn ModelInvoker>, LlmError>,
}

fn openai(model: OpenAIModel, args: FactoryArgs<'_>) -> Result<Arc<dyn ModelInvoker>, LlmError> {
    if args.api_key.is_empty() {
        return Err(LlmError::not_configured(format!(
            "{} requires {} or gateway",
            model.model_id(),
            Provider::OpenAI.api_key_env_var()
        )));
    }
    Ok(Arc::new(OpenAIService::new(
        args.api_key.to_string(),
        model,
        args.gateway,
        args.openai_base_url,
    )?))
}

fn anthropic(
    model: AnthropicModel,
    args: FactoryArgs<'_>,
) -> Result<Arc<dyn ModelInvoker>, LlmError> {
    if args.api_key.is_empty() {
        return Err(LlmError::not_configured(format!(
            "{} requires {} or gateway",
            model.model_id(),
            Provider::Anthropic.api_key_env_var()
        )));
    }
    Ok(Arc::new(AnthropicService::new(
        args.api_key.to_string(),
        model,
        args.gateway,
    )?))
}

/// Get all available model definitions
#[must_use]
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "gpt-4o",
            provider: Provider::OpenAI,
            description: "GPT-4o (general purpose)",
            cheap: false,
            factory: |args| openai(OpenAIModel::GPT4o, args),
        },
        ModelDef {
            id: "gpt-4o-mini",
            provider: Provider::OpenAI,
            description: "GPT-4o mini (fast, inexpensive)",
            cheap: true,
            factory: |args| openai(OpenAIModel::GPT4oMini, args),
        },
        ModelDef {
            id: "gpt-4.1-mini",
            provider: Provider::OpenAI,
            description: "GPT-4.1 mini (fast, inexpensive)",
            cheap: true,
            factory: |args| openai(OpenAIModel::GPT41Mini, args),
        },
        ModelDef {
            id: "gpt-5-mini",
            provider: Provider::OpenAI,
            description: "GPT-5 mini (reasoning, inexpensive)",
            cheap: true,
            factory: |args| openai(OpenAIModel::GPT5Mini, args),
        },
        ModelDef {
            id: "claude-4.5-sonnet",
            provider: Provider::Anthropic,
            description: "Claude Sonnet 4.5 (balanced performance)",
            cheap: false,
            factory: |args| anthropic(AnthropicModel::ClaudeSonnet45, args),
        },
        ModelDef {
            id: "claude-4.5-haiku",
            provider: Provider::Anthropic,
            description: "Claude Haiku 4.5 (fast, efficient)",
            cheap: true,
            factory: |args| anthropic(AnthropicModel::ClaudeHaiku45, args),
        },
    ]
}

impl ModelDef {
    /// One-line summary for logs, e.g. `gpt-4o-mini (OpenAI): GPT-4o mini (fast, inexpensive)`
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} ({}): {}",
            self.id,
            self.provider.display_name(),
            self.description
        )
    }
}

/// Look up a model definition by ID
#[must_use]
pub fn find_model(id: &str) -> Option<&'static ModelDef> {
    all_models().iter().find(|m| m.id == id)
}
