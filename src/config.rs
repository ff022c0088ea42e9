//! Process configuration read from the environment

use crate::history::HistoryLimits;
use crate::llm::LlmConfig;

/// Search-gating switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionConfig {
    /// Skip the model in the aggressive gate and always search
    pub llm_check_disabled: bool,
}

impl DecisionConfig {
    pub fn from_env() -> Self {
        Self {
            llm_check_disabled: env_flag("DISABLE_LLM_CHOOSE_SEARCH"),
        }
    }
}

/// Everything the binary needs at startup
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub llm: LlmConfig,
    pub decision: DecisionConfig,
    pub history: HistoryLimits,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = HistoryLimits::default();
        let history = HistoryLimits {
            token_limit: env_usize("GEN_AI_HISTORY_CUTOFF").or(defaults.token_limit),
            message_limit: env_usize("GEN_AI_HISTORY_MESSAGES").or(defaults.message_limit),
        };

        Self {
            llm: LlmConfig::from_env(),
            decision: DecisionConfig::from_env(),
            history,
        }
    }
}

/// `true` in any case enables the flag; anything else leaves it off
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| parse_flag(&v))
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(var = name, value = %raw, error = %e, "Ignoring unparseable setting");
            None
        }
    }
}
