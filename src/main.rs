//! search-gate - command line front end for the search gate
//!
//! Reads a JSON transcript from stdin and prints the decision or title as
//! JSON on stdout:
//!
//! ```text
//! echo '{"history":[{"role":"user","content":"What is the refund window?"}],
//!        "query":"30 days, right?"}' | search-gate conversational
//! ```

use search_gate::config::Config;
use search_gate::llm::ModelRegistry;
use search_gate::message::assign_positions;
use search_gate::{GateSettings, Message, SearchDecisionPolicy, SearchGate};
use serde::Deserialize;
use std::io::Read;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: search-gate <conversational|aggressive|name> < transcript.json";

#[derive(Debug, Deserialize)]
struct Transcript {
    #[serde(default)]
    history: Vec<Message>,
    #[serde(default)]
    query: Option<String>,
}

enum Command {
    Decide(SearchDecisionPolicy),
    Name,
}

fn parse_command(arg: Option<&str>) -> Option<Command> {
    match arg? {
        "conversational" => Some(Command::Decide(SearchDecisionPolicy::Conversational)),
        "aggressive" => Some(Command::Decide(SearchDecisionPolicy::AggregateAggressive)),
        "name" => Some(Command::Name),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout carries the result
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "search_gate=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let arg = std::env::args().nth(1);
    let Some(command) = parse_command(arg.as_deref()) else {
        return Err(USAGE.into());
    };

    let config = Config::from_env();

    // Built once; every call below shares this model
    let registry = ModelRegistry::new(&config.llm);
    let invoker = registry.cheap_invoker()?;
    tracing::info!(
        model = %invoker.model_id(),
        models = ?registry.available_models(),
        llm_check_disabled = config.decision.llm_check_disabled,
        "Search gate initialized"
    );

    let gate = SearchGate::new(Arc::clone(&invoker), GateSettings::from(&config))?;

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let mut transcript: Transcript = serde_json::from_str(&input)?;
    assign_positions(&mut transcript.history);

    let output = match command {
        Command::Decide(policy) => {
            let query_text = transcript
                .query
                .ok_or("transcript needs a \"query\" field for search decisions")?;
            let query = Message::user(query_text, transcript.history.len());
            let decision = gate
                .should_search(policy, &query, &transcript.history)
                .await?;
            serde_json::json!({
                "policy": policy.name(),
                "decision": decision,
                "search": decision.should_search(),
            })
        }
        Command::Name => {
            let title = gate.name_conversation(&transcript.history).await?;
            serde_json::json!({ "title": title })
        }
    };

    println!("{output}");
    Ok(())
}
