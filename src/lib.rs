//! Search gating and conversation naming for retrieval-augmented chat
//!
//! Decides, from a conversation's history, whether a retrieval step should run
//! before the next answer, and produces short conversation titles. Both are
//! delegated to a language model through [`llm::ModelInvoker`]; this crate
//! owns the prompt framing and the interpretation of the model's free text.
//!
//! Retrieval is the default. A gate only skips it when the model output
//! carries an explicit opt-out marker.

pub mod config;
pub mod decision;
pub mod gate;
pub mod history;
pub mod llm;
pub mod message;
pub mod naming;
pub mod prompts;

pub use decision::{
    decide_search_multi_turn, decide_search_single_shot, DecisionParser, OptOutMarker,
    SearchDecision, SearchDecisionPolicy,
};
pub use gate::{GateSettings, SearchGate};
pub use message::{Message, MessageRole};
pub use naming::{name_conversation, sanitize_title, ConversationTitle};
