//! # solgen-llm
//!
//! Code Generator boundary for solgen.
//!
//! Generation is stateless per call: the orchestrator supplies the structured
//! prompt, the previous candidate, and the latest per-stage feedback, and the
//! generator returns the next candidate source. No conversation history is
//! kept across attempts; everything the model needs travels in the request.

mod auth;
mod client;
mod extract;
mod generator;
mod mock;
mod prompt;
mod types;

pub use auth::api_key;
pub use client::ChatGenerator;
pub use extract::extract_source;
pub use generator::CodeGenerator;
pub use mock::{GeneratorCall, MockGenerator};
pub use prompt::{build_generation_prompt, build_revision_messages, feedback_messages};
pub use types::*;
