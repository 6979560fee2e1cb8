//! Code generator contract

use async_trait::async_trait;
use solgen_core::{Feedback, Result};

/// Produces candidate contract source (allows mocking in tests)
///
/// Both methods return the candidate source only; provider failures surface
/// as errors and the orchestrator treats them like an empty generation.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// First generation attempt for a structured prompt
    async fn generate_initial(&self, structured_prompt: &str) -> Result<String>;

    /// Revised attempt incorporating the previous candidate and the latest
    /// per-stage feedback
    async fn generate_with_feedback(
        &self,
        structured_prompt: &str,
        previous_candidate: &str,
        feedback: &Feedback,
    ) -> Result<String>;
}
