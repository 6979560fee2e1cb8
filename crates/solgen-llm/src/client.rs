//! Chat-completions client for contract generation
//!
//! Each generation call is stateless: the full context (structured prompt,
//! prior candidate, feedback) travels in the request, so retried attempts
//! never depend on provider-side conversation state.

use crate::auth;
use crate::extract::extract_source;
use crate::generator::CodeGenerator;
use crate::prompt::build_revision_messages;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, GenerationRecord};
use async_trait::async_trait;
use chrono::Utc;
use solgen_core::{Feedback, GeneratorConfig, Result, SolgenError};
use std::time::Duration;

// Provider retry configuration
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;

/// Generator backed by an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone)]
pub struct ChatGenerator {
    config: GeneratorConfig,
    client: reqwest::Client,
}

impl ChatGenerator {
    /// Create a new generator from configuration
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Send one chat request and extract the candidate source from the reply
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<GenerationRecord> {
        let api_key = auth::api_key(&self.config.api_key_env)?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages,
        };

        let mut retries = 0;
        let mut backoff_secs = INITIAL_BACKOFF_SECS;

        loop {
            tracing::debug!("sending generation request (attempt {})", retries + 1);

            let response = self
                .client
                .post(&self.config.api_base)
                .bearer_auth(&api_key)
                .timeout(Duration::from_secs(self.config.request_timeout_secs))
                .json(&request)
                .send()
                .await
                .map_err(|e| SolgenError::Provider(format!("failed to send request: {}", e)))?;

            let status = response.status();

            // Rate limit (429): honor retry-after, then back off exponentially
            if status.as_u16() == 429 {
                retries += 1;
                if retries > MAX_RETRIES {
                    return Err(SolgenError::Provider(format!(
                        "rate limited after {} retries",
                        MAX_RETRIES
                    )));
                }

                let wait_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(backoff_secs);

                tracing::warn!(
                    "rate limited (429), waiting {}s before retry {}/{}",
                    wait_secs,
                    retries,
                    MAX_RETRIES
                );
                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                continue;
            }

            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown".to_string());

                if status.is_server_error() && retries < MAX_RETRIES {
                    retries += 1;
                    tracing::warn!(
                        "provider error ({}), waiting {}s before retry {}/{}",
                        status,
                        backoff_secs,
                        retries,
                        MAX_RETRIES
                    );
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(MAX_BACKOFF_SECS);
                    continue;
                }

                return Err(SolgenError::Provider(format!(
                    "provider error {}: {}",
                    status, error_text
                )));
            }

            let chat_response: ChatResponse = response
                .json()
                .await
                .map_err(|e| SolgenError::Provider(format!("failed to parse response: {}", e)))?;

            let reply = chat_response
                .choices
                .first()
                .map(|choice| choice.message.content.clone())
                .ok_or_else(|| SolgenError::Provider("no choices in response".to_string()))?;

            let source = extract_source(&reply);

            if let Some(usage) = &chat_response.usage {
                tracing::info!(
                    "generation complete ({} chars, {} prompt tokens, {} completion tokens)",
                    source.len(),
                    usage.prompt_tokens,
                    usage.completion_tokens
                );
            } else {
                tracing::info!("generation complete ({} chars)", source.len());
            }

            return Ok(GenerationRecord {
                source,
                timestamp: Utc::now(),
                usage: chat_response.usage,
            });
        }
    }
}

#[async_trait]
impl CodeGenerator for ChatGenerator {
    async fn generate_initial(&self, structured_prompt: &str) -> Result<String> {
        let messages = vec![ChatMessage::system(structured_prompt)];
        let record = self.complete(messages).await?;
        Ok(record.source)
    }

    async fn generate_with_feedback(
        &self,
        structured_prompt: &str,
        previous_candidate: &str,
        feedback: &Feedback,
    ) -> Result<String> {
        let messages = build_revision_messages(structured_prompt, previous_candidate, feedback);
        let record = self.complete(messages).await?;
        Ok(record.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_generate_without_api_key_fails() {
        let config = GeneratorConfig {
            api_key_env: "SOLGEN_CLIENT_TEST_UNSET_KEY".to_string(),
            ..GeneratorConfig::default()
        };
        std::env::remove_var("SOLGEN_CLIENT_TEST_UNSET_KEY");

        let generator = ChatGenerator::new(config);
        let result = generator.generate_initial("prompt").await;
        assert!(matches!(result, Err(SolgenError::Auth(_))));
    }
}
