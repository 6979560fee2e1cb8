//! Scripted generator for testing the loop without a provider

use crate::generator::CodeGenerator;
use async_trait::async_trait;
use solgen_core::{Feedback, Result, SolgenError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded call made against a [`MockGenerator`]
#[derive(Debug, Clone)]
pub struct GeneratorCall {
    /// False for revision calls
    pub initial: bool,
    pub previous_candidate: Option<String>,
    pub feedback: Option<Feedback>,
}

enum Scripted {
    Source(String),
    ProviderError(String),
}

struct MockState {
    queue: VecDeque<Scripted>,
    last: Option<String>,
    calls: Vec<GeneratorCall>,
}

/// Generator returning pre-scripted responses in order
///
/// When the script runs out, the last scripted source repeats, which models a
/// provider that keeps producing the same candidate every attempt.
pub struct MockGenerator {
    state: Mutex<MockState>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                queue: VecDeque::new(),
                last: None,
                calls: Vec::new(),
            }),
        }
    }

    /// Queue a candidate source to return
    pub fn with_response(self, source: impl Into<String>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.queue.push_back(Scripted::Source(source.into()));
        }
        self
    }

    /// Queue a provider error to return
    pub fn with_provider_error(self, message: impl Into<String>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.queue.push_back(Scripted::ProviderError(message.into()));
        }
        self
    }

    /// All calls received so far
    pub fn calls(&self) -> Vec<GeneratorCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn next(&self, call: GeneratorCall) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);

        match state.queue.pop_front() {
            Some(Scripted::Source(source)) => {
                state.last = Some(source.clone());
                Ok(source)
            }
            Some(Scripted::ProviderError(message)) => Err(SolgenError::Provider(message)),
            None => state
                .last
                .clone()
                .ok_or_else(|| SolgenError::Provider("mock generator has no script".to_string())),
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CodeGenerator for MockGenerator {
    async fn generate_initial(&self, _structured_prompt: &str) -> Result<String> {
        self.next(GeneratorCall {
            initial: true,
            previous_candidate: None,
            feedback: None,
        })
    }

    async fn generate_with_feedback(
        &self,
        _structured_prompt: &str,
        previous_candidate: &str,
        feedback: &Feedback,
    ) -> Result<String> {
        self.next(GeneratorCall {
            initial: false,
            previous_candidate: Some(previous_candidate.to_string()),
            feedback: Some(feedback.clone()),
        })
    }
}
