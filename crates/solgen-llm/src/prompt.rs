//! Prompt construction for contract generation
//!
//! Builds the structured generation instruction from the raw user prompt,
//! and threads per-stage feedback into revision requests in fixed
//! check -> deploy -> test order. Earlier-pipeline failures are logically
//! prerequisite to later ones, so the ordering never varies.

use crate::types::ChatMessage;
use solgen_core::{Feedback, TestStatus};

/// Built-in instruction preamble, used unless a template overrides it
const DEFAULT_INSTRUCTIONS: &str = "\
Write a complete Solidity smart contract implementing the request below.

Requirements:
- Start with an SPDX license identifier and an explicit `pragma solidity` version directive.
- Establish clear ownership with access control on every administrative function.
- Validate all externally supplied inputs and revert with descriptive messages.
- Guard state-changing external calls against reentrancy.
- Emit events for every significant state change.
- Avoid placeholder fragments; the contract must compile and deploy as written.
- Keep the code gas-conscious without sacrificing safety checks.
- Document each public function with a short natspec comment.";

/// Closing instruction appended to every generation request
const OUTPUT_INSTRUCTION: &str = "\
Output only the Solidity source code, with no commentary or surrounding text.";

/// Instruction appended to revision requests after the feedback sections
const REVISION_INSTRUCTION: &str = "\
Rewrite the contract so that every issue above is resolved. \
Output only the corrected Solidity source code and nothing else.";

/// Build the structured generation prompt from the raw user prompt
///
/// `instructions` replaces the built-in preamble when a template file is
/// configured.
pub fn build_generation_prompt(user_prompt: &str, instructions: Option<&str>) -> String {
    let cleaned: Vec<&str> = user_prompt.split_whitespace().collect();
    let cleaned = cleaned.join(" ");

    let mut prompt = String::new();
    prompt.push_str(instructions.unwrap_or(DEFAULT_INSTRUCTIONS).trim_end());
    prompt.push_str("\n\nRequest: ");
    prompt.push_str(&cleaned);
    prompt.push_str("\n\n");
    prompt.push_str(OUTPUT_INSTRUCTION);
    prompt
}

/// Render the failure entries of `feedback` as contextual messages,
/// in fixed check -> deploy -> test order
///
/// Successful and skipped outcomes are omitted: they carry nothing the
/// generator can act on.
pub fn feedback_messages(feedback: &Feedback) -> Vec<String> {
    let mut messages = Vec::new();

    if let Some(check) = &feedback.check_results {
        if !check.is_success() {
            let mut text =
                String::from("Compiling and analyzing the previous contract reported:\n");
            push_items(&mut text, &check.errors);
            messages.push(text);
        }
    }

    if let Some(deploy) = &feedback.deploy_results {
        if !deploy.is_success() {
            let mut text =
                String::from("Deploying the previous contract to the test network failed:\n");
            push_items(&mut text, &deploy.errors);
            messages.push(text);
        }
    }

    if let Some(test) = &feedback.test_results {
        if test.status == TestStatus::Failure {
            let mut text =
                String::from("The security scan of the deployed contract found:\n");
            push_items(&mut text, &test.errors);
            messages.push(text);
        }
    }

    messages
}

/// Assemble the chat messages for a revision request
///
/// The prior candidate precedes the feedback sections, and the request ends
/// with an instruction to output only corrected code.
pub fn build_revision_messages(
    structured_prompt: &str,
    previous_candidate: &str,
    feedback: &Feedback,
) -> Vec<ChatMessage> {
    let mut messages = vec![
        ChatMessage::system(structured_prompt),
        ChatMessage::assistant(previous_candidate),
    ];

    let mut request = String::new();
    for section in feedback_messages(feedback) {
        request.push_str(&section);
        request.push('\n');
    }
    request.push_str(REVISION_INSTRUCTION);
    messages.push(ChatMessage::user(request));

    messages
}

fn push_items(text: &mut String, items: &[String]) {
    for item in items {
        text.push_str("- ");
        text.push_str(item);
        text.push('\n');
    }
}
