//! Outcome types for the generation pipeline
//!
//! Each verification stage reports a structured outcome rather than raising
//! errors past its boundary. The orchestrator folds the latest outcomes into
//! a `Feedback` record that the next generation attempt consumes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Terminal status of the check and deploy stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    Success,
    Failure,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Failure => write!(f, "Failure"),
        }
    }
}

/// Terminal status of the security-test stage
///
/// `Skipped` covers inconclusive conditions (malformed address, scanner
/// unavailable) that are not actionable feedback for the generator and
/// must never count as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    Success,
    Failure,
    Skipped,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Failure => write!(f, "Failure"),
            Self::Skipped => write!(f, "Skipped"),
        }
    }
}

/// One parameter in a contract interface descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    /// Nested members for tuple parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<AbiParam>>,
}

impl AbiParam {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            components: None,
        }
    }
}

/// One entry of a contract interface descriptor (solc ABI JSON shape)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<AbiParam>,
    #[serde(
        rename = "stateMutability",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub state_mutability: Option<String>,
}

impl AbiEntry {
    pub fn is_constructor(&self) -> bool {
        self.entry_type == "constructor"
    }
}

/// Interface descriptors keyed by contract name
pub type AbiMap = BTreeMap<String, Vec<AbiEntry>>;

/// Result of compiling and statically analyzing a candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub status: StageStatus,
    pub errors: Vec<String>,
    /// Interface descriptors per contract, present when compilation succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<AbiMap>,
}

impl CheckOutcome {
    pub fn success(abi: Option<AbiMap>, warnings: Vec<String>) -> Self {
        Self {
            status: StageStatus::Success,
            errors: warnings,
            abi,
        }
    }

    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            status: StageStatus::Failure,
            errors,
            abi: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }
}

/// Result of broadcasting a compiled candidate to the test network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployOutcome {
    pub status: StageStatus,
    pub errors: Vec<String>,
    /// Mined contract address, present iff the deployment succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

impl DeployOutcome {
    pub fn success(contract_address: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Success,
            errors: Vec::new(),
            contract_address: Some(contract_address.into()),
        }
    }

    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            status: StageStatus::Failure,
            errors,
            contract_address: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }
}

/// Result of running the security scanner against a deployed candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub status: TestStatus,
    pub errors: Vec<String>,
}

impl TestOutcome {
    pub fn success() -> Self {
        Self {
            status: TestStatus::Success,
            errors: Vec::new(),
        }
    }

    pub fn failure(errors: Vec<String>) -> Self {
        Self {
            status: TestStatus::Failure,
            errors,
        }
    }

    pub fn skipped(errors: Vec<String>) -> Self {
        Self {
            status: TestStatus::Skipped,
            errors,
        }
    }
}

/// Latest per-stage outcomes threaded into the next generation attempt
///
/// Each field holds the most recent outcome of its stage only. Recording a
/// new outcome replaces the prior one wholesale; history is never appended,
/// which keeps the feedback payload bounded across retries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_results: Option<CheckOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_results: Option<DeployOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_results: Option<TestOutcome>,
}

impl Feedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the check entry with the latest outcome
    pub fn record_check(&mut self, outcome: CheckOutcome) {
        self.check_results = Some(outcome);
    }

    /// Replace the deploy entry with the latest outcome
    pub fn record_deploy(&mut self, outcome: DeployOutcome) {
        self.deploy_results = Some(outcome);
    }

    /// Replace the test entry with the latest outcome
    pub fn record_test(&mut self, outcome: TestOutcome) {
        self.test_results = Some(outcome);
    }

    pub fn is_empty(&self) -> bool {
        self.check_results.is_none() && self.deploy_results.is_none() && self.test_results.is_none()
    }
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Generation,
    Check,
    Deploy,
    Test,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generation => write!(f, "generation"),
            Self::Check => write!(f, "check"),
            Self::Deploy => write!(f, "deploy"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// Record of one full pass through the pipeline
///
/// `candidate` is `None` when generation itself produced nothing usable.
/// Superseded attempts are kept only for diagnostics; the loop never
/// rolls back to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// 1-based attempt ordinal
    pub index: u32,
    pub candidate: Option<String>,
    pub check: Option<CheckOutcome>,
    pub deploy: Option<DeployOutcome>,
    pub test: Option<TestOutcome>,
}

impl Attempt {
    pub fn new(index: u32, candidate: impl Into<String>) -> Self {
        Self {
            index,
            candidate: Some(candidate.into()),
            check: None,
            deploy: None,
            test: None,
        }
    }

    /// Attempt whose generation call returned nothing usable
    pub fn generation_failed(index: u32) -> Self {
        Self {
            index,
            candidate: None,
            check: None,
            deploy: None,
            test: None,
        }
    }

    /// Earliest stage that did not fully succeed in this attempt
    pub fn first_failed_stage(&self) -> Option<Stage> {
        if self.candidate.is_none() {
            return Some(Stage::Generation);
        }
        if let Some(check) = &self.check {
            if !check.is_success() {
                return Some(Stage::Check);
            }
        }
        if let Some(deploy) = &self.deploy {
            if !deploy.is_success() {
                return Some(Stage::Deploy);
            }
        }
        if let Some(test) = &self.test {
            if test.status != TestStatus::Success {
                return Some(Stage::Test);
            }
        }
        None
    }
}

/// Terminal result of one loop run
///
/// Exhausting the retry budget is not an error; it is this value with
/// `succeeded = false` and the last recorded feedback attached for the
/// caller to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopResult {
    pub succeeded: bool,
    pub final_code: Option<String>,
    pub attempts: u32,
    pub feedback: Feedback,
    /// Earliest stage that failed on the final attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error_stage: Option<Stage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_overwrites_per_stage() {
        let mut feedback = Feedback::new();
        feedback.record_check(CheckOutcome::failure(vec!["first".to_string()]));
        feedback.record_check(CheckOutcome::failure(vec!["second".to_string()]));

        let check = feedback.check_results.unwrap();
        assert_eq!(check.errors, vec!["second".to_string()]);
    }

    #[test]
    fn test_feedback_is_empty() {
        let mut feedback = Feedback::new();
        assert!(feedback.is_empty());

        feedback.record_test(TestOutcome::skipped(vec!["scanner missing".to_string()]));
        assert!(!feedback.is_empty());
    }

    #[test]
    fn test_deploy_success_carries_address() {
        let outcome = DeployOutcome::success("0xabc");
        assert!(outcome.is_success());
        assert_eq!(outcome.contract_address.as_deref(), Some("0xabc"));

        let outcome = DeployOutcome::failure(vec!["revert".to_string()]);
        assert!(outcome.contract_address.is_none());
    }

    #[test]
    fn test_first_failed_stage_ordering() {
        let mut attempt = Attempt::new(1, "contract");
        assert_eq!(attempt.first_failed_stage(), None);

        attempt.check = Some(CheckOutcome::failure(vec!["boom".to_string()]));
        attempt.deploy = Some(DeployOutcome::failure(vec!["later".to_string()]));
        assert_eq!(attempt.first_failed_stage(), Some(Stage::Check));

        let failed = Attempt::generation_failed(2);
        assert_eq!(failed.first_failed_stage(), Some(Stage::Generation));
    }

    #[test]
    fn test_skipped_test_counts_as_not_succeeded() {
        let mut attempt = Attempt::new(1, "contract");
        attempt.check = Some(CheckOutcome::success(None, Vec::new()));
        attempt.deploy = Some(DeployOutcome::success("0xabc"));
        attempt.test = Some(TestOutcome::skipped(vec!["bad address".to_string()]));
        assert_eq!(attempt.first_failed_stage(), Some(Stage::Test));
    }

    #[test]
    fn test_abi_entry_parses_solc_shape() {
        let raw = r#"{
            "type": "constructor",
            "inputs": [{"name": "_owner", "type": "address"}],
            "stateMutability": "nonpayable"
        }"#;
        let entry: AbiEntry = serde_json::from_str(raw).unwrap();
        assert!(entry.is_constructor());
        assert_eq!(entry.inputs[0].param_type, "address");
        assert_eq!(entry.state_mutability.as_deref(), Some("nonpayable"));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Generation.to_string(), "generation");
        assert_eq!(Stage::Deploy.to_string(), "deploy");
    }
}
