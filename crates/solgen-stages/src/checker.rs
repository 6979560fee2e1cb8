//! Compile-and-analyze stage

use crate::Checker;
use async_trait::async_trait;
use solgen_core::{CheckOutcome, Result, StageStatus, ToolsConfig};
use solgen_solc::{SlitherRunner, SolcManager};
use tracing::{debug, info};

/// Checker backed by solc and Slither
///
/// Blocking policy: error-severity compiler diagnostics and Slither findings
/// fail the check; pure compiler warnings are surfaced but do not. A Slither
/// run that could not execute is surfaced as a non-blocking note, since it
/// says nothing about the candidate itself.
pub struct SolcChecker {
    solc: SolcManager,
    slither: SlitherRunner,
}

impl SolcChecker {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            solc: SolcManager::new(tools),
            slither: SlitherRunner::new(tools.slither_bin.clone()),
        }
    }

    async fn run(&self, candidate: &str) -> Result<CheckOutcome> {
        let version = match self.solc.resolve_version(candidate).await {
            Ok(version) => version,
            Err(e) => return Ok(CheckOutcome::failure(vec![e.to_string()])),
        };

        let output = match self.solc.compile(candidate, &version).await {
            Ok(output) => output,
            Err(e) => return Ok(CheckOutcome::failure(vec![e.to_string()])),
        };

        let mut errors = output.formatted_diagnostics();

        if output.has_blocking_errors() {
            info!("compilation produced blocking errors");
            return Ok(CheckOutcome::failure(errors));
        }

        // The candidate lives in a scratch dir scoped to this call; the
        // directory is removed on drop on every exit path.
        let scratch = tempfile::tempdir()?;
        let contract_path = scratch.path().join("Contract.sol");
        tokio::fs::write(&contract_path, candidate).await?;

        let finding_count = match self.slither.analyze(&contract_path, scratch.path()).await {
            Ok(findings) => {
                let count = findings.len();
                errors.extend(findings);
                count
            }
            Err(e) => {
                debug!("static analysis unavailable: {}", e);
                errors.push(format!("static analysis skipped: {}", e));
                0
            }
        };

        let status = if finding_count > 0 {
            StageStatus::Failure
        } else {
            StageStatus::Success
        };
        let abi = Some(output.abi_map()).filter(|abi| !abi.is_empty());

        Ok(CheckOutcome { status, errors, abi })
    }
}

#[async_trait]
impl Checker for SolcChecker {
    async fn check(&self, candidate: &str) -> CheckOutcome {
        match self.run(candidate).await {
            Ok(outcome) => outcome,
            Err(e) => CheckOutcome::failure(vec![e.to_string()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solgen_solc::MISSING_PRAGMA;

    // The full check path needs solc and slither on PATH; these tests cover
    // the fail-fast paths that do not.

    #[tokio::test]
    async fn test_missing_pragma_fails_fast() {
        let checker = SolcChecker::new(&ToolsConfig::default());
        let outcome = checker.check("contract A { }").await;

        assert_eq!(outcome.status, StageStatus::Failure);
        assert_eq!(outcome.errors, vec![MISSING_PRAGMA.to_string()]);
        assert!(outcome.abi.is_none());
    }

    #[tokio::test]
    async fn test_unresolvable_pragma_fails_fast() {
        let checker = SolcChecker::new(&ToolsConfig::default());
        let outcome = checker
            .check("pragma solidity latest;\ncontract A { }")
            .await;

        assert_eq!(outcome.status, StageStatus::Failure);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("Cannot resolve"));
    }
}
