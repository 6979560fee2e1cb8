//! Security-test stage
//!
//! Runs Mythril's symbolic execution against the candidate source once the
//! deployment produced an address. `Skipped` covers the inconclusive cases
//! (malformed address, scanner not installed) that carry nothing the
//! generator could act on.

use crate::args::is_address;
use crate::Tester;
use async_trait::async_trait;
use serde::Deserialize;
use solgen_core::{Result, SolgenError, TestOutcome, ToolsConfig};
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct MythReport {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    issues: Vec<MythIssue>,
}

#[derive(Debug, Deserialize)]
struct MythIssue {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    severity: Option<String>,
    #[serde(rename = "swc-id", default)]
    swc_id: Option<String>,
}

impl MythIssue {
    fn display_text(&self) -> String {
        let mut text = self.title.clone();
        if let Some(swc) = &self.swc_id {
            text.push_str(&format!(" (SWC-{})", swc));
        }
        if let Some(severity) = &self.severity {
            text.push_str(&format!(" [{}]", severity));
        }
        if !self.description.is_empty() {
            text.push_str(": ");
            text.push_str(self.description.trim());
        }
        text
    }
}

/// Tester backed by the Mythril scanner
pub struct MythrilTester {
    myth_bin: String,
    scan_timeout_secs: u64,
}

impl MythrilTester {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            myth_bin: tools.myth_bin.clone(),
            scan_timeout_secs: tools.scan_timeout_secs,
        }
    }

    async fn scan(&self, candidate: &str) -> Result<TestOutcome> {
        let scratch = tempfile::tempdir()?;
        let contract_path = scratch.path().join("Contract.sol");
        tokio::fs::write(&contract_path, candidate).await?;

        debug!("running {} against {}", self.myth_bin, contract_path.display());

        let output = Command::new(&self.myth_bin)
            .arg("analyze")
            .arg(&contract_path)
            .args(["-o", "json"])
            .args(["--execution-timeout", &self.scan_timeout_secs.to_string()])
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(TestOutcome::skipped(vec![format!(
                    "security scanner '{}' is not installed",
                    self.myth_bin
                )]));
            }
            Err(e) => {
                return Err(SolgenError::Scan(format!(
                    "failed to run {}: {}",
                    self.myth_bin, e
                )));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let report = parse_report(stdout.trim()).ok_or_else(|| {
            SolgenError::Scan(format!(
                "undecodable scanner output: {}",
                truncate(stdout.trim(), 500)
            ))
        })?;

        if let Some(error) = report.error {
            return Err(SolgenError::Scan(error));
        }

        if report.issues.is_empty() {
            info!("security scan found no issues");
            return Ok(TestOutcome::success());
        }

        info!("security scan found {} issue(s)", report.issues.len());
        Ok(TestOutcome::failure(
            report.issues.iter().map(MythIssue::display_text).collect(),
        ))
    }
}

fn parse_report(stdout: &str) -> Option<MythReport> {
    serde_json::from_str(stdout).ok()
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        format!("{}...[truncated]", &s[..max])
    } else {
        s.to_string()
    }
}

#[async_trait]
impl Tester for MythrilTester {
    async fn test(&self, contract_address: &str, candidate: &str) -> TestOutcome {
        if !is_address(contract_address) {
            return TestOutcome::skipped(vec![format!(
                "not a well-formed contract address: {}",
                contract_address
            )]);
        }

        match self.scan(candidate).await {
            Ok(outcome) => outcome,
            Err(e) => TestOutcome::failure(vec![e.to_string()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solgen_core::TestStatus;

    #[tokio::test]
    async fn test_malformed_address_is_skipped() {
        let tester = MythrilTester::new(&ToolsConfig::default());
        let outcome = tester.test("0x1234", "pragma solidity ^0.8.0;").await;

        assert_eq!(outcome.status, TestStatus::Skipped);
        assert!(outcome.errors[0].contains("not a well-formed"));
    }

    #[tokio::test]
    async fn test_missing_scanner_is_skipped() {
        let tools = ToolsConfig {
            myth_bin: "solgen-nonexistent-scanner".to_string(),
            ..ToolsConfig::default()
        };
        let tester = MythrilTester::new(&tools);
        let outcome = tester
            .test(
                "0x5fbdb2315678afecb367f032d93f642f64180aa3",
                "pragma solidity ^0.8.0;",
            )
            .await;

        assert_eq!(outcome.status, TestStatus::Skipped);
        assert!(outcome.errors[0].contains("not installed"));
    }

    #[test]
    fn test_report_with_issues() {
        let raw = r#"{
            "error": null,
            "issues": [
                {
                    "title": "Integer Arithmetic Bugs",
                    "description": "The arithmetic operator can overflow.",
                    "severity": "High",
                    "swc-id": "101"
                }
            ],
            "success": true
        }"#;
        let report = parse_report(raw).unwrap();
        assert_eq!(report.issues.len(), 1);

        let text = report.issues[0].display_text();
        assert!(text.contains("Integer Arithmetic Bugs"));
        assert!(text.contains("SWC-101"));
        assert!(text.contains("[High]"));
        assert!(text.contains("overflow"));
    }

    #[test]
    fn test_clean_report() {
        let report = parse_report(r#"{"error": null, "issues": [], "success": true}"#).unwrap();
        assert!(report.issues.is_empty());
        assert!(report.error.is_none());
    }

    #[test]
    fn test_undecodable_report() {
        assert!(parse_report("mythril crashed hard").is_none());
    }
}
