//! Slither static analysis wrapper

use serde::Deserialize;
use solgen_core::{Result, SolgenError};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SlitherReport {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: SlitherResults,
}

#[derive(Debug, Default, Deserialize)]
struct SlitherResults {
    #[serde(default)]
    detectors: Vec<SlitherDetector>,
}

#[derive(Debug, Deserialize)]
struct SlitherDetector {
    #[serde(default)]
    check: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Runs Slither against a contract file and collects its findings
#[derive(Debug, Clone)]
pub struct SlitherRunner {
    bin: String,
}

impl SlitherRunner {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// Analyze `contract_path`, writing the report into `scratch`
    ///
    /// Returns one formatted string per detected issue. An empty vector means
    /// a clean run. Failure to execute or to produce a report is an error for
    /// the caller to classify.
    pub async fn analyze(&self, contract_path: &Path, scratch: &Path) -> Result<Vec<String>> {
        let report_path = scratch.join("slither-report.json");

        debug!("running slither on {}", contract_path.display());

        // Slither exits nonzero when findings exist; only a missing report
        // signals an execution problem.
        let output = Command::new(&self.bin)
            .arg(contract_path)
            .arg("--json")
            .arg(&report_path)
            .output()
            .await
            .map_err(|e| {
                SolgenError::Analysis(format!("failed to run {}: {}", self.bin, e))
            })?;

        let raw = tokio::fs::read_to_string(&report_path).await.map_err(|_| {
            SolgenError::Analysis(format!(
                "{} produced no report: {}",
                self.bin,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        })?;

        let report: SlitherReport = serde_json::from_str(&raw)
            .map_err(|e| SolgenError::Analysis(format!("unreadable slither report: {}", e)))?;

        if !report.success {
            return Err(SolgenError::Analysis(
                report
                    .error
                    .unwrap_or_else(|| "slither reported an unspecified failure".to_string()),
            ));
        }

        Ok(report
            .results
            .detectors
            .iter()
            .map(|detector| {
                format!(
                    "{}: {}",
                    detector.check.as_deref().unwrap_or("unknown-check"),
                    detector
                        .description
                        .as_deref()
                        .unwrap_or("no description provided")
                        .trim()
                )
            })
            .collect())
    }
}
