//! Compiler version activation and standard-json compilation

use crate::output::CompilerOutput;
use crate::version::{normalize_requirement, pragma_requirement, MISSING_PRAGMA};
use solgen_core::{Result, SolgenError, ToolsConfig};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Wrapper around `solc` and `solc-select`
///
/// Stateless across calls; the selected version travels to `solc` through the
/// `SOLC_VERSION` environment variable so concurrent calls with different
/// versions cannot trample each other.
#[derive(Debug, Clone)]
pub struct SolcManager {
    solc_bin: String,
    solc_select_bin: String,
}

impl SolcManager {
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            solc_bin: tools.solc_bin.clone(),
            solc_select_bin: tools.solc_select_bin.clone(),
        }
    }

    /// Resolve the candidate's pragma to a concrete compiler version and make
    /// sure that version is installed
    pub async fn resolve_version(&self, source: &str) -> Result<String> {
        let requirement = pragma_requirement(source)
            .ok_or_else(|| SolgenError::Toolchain(MISSING_PRAGMA.to_string()))?;

        let version = normalize_requirement(&requirement).ok_or_else(|| {
            SolgenError::Toolchain(format!(
                "Cannot resolve a concrete compiler version from pragma '{}'.",
                requirement
            ))
        })?;

        self.ensure_version(&version).await?;
        Ok(version)
    }

    /// Install `version` through solc-select unless it is already available
    pub async fn ensure_version(&self, version: &str) -> Result<()> {
        let installed = Command::new(&self.solc_select_bin)
            .arg("versions")
            .output()
            .await
            .map_err(|e| {
                SolgenError::Toolchain(format!(
                    "Failed to run {} versions: {}. Ensure solc-select is installed.",
                    self.solc_select_bin, e
                ))
            })?;

        let listing = String::from_utf8_lossy(&installed.stdout);
        if listing.lines().any(|line| line.trim().starts_with(version)) {
            debug!("solc {} already installed", version);
            return Ok(());
        }

        debug!("installing solc {}", version);
        let output = Command::new(&self.solc_select_bin)
            .args(["install", version])
            .output()
            .await
            .map_err(|e| {
                SolgenError::Toolchain(format!("Failed to run solc-select install: {}", e))
            })?;

        if !output.status.success() {
            return Err(SolgenError::Toolchain(format!(
                "Failed to install solc {}: {}",
                version,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }

    /// Compile `source` with the given compiler version
    pub async fn compile(&self, source: &str, version: &str) -> Result<CompilerOutput> {
        let input = serde_json::json!({
            "language": "Solidity",
            "sources": {
                "Contract.sol": { "content": source }
            },
            "settings": {
                "outputSelection": {
                    "*": { "*": ["abi", "evm.bytecode.object"] }
                }
            }
        });

        debug!("compiling with solc {}", version);

        let mut child = Command::new(&self.solc_bin)
            .arg("--standard-json")
            .env("SOLC_VERSION", version)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SolgenError::Toolchain(format!("Failed to start solc: {}", e)))?;

        // Take stdin so it closes after the write; solc reads until EOF
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.to_string().as_bytes())
                .await
                .map_err(|e| SolgenError::Compile(format!("failed to feed solc: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SolgenError::Compile(format!("solc did not finish: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout).map_err(|_| {
            SolgenError::Compile(format!(
                "solc produced no standard-json output: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        })
    }

    /// Resolve the version and compile in one step
    pub async fn compile_source(&self, source: &str) -> Result<(String, CompilerOutput)> {
        let version = self.resolve_version(source).await?;
        let output = self.compile(source, &version).await?;
        Ok((version, output))
    }
}
