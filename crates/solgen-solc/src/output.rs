//! Typed view of `solc --standard-json` output

use serde::Deserialize;
use solgen_core::{AbiEntry, AbiMap};
use std::collections::BTreeMap;

/// Diagnostic severity reported by solc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One compiler diagnostic
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerDiagnostic {
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
    /// Pre-rendered message with source location, preferred for display
    #[serde(rename = "formattedMessage", default)]
    pub formatted_message: Option<String>,
    #[serde(rename = "type", default)]
    pub diagnostic_type: Option<String>,
}

impl CompilerDiagnostic {
    pub fn display_text(&self) -> String {
        self.formatted_message
            .clone()
            .unwrap_or_else(|| self.message.clone())
    }
}

/// Compiled artifact for one contract
#[derive(Debug, Clone, Deserialize)]
pub struct ContractArtifact {
    #[serde(default)]
    pub abi: Vec<AbiEntry>,
    #[serde(default)]
    pub evm: Option<EvmArtifact>,
}

impl ContractArtifact {
    /// Creation bytecode as a bare hex string, when present and non-empty
    pub fn creation_bytecode(&self) -> Option<&str> {
        self.evm
            .as_ref()
            .and_then(|evm| evm.bytecode.as_ref())
            .map(|bytecode| bytecode.object.as_str())
            .filter(|object| !object.is_empty())
    }

    /// The constructor ABI entry, if the contract declares one
    pub fn constructor(&self) -> Option<&AbiEntry> {
        self.abi.iter().find(|entry| entry.is_constructor())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvmArtifact {
    #[serde(default)]
    pub bytecode: Option<BytecodeArtifact>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BytecodeArtifact {
    #[serde(default)]
    pub object: String,
}

/// Full standard-json compiler output
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerOutput {
    #[serde(default)]
    pub errors: Vec<CompilerDiagnostic>,
    /// source file -> contract name -> artifact
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractArtifact>>,
}

impl CompilerOutput {
    /// Whether any error-severity diagnostic was produced
    pub fn has_blocking_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    /// Human-readable error- and warning-severity diagnostics, in order
    pub fn formatted_diagnostics(&self) -> Vec<String> {
        self.errors
            .iter()
            .filter(|diagnostic| diagnostic.severity != Severity::Info)
            .map(CompilerDiagnostic::display_text)
            .collect()
    }

    /// Interface descriptors keyed by contract name, across all source files
    pub fn abi_map(&self) -> AbiMap {
        let mut map = AbiMap::new();
        for contracts in self.contracts.values() {
            for (name, artifact) in contracts {
                map.insert(name.clone(), artifact.abi.clone());
            }
        }
        map
    }

    /// The contract to deploy: the last one with non-empty creation bytecode
    ///
    /// Interfaces and abstract contracts compile to empty bytecode, and the
    /// principal contract conventionally comes last in the source.
    pub fn deployable_contract(&self) -> Option<(&str, &ContractArtifact)> {
        self.contracts
            .values()
            .flat_map(|contracts| contracts.iter())
            .filter(|(_, artifact)| artifact.creation_bytecode().is_some())
            .map(|(name, artifact)| (name.as_str(), artifact))
            .last()
    }
}
