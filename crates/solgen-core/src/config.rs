//! Configuration management for solgen
//!
//! Settings load from `.solgen/config.toml` under the working directory when
//! present and fall back to defaults otherwise. Every field is individually
//! defaulted so partial files stay valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Result, SolgenError};

/// Top-level solgen configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolgenConfig {
    /// Maximum generation attempts per loop run
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Code generation backend
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Test network and managed chain process
    #[serde(default)]
    pub chain: ChainConfig,

    /// External verification tooling
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Chat-completions generation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Model identifier sent to the completions endpoint
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Chat-completions endpoint
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Optional file overriding the built-in generation instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<PathBuf>,
}

/// Test network settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the development chain
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Milliseconds between receipt polls
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,

    /// Receipt polls before giving up on a transaction
    #[serde(default = "default_receipt_poll_attempts")]
    pub receipt_poll_attempts: u32,

    /// Command used by `solgen serve` to start a development chain
    #[serde(default = "default_node_command")]
    pub node_command: String,

    /// Extra arguments for the chain command (e.g. `["-p", "8545"]` for ganache)
    #[serde(default)]
    pub node_args: Vec<String>,
}

/// External tool binaries used by the verification stages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_solc_bin")]
    pub solc_bin: String,

    #[serde(default = "default_solc_select_bin")]
    pub solc_select_bin: String,

    #[serde(default = "default_slither_bin")]
    pub slither_bin: String,

    #[serde(default = "default_myth_bin")]
    pub myth_bin: String,

    /// Symbolic execution budget for one scanner invocation
    #[serde(default = "default_scan_timeout")]
    pub scan_timeout_secs: u64,
}

// Default value providers
fn default_max_retries() -> u32 {
    5
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_api_base() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_request_timeout() -> u64 {
    120
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_receipt_poll_ms() -> u64 {
    500
}

fn default_receipt_poll_attempts() -> u32 {
    60
}

fn default_node_command() -> String {
    "anvil".to_string()
}

fn default_solc_bin() -> String {
    "solc".to_string()
}

fn default_solc_select_bin() -> String {
    "solc-select".to_string()
}

fn default_slither_bin() -> String {
    "slither".to_string()
}

fn default_myth_bin() -> String {
    "myth".to_string()
}

fn default_scan_timeout() -> u64 {
    90
}

impl SolgenConfig {
    /// Load configuration from `.solgen/config.toml` or use defaults
    pub fn load_or_default(root: &Path) -> Result<Self> {
        let config_path = root.join(".solgen/config.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)
                .map_err(|e| SolgenError::Config(format!("failed to parse config file: {}", e)))
        } else {
            Ok(Self::default())
        }
    }
}

impl Default for SolgenConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            generator: GeneratorConfig::default(),
            chain: ChainConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            api_base: default_api_base(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
            prompt_template: None,
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            receipt_poll_ms: default_receipt_poll_ms(),
            receipt_poll_attempts: default_receipt_poll_attempts(),
            node_command: default_node_command(),
            node_args: Vec::new(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            solc_bin: default_solc_bin(),
            solc_select_bin: default_solc_select_bin(),
            slither_bin: default_slither_bin(),
            myth_bin: default_myth_bin(),
            scan_timeout_secs: default_scan_timeout(),
        }
    }
}
