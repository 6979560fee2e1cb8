//! Managed development-chain process

use solgen_core::{ChainConfig, Result, SolgenError};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::info;

/// A development chain (anvil, ganache) owned by the service
///
/// The child is spawned with kill-on-drop so the chain never outlives the
/// service, even on abnormal exit paths.
pub struct ChainProcess {
    child: Child,
    command: String,
}

impl ChainProcess {
    /// Start the configured chain command
    pub fn spawn(chain: &ChainConfig) -> Result<Self> {
        let mut command = Command::new(&chain.node_command);
        command
            .args(&chain.node_args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| {
            SolgenError::Node(format!(
                "failed to start '{}': {}; install it or point chain.node_command elsewhere",
                chain.node_command, e
            ))
        })?;

        info!(
            "development chain '{}' started (pid {:?})",
            chain.node_command,
            child.id()
        );

        Ok(Self {
            child,
            command: chain.node_command.clone(),
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Terminate the chain process
    pub async fn shutdown(mut self) -> Result<()> {
        info!("terminating development chain '{}'", self.command);
        self.child
            .kill()
            .await
            .map_err(|e| SolgenError::Node(format!("failed to terminate chain: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_missing_binary_is_an_error() {
        let chain = ChainConfig {
            node_command: "solgen-nonexistent-chain".to_string(),
            ..ChainConfig::default()
        };
        assert!(ChainProcess::spawn(&chain).is_err());
    }

    #[tokio::test]
    async fn test_spawn_and_shutdown() {
        // A plain long-running command stands in for the chain binary
        let chain = ChainConfig {
            node_command: "sleep".to_string(),
            node_args: vec!["30".to_string()],
            ..ChainConfig::default()
        };

        let node = ChainProcess::spawn(&chain).unwrap();
        assert_eq!(node.command(), "sleep");
        node.shutdown().await.unwrap();
    }
}
