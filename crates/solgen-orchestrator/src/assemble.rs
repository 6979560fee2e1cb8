//! Assembly of the production component stack

use crate::{GenerationLoop, LoopConfig};
use solgen_core::{Result, SolgenConfig, SolgenError};
use solgen_llm::ChatGenerator;
use solgen_stages::{HttpRpc, MythrilTester, RpcDeployer, SolcChecker};

/// The loop wired to the real generator, toolchain, and chain transport
pub type StandardLoop =
    GenerationLoop<ChatGenerator, SolcChecker, RpcDeployer<HttpRpc>, MythrilTester>;

/// Build the production loop from configuration
pub fn standard_loop(config: &SolgenConfig) -> Result<StandardLoop> {
    let instructions = match &config.generator.prompt_template {
        Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
            SolgenError::Config(format!(
                "cannot read prompt template {}: {}",
                path.display(),
                e
            ))
        })?),
        None => None,
    };

    let generator = ChatGenerator::new(config.generator.clone());
    let checker = SolcChecker::new(&config.tools);
    let deployer = RpcDeployer::new(
        HttpRpc::new(config.chain.rpc_url.clone()),
        &config.tools,
        &config.chain,
    );
    let tester = MythrilTester::new(&config.tools);

    Ok(GenerationLoop::new(
        generator,
        checker,
        deployer,
        tester,
        LoopConfig {
            max_retries: config.max_retries,
            instructions,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_loop_builds_from_defaults() {
        let config = SolgenConfig::default();
        assert!(standard_loop(&config).is_ok());
    }

    #[test]
    fn test_missing_prompt_template_is_an_error() {
        let mut config = SolgenConfig::default();
        config.generator.prompt_template = Some("/nonexistent/solgen-template.txt".into());
        assert!(standard_loop(&config).is_err());
    }
}
