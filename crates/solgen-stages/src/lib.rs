//! # solgen-stages
//!
//! The three verification stages of the solgen pipeline, each behind a trait
//! seam so the orchestrator can be exercised without external tools.
//!
//! Stages are stateless pure functions from (candidate, context) to a
//! structured outcome. No stage lets an internal error escape its boundary;
//! an unexpected failure becomes a `Failure` outcome carrying the failure's
//! description.

mod args;
mod checker;
mod deployer;
mod rpc;
mod tester;

pub use args::{encode_words, is_address, synthesize_constructor_args, ArgValue, UINT_SENTINEL};
pub use checker::SolcChecker;
pub use deployer::RpcDeployer;
pub use rpc::{EthRpc, HttpRpc, MockRpc};
pub use tester::MythrilTester;

use async_trait::async_trait;
use solgen_core::{CheckOutcome, DeployOutcome, TestOutcome};

/// Compiles and statically analyzes a candidate
#[async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self, candidate: &str) -> CheckOutcome;
}

/// Broadcasts a compiled candidate to the test network
#[async_trait]
pub trait Deployer: Send + Sync {
    async fn deploy(&self, candidate: &str) -> DeployOutcome;
}

/// Runs a dynamic security scan against a deployed candidate
#[async_trait]
pub trait Tester: Send + Sync {
    async fn test(&self, contract_address: &str, candidate: &str) -> TestOutcome;
}
