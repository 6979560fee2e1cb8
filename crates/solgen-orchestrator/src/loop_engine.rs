//! The generate-verify-deploy retry loop

use solgen_core::{Attempt, CheckOutcome, Feedback, LoopResult, StageStatus, TestStatus};
use solgen_llm::{build_generation_prompt, CodeGenerator};
use solgen_stages::{Checker, Deployer, Tester};
use tracing::{info, warn};

/// Configuration for one loop run
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum generation attempts
    pub max_retries: u32,
    /// Instruction preamble overriding the built-in one
    pub instructions: Option<String>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            instructions: None,
        }
    }
}

/// The bounded retry loop driving generator and stages
///
/// Stages execute strictly in order within an attempt, and a stage failure
/// skips everything downstream of it for that attempt; a candidate already
/// known to be broken earns no further compute or RPC traffic.
pub struct GenerationLoop<G, C, D, T> {
    generator: G,
    checker: C,
    deployer: D,
    tester: T,
    config: LoopConfig,
}

impl<G, C, D, T> GenerationLoop<G, C, D, T>
where
    G: CodeGenerator,
    C: Checker,
    D: Deployer,
    T: Tester,
{
    pub fn new(generator: G, checker: C, deployer: D, tester: T, config: LoopConfig) -> Self {
        Self {
            generator,
            checker,
            deployer,
            tester,
            config,
        }
    }

    /// Run the loop for one prompt
    ///
    /// Never fails: exhausting the retry budget is a `LoopResult` with
    /// `succeeded = false` and the final feedback attached, not an error.
    pub async fn run(&self, prompt: &str) -> LoopResult {
        let structured_prompt =
            build_generation_prompt(prompt, self.config.instructions.as_deref());

        let mut feedback = Feedback::new();
        let mut candidate: Option<String> = None;
        let mut attempt_count: u32 = 0;
        let mut succeeded = false;
        let mut last_attempt: Option<Attempt> = None;

        while !succeeded && attempt_count < self.config.max_retries {
            attempt_count += 1;
            info!("attempt {} of {}", attempt_count, self.config.max_retries);

            let generated = match &candidate {
                None => self.generator.generate_initial(&structured_prompt).await,
                Some(previous) => {
                    self.generator
                        .generate_with_feedback(&structured_prompt, previous, &feedback)
                        .await
                }
            };

            let source = match generated {
                Ok(source) if !source.trim().is_empty() => source,
                Ok(_) => {
                    warn!("generation returned an empty candidate");
                    self.record_empty_generation(&mut feedback, &mut last_attempt, attempt_count);
                    continue;
                }
                Err(e) => {
                    warn!("generation failed: {}", e);
                    self.record_empty_generation(&mut feedback, &mut last_attempt, attempt_count);
                    continue;
                }
            };

            candidate = Some(source.clone());
            let mut attempt = Attempt::new(attempt_count, source.clone());

            let check = self.checker.check(&source).await;
            feedback.record_check(check.clone());
            attempt.check = Some(check.clone());
            if check.status != StageStatus::Success {
                info!("check failed with {} error(s)", check.errors.len());
                last_attempt = Some(attempt);
                continue;
            }
            info!("candidate compiles and passes static analysis");

            let deploy = self.deployer.deploy(&source).await;
            feedback.record_deploy(deploy.clone());
            attempt.deploy = Some(deploy.clone());
            let address = match (deploy.status, deploy.contract_address.clone()) {
                (StageStatus::Success, Some(address)) => address,
                _ => {
                    info!("deployment failed: {:?}", deploy.errors);
                    last_attempt = Some(attempt);
                    continue;
                }
            };
            info!("candidate deployed at {}", address);

            let test = self.tester.test(&address, &source).await;
            feedback.record_test(test.clone());
            attempt.test = Some(test.clone());
            match test.status {
                TestStatus::Success => {
                    info!("security test passed");
                    succeeded = true;
                }
                TestStatus::Skipped => {
                    info!("security test inconclusive: {:?}", test.errors)
                }
                TestStatus::Failure => {
                    info!("security test failed with {} finding(s)", test.errors.len())
                }
            }
            last_attempt = Some(attempt);
        }

        if !succeeded {
            warn!(
                "no passing contract after {} attempt(s)",
                attempt_count
            );
        }

        let last_error_stage = if succeeded {
            None
        } else {
            last_attempt.as_ref().and_then(Attempt::first_failed_stage)
        };

        LoopResult {
            succeeded,
            final_code: candidate,
            attempts: attempt_count,
            feedback,
            last_error_stage,
        }
    }

    /// Record an attempt whose generation produced nothing usable
    ///
    /// An empty or failed generation is fed back as a synthetic check failure
    /// so the next attempt sees a uniform failure shape. The previous
    /// candidate, if any, is kept as the revision baseline.
    fn record_empty_generation(
        &self,
        feedback: &mut Feedback,
        last_attempt: &mut Option<Attempt>,
        attempt_count: u32,
    ) {
        let synthetic = CheckOutcome::failure(vec!["empty generation".to_string()]);
        feedback.record_check(synthetic.clone());

        let mut attempt = Attempt::generation_failed(attempt_count);
        attempt.check = Some(synthetic);
        *last_attempt = Some(attempt);
    }
}
