//! # solgen-orchestrator
//!
//! The retry loop at the center of solgen: generate a candidate, check it,
//! deploy it, security-test it, and feed the latest stage outcomes back into
//! the next generation attempt until everything passes or the retry budget
//! runs out.
//!
//! The loop is strictly sequential and single-candidate. There is no parallel
//! candidate generation and no rollback; a failed attempt is corrected
//! forward through feedback, never retried verbatim.

mod assemble;
mod loop_engine;

pub use assemble::{standard_loop, StandardLoop};
pub use loop_engine::{GenerationLoop, LoopConfig};
