//! # solgen-service
//!
//! HTTP surface for the solgen pipeline. One endpoint runs the full
//! generate-verify-deploy loop per request; a companion endpoint terminates
//! the development chain the service manages.
//!
//! The chain process is acquired at startup and owned by the application
//! state, never referenced as ambient global state. Concurrent requests each
//! own an independent loop run; deployment traffic serializes inside the
//! shared deployer.

mod node;
mod server;

pub use node::ChainProcess;
pub use server::{serve, ProcessRequest, ProcessResponse};
