//! Unified error types for solgen

use thiserror::Error;

/// Unified error type for all solgen operations
#[derive(Error, Debug)]
pub enum SolgenError {
    // Generator errors
    #[error("generation provider error: {0}")]
    Provider(String),

    #[error("authentication error: {0}")]
    Auth(String),

    // Compiler toolchain errors
    #[error("{0}")]
    Toolchain(String),

    #[error("compilation error: {0}")]
    Compile(String),

    #[error("static analysis error: {0}")]
    Analysis(String),

    // Deployment errors
    #[error("development chain unreachable: {0}")]
    NodeUnreachable(String),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("{0}")]
    Deploy(String),

    // Security scanner errors
    #[error("security scan error: {0}")]
    Scan(String),

    // Chain process errors
    #[error("chain process error: {0}")]
    Node(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using SolgenError
pub type Result<T> = std::result::Result<T, SolgenError>;
