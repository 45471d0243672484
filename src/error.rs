//! Error types for Traceprint

use thiserror::Error;

/// Errors that can occur at the engine's fallible seams.
///
/// Capture handlers and analysis functions are infallible by design; a
/// fingerprint riding along with a form submission must never be the reason
/// the submission fails. These variants surface only from explicit
/// serialization entry points and configuration validation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
