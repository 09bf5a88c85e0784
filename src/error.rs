//! Crate-level error types.

use thiserror::Error;

/// Errors surfaced to the caller at construction or configuration time.
///
/// Runtime failures during shutdown never take this shape: per-service stop
/// errors are logged, not propagated, and callbacks have no error channel.
#[derive(Debug, Error)]
pub enum Error {
    /// The orchestrator refuses to manage fewer than two services.
    #[error("at least two services are required, got {got}")]
    InsufficientServices { got: usize },

    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] crate::config::loader::ConfigError),
}
