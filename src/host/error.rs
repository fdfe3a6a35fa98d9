//! Errors raised by a host binding.

use thiserror::Error;

/// Errors a host reports back to the engine from its operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    #[error("Host has no operation named '{0}'")]
    UnknownOperation(String),

    #[error("Operation '{operation}' requires arguments but none were supplied")]
    MissingArguments { operation: String },

    #[error("{0}")]
    Failed(String),
}
