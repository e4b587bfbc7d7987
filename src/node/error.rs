//! Node-level error type.

use thiserror::Error;

use crate::sora::SoraError;

/// Errors returned by a node's `execute` method.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("missing required input '{0}'")]
    MissingInput(String),

    #[error("input '{name}' must be {expected}")]
    InputType {
        /// Input name as declared in the node definition
        name: String,
        /// Expected input type
        expected: &'static str,
    },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Sora(#[from] SoraError),
}
