//! Error types for the NanoDet decoder.

use thiserror::Error;

/// Result alias for decoder operations.
pub type Result<T> = std::result::Result<T, NanoDetError>;

/// Errors raised by the predictor.
///
/// Decoding itself cannot fail: every error is a caller contract violation
/// detected before any tensor is read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NanoDetError {
    /// The model outputs handed to the predictor do not match its configuration.
    #[error("invalid input: {0}")]
    InvalidInput(InvalidInput),
    /// Predictor parameters are out of their valid range.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Details of an [`NanoDetError::InvalidInput`] failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    #[error("expected {expected} output tensors, got {got}")]
    TensorCount { expected: usize, got: usize },
    #[error("output tensor {index} has shape {got:?}, expected {expected:?}")]
    TensorShape {
        index: usize,
        expected: [usize; 3],
        got: Vec<usize>,
    },
    #[error(
        "head {head} has {anchors} anchors but logits {logits:?} and displacements {displacements:?}"
    )]
    HeadShape {
        head: usize,
        anchors: usize,
        logits: [usize; 2],
        displacements: [usize; 2],
    },
}

impl From<InvalidInput> for NanoDetError {
    fn from(err: InvalidInput) -> Self {
        NanoDetError::InvalidInput(err)
    }
}

impl NanoDetError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        NanoDetError::Configuration(msg.into())
    }
}
