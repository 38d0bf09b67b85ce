//! Error types for startrec-core.
//!
//! Every fallible operation in the crate reports one of three conditions.
//! Zero-fallback cases (no relevant documents, empty ranking) are defined
//! results, not errors, and never surface here.

use thiserror::Error;

/// Errors that can occur while resolving or computing a measure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The measure name is neither a canonical name nor a known alias
    #[error("Unknown measure: {0}")]
    UnknownMeasure(String),
    /// Relevance labels and scores describe a different number of documents
    #[error("Length mismatch: {relevance} relevance labels but {scores} scores")]
    LengthMismatch {
        /// Number of relevance labels supplied
        relevance: usize,
        /// Number of scores supplied
        scores: usize,
    },
    /// A cutoff, threshold or score is outside its accepted range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl EvalError {
    /// Shorthand for building an [`EvalError::InvalidParameter`].
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        EvalError::InvalidParameter(msg.into())
    }
}

impl From<EvalError> for String {
    fn from(err: EvalError) -> String {
        err.to_string()
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EvalError>;
