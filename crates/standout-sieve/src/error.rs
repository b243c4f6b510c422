//! Error types for the sieve crate.

use thiserror::Error;

/// Errors that can occur when normalizing or evaluating filters.
///
/// `UnknownOperator`, `InvalidArgument` and `UnknownMode` are configuration
/// errors raised before any item is evaluated. `Incomparable` is raised during
/// evaluation or sorting when an ordering operator meets values that have no
/// order between them.
#[derive(Debug, Error)]
pub enum SieveError {
    /// The operator after `__` is not a known filter operator.
    #[error("unknown filter type: {op}. Choices are: ({choices})")]
    UnknownOperator { op: String, choices: String },

    /// The value given for a filter key has the wrong shape for its operator.
    #[error("invalid argument for '{key}': {reason}")]
    InvalidArgument { key: String, reason: String },

    /// The combination mode is neither AND nor OR.
    #[error("unknown filter method: {0}. Must be one of: AND, OR")]
    UnknownMode(String),

    /// An ordering comparison between values with no order.
    #[error("cannot apply '{op}' to field '{field}': {left} is not comparable with {right}")]
    Incomparable {
        field: String,
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
}

impl SieveError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        SieveError::InvalidArgument {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors raised while building criteria.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, SieveError::Incomparable { .. })
    }
}

/// Result type for sieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;
