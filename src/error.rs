//! Error types for mezclar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for mezclar operations.
///
/// Provides detailed context about failures including dimension mismatches,
/// empty clusters, and invalid hyperparameters.
///
/// # Examples
///
/// ```
/// use mezclar::error::MezclarError;
///
/// let err = MezclarError::DimensionMismatch {
///     expected: "2x2".to_string(),
///     actual: "2x3".to_string(),
/// };
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug)]
pub enum MezclarError {
    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// A cluster lost all of its members during a k-means update.
    EmptyCluster {
        /// Cluster index that became empty
        cluster: usize,
        /// Iteration (1-based) on which it happened
        iteration: usize,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Input data failed validation.
    ValidationError {
        /// Validation failure message
        message: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for MezclarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MezclarError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Matrix dimension mismatch: expected {expected}, got {actual}"
                )
            }
            MezclarError::EmptyCluster { cluster, iteration } => {
                write!(
                    f,
                    "Cluster {cluster} became empty on iteration {iteration}"
                )
            }
            MezclarError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            MezclarError::ValidationError { message } => {
                write!(f, "Validation failed: {message}")
            }
            MezclarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for MezclarError {}

impl From<&str> for MezclarError {
    fn from(msg: &str) -> Self {
        MezclarError::Other(msg.to_string())
    }
}

impl From<String> for MezclarError {
    fn from(msg: String) -> Self {
        MezclarError::Other(msg)
    }
}

impl MezclarError {
    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create an empty input error
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::Other(format!("empty input: {context}"))
    }

    /// Create a validation error
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<&str> for MezclarError {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

#[allow(clippy::cmp_owned)]
impl PartialEq<MezclarError> for &str {
    fn eq(&self, other: &MezclarError) -> bool {
        *self == other.to_string()
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, MezclarError>;
