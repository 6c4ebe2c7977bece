//! Error types for arrendar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for arrendar operations.
///
/// Covers the full request lifecycle: input validation, dataset access,
/// model availability, and persistence.
///
/// # Examples
///
/// ```
/// use arrendar::error::ArrendarError;
///
/// let err = ArrendarError::InvalidInput {
///     field: "people_count".to_string(),
///     value: "-3".to_string(),
///     expected: ">= 0".to_string(),
/// };
/// assert!(err.to_string().contains("people_count"));
/// ```
#[derive(Debug)]
pub enum ArrendarError {
    /// No fitted model is present; estimation cannot proceed.
    ModelUnavailable,

    /// A required feature is missing or outside its expected domain.
    InvalidInput {
        /// Field name as seen by the caller
        field: String,
        /// Offending value, rendered as text
        value: String,
        /// Constraint description
        expected: String,
    },

    /// The neighborhood dataset could not be loaded or parsed.
    DataAccess {
        /// Source path (or a description of the source)
        path: String,
        /// Failure details
        message: String,
    },

    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// I/O error (file not found, permission denied, etc.).
    Io(std::io::Error),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for ArrendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrendarError::ModelUnavailable => {
                write!(f, "Model not loaded: estimation is unavailable")
            }
            ArrendarError::InvalidInput {
                field,
                value,
                expected,
            } => {
                write!(f, "Invalid input: {field} = {value}, expected {expected}")
            }
            ArrendarError::DataAccess { path, message } => {
                write!(f, "Dataset access failed for {path}: {message}")
            }
            ArrendarError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            ArrendarError::Io(e) => write!(f, "I/O error: {e}"),
            ArrendarError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            ArrendarError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ArrendarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArrendarError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ArrendarError {
    fn from(err: std::io::Error) -> Self {
        ArrendarError::Io(err)
    }
}

impl From<&str> for ArrendarError {
    fn from(msg: &str) -> Self {
        ArrendarError::Other(msg.to_string())
    }
}

impl From<String> for ArrendarError {
    fn from(msg: String) -> Self {
        ArrendarError::Other(msg)
    }
}

impl ArrendarError {
    /// Create an invalid-input error with descriptive context.
    #[must_use]
    pub fn invalid_input(field: &str, value: impl fmt::Display, expected: &str) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Create a dataset access error tied to a source path.
    #[must_use]
    pub fn data_access(path: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::DataAccess {
            path: path.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an empty input error.
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::Other(format!("empty input: {context}"))
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, ArrendarError>;
