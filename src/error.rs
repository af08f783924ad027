//! Error types for the rating engine
//!
//! Every failure here reflects misuse of the engine (a bad edge index, a
//! mis-shaped layer input, a write to a read-only variable) rather than a
//! transient condition, so nothing is retried internally.

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SkillError>;

/// Custom error types for graph construction and rating calculation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkillError {
    #[error("Index {index} is out of range for {target} with {len} entries")]
    InvalidIndex {
        target: String,
        index: usize,
        len: usize,
    },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Variable {name} is read-only")]
    UnsupportedWrite { name: String },

    #[error("Invalid operation: {reason}")]
    InvalidOperation { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl SkillError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        SkillError::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_operation(reason: impl Into<String>) -> Self {
        SkillError::InvalidOperation {
            reason: reason.into(),
        }
    }

    /// Check `index` against `len`, naming `target` in the error.
    pub(crate) fn check_index(target: &str, index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(SkillError::InvalidIndex {
                target: target.to_string(),
                index,
                len,
            })
        }
    }
}
