//! Error types for the shoal coordination layer.
//!
//! Uses thiserror for derive macros. Lease contention and conflict reports
//! are normal return values, not errors; only storage and serialization
//! failures surface here.

use thiserror::Error;

/// Main error type for shoal operations.
#[derive(Error, Debug)]
pub enum ShoalError {
    /// A durable store operation (read/write/delete/list) failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A lease record could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Result type alias for shoal operations.
pub type Result<T> = std::result::Result<T, ShoalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ShoalError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "storage error: disk full");

        let err = ShoalError::Serialize("bad record".to_string());
        assert_eq!(err.to_string(), "serialization error: bad record");
    }
}
