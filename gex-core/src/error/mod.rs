//! Error types for gex operations

use thiserror::Error;

/// Main error type for catalog and expression operations.
///
/// Permission denials are deliberately absent: a row the caller may not see
/// surfaces as `NotFound`, so existence never leaks through the error type.
#[derive(Error, Debug)]
pub enum GexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Data integrity error: {0}")]
    Integrity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type alias for gex operations
pub type GexResult<T> = Result<T, GexError>;

impl GexError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GexError::NotFound(_))
    }
}

// Conversion implementations for common error types
impl From<rusqlite::Error> for GexError {
    fn from(err: rusqlite::Error) -> Self {
        GexError::Store(err.to_string())
    }
}

impl From<r2d2::Error> for GexError {
    fn from(err: r2d2::Error) -> Self {
        GexError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for GexError {
    fn from(err: serde_json::Error) -> Self {
        GexError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicate() {
        assert!(GexError::NotFound("dataset x".to_string()).is_not_found());
        assert!(!GexError::Cancelled.is_not_found());
        assert!(!GexError::Store("boom".to_string()).is_not_found());
    }

    #[test]
    fn test_messages_carry_identifier_only() {
        let err = GexError::NotFound("expression type vst".to_string());
        assert_eq!(err.to_string(), "Not found: expression type vst");
    }
}
