//! Error types for the instrumented store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for store and instrumentation operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("actions may not have an undefined \"type\" field")]
    UndefinedActionType,

    #[error("instrumentation should not be applied more than once to the same store")]
    AlreadyInstrumented,

    #[error("store is not instrumented")]
    NotInstrumented,

    #[error("reducer failed: {0}")]
    Reducer(#[from] ReducerError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failure raised by a reducer while folding an action.
///
/// During a recompute sweep these are captured per position and recorded in
/// the computed-state cache rather than propagated to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ReducerError {
    message: String,
}

impl ReducerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reducer_error_display() {
        let err = ReducerError::new("index out of range");
        assert_eq!(err.to_string(), "index out of range");

        let store_err = StoreError::from(err);
        assert_eq!(store_err.to_string(), "reducer failed: index out of range");
    }
}
