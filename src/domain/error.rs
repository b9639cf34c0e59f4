//! Domain-level errors (no I/O, no configuration)

use thiserror::Error;

use crate::domain::arena::NodeId;

/// Errors raised by tree navigation and editing operations.
///
/// Every editing operation checks its preconditions before the first
/// mutation, so an `Err` leaves the tree exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("structural error in {operation}: {reason}")]
    Structural {
        operation: &'static str,
        reason: String,
    },

    #[error("maximum tree depth of {limit} exceeded")]
    DepthExceeded { limit: usize },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl TreeError {
    pub(crate) fn structural(operation: &'static str, reason: impl Into<String>) -> Self {
        TreeError::Structural {
            operation,
            reason: reason.into(),
        }
    }

    /// True for violated preconditions of an editing operation.
    pub fn is_structural(&self) -> bool {
        matches!(self, TreeError::Structural { .. })
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
