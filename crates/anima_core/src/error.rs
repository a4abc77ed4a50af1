//! Container error types

use thiserror::Error;

use crate::container::ContainerId;
use crate::node::NodeKind;

/// Errors raised by structural container operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnimaError {
    /// Handle was issued by another container
    #[error("Handle belongs to container {found:?}, not {expected:?}")]
    ForeignHandle {
        expected: ContainerId,
        found: ContainerId,
    },

    /// Handle key is not present in the arena
    #[error("Handle does not refer to a live node")]
    StaleHandle,

    /// Only parallel nodes accept additional children
    #[error("Cannot add a child to a {kind} node")]
    NotParallel { kind: NodeKind },

    /// The new child already reaches the parallel node it would be added to
    #[error("Adding this child would create a cycle")]
    Cycle,
}

/// Result type for container operations
pub type Result<T> = std::result::Result<T, AnimaError>;
