//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid document: {0}")]
    State(#[from] crate::model::StateError),

    #[error("Operation rejected: {0}")]
    Apply(#[from] crate::operations::ApplyError),

    #[error("Edit outside scope: {0}")]
    Scope(#[from] crate::scope::ScopeError),

    #[error("Invalid operation ids: {0}")]
    Normalize(#[from] crate::normalize::NormalizeError),

    #[error("Version conflict: expected {expected}, document is at {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
