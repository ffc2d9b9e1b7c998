//! # Document Handle
//!
//! A [`TreeState`] plus its version counter and audit log.
//!
//! Every accepted batch replaces the state wholesale, bumps the version and
//! appends one [`AuditEntry`]. Rejected batches leave all three untouched.
//!
//! ## Lifecycle
//!
//! ```text
//! Create → Apply batch → Apply batch → ... → Export audit / Replay
//!   ↓          ↓              ↓                      ↓
//! v0 state   v1 state       v2 state            same final state
//! ```

use crate::model::TreeState;
use crate::operations::{apply_batch, Operation};
use crate::summary::BatchSummary;
use crate::EditorError;
use serde::{Deserialize, Serialize};

/// Who submitted a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    Human,
    Agent,
}

/// One accepted batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Version produced by this batch
    pub version: u64,
    pub author: Author,
    pub operations: Vec<Operation>,
    pub summary: BatchSummary,
}

/// Editable mindmap document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    initial: TreeState,
    state: TreeState,
    version: u64,
    history: Vec<AuditEntry>,
}

impl Document {
    /// Create a document holding only its root
    pub fn new(root_id: impl Into<String>, text: impl Into<String>) -> Self {
        let state = TreeState::new(root_id, text);
        Self {
            initial: state.clone(),
            state,
            version: 0,
            history: Vec::new(),
        }
    }

    /// Wrap an existing state after checking its invariants
    pub fn from_state(state: TreeState) -> Result<Self, EditorError> {
        state.validate()?;
        Ok(Self {
            initial: state.clone(),
            state,
            version: 0,
            history: Vec::new(),
        })
    }

    pub fn state(&self) -> &TreeState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn history(&self) -> &[AuditEntry] {
        &self.history
    }

    /// Apply a batch; on success the new version's audit entry is returned
    pub fn apply(&mut self, author: Author, operations: Vec<Operation>) -> Result<&AuditEntry, EditorError> {
        let applied = apply_batch(&self.state, &operations)?;

        self.version += 1;
        self.state = applied.state;
        self.history.push(AuditEntry {
            version: self.version,
            author,
            operations,
            summary: applied.summary,
        });

        Ok(&self.history[self.history.len() - 1])
    }

    /// Apply only if the caller saw the current version
    pub fn apply_at(
        &mut self,
        expected_version: u64,
        author: Author,
        operations: Vec<Operation>,
    ) -> Result<&AuditEntry, EditorError> {
        if expected_version != self.version {
            return Err(EditorError::VersionConflict {
                expected: expected_version,
                actual: self.version,
            });
        }
        self.apply(author, operations)
    }

    /// Audit log as pretty JSON
    pub fn export_audit(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(&self.history)?)
    }

    /// Re-run the audit log from the initial state
    pub fn replay(&self) -> Result<TreeState, EditorError> {
        replay(&self.initial, &self.history)
    }
}

/// Re-run `history` on top of `initial`
pub fn replay(initial: &TreeState, history: &[AuditEntry]) -> Result<TreeState, EditorError> {
    history.iter().try_fold(initial.clone(), |state, entry| {
        Ok(apply_batch(&state, &entry.operations)?.state)
    })
}
