//! # Agent Edit Pipeline
//!
//! Runs an untrusted batch through three independent stages:
//!
//! ```text
//! normalize ids → validate scope → apply
//! ```
//!
//! Each stage is a pure function and fails with its own [`EditorError`]
//! variant. Only the final stage touches the [`Document`].

use crate::diff::{diff_states, StateDiff};
use crate::document::{Author, Document};
use crate::model::TreeState;
use crate::normalize::{normalize_operations, IdAllocator, NormalizedBatch, UuidAllocator};
use crate::operations::Operation;
use crate::scope::{validate_scope, ScopeRequest};
use crate::summary::BatchSummary;
use crate::EditorError;
use std::collections::BTreeMap;
use tracing::{info, instrument};

/// Outcome of an accepted agent batch
#[derive(Debug, Clone)]
pub struct AgentEdit {
    /// Version the document reached
    pub version: u64,
    /// Operations as applied (stable ids)
    pub operations: Vec<Operation>,
    /// Placeholder → allocated id
    pub id_map: BTreeMap<String, String>,
    pub summary: BatchSummary,
    pub diff: StateDiff,
}

/// Normalize → scope → apply, for agent-originated batches
pub struct Pipeline<A: IdAllocator = UuidAllocator> {
    allocator: A,
}

impl Default for Pipeline<UuidAllocator> {
    fn default() -> Self {
        Self::new(UuidAllocator)
    }
}

impl<A: IdAllocator> Pipeline<A> {
    pub fn new(allocator: A) -> Self {
        Self { allocator }
    }

    /// Stages one and two: rewrite ids, then check confinement
    pub fn prepare(
        &mut self,
        state: &TreeState,
        scope: &ScopeRequest,
        operations: &[Operation],
    ) -> Result<NormalizedBatch, EditorError> {
        let normalized = normalize_operations(state, operations, &mut self.allocator)?;
        validate_scope(state, scope, &normalized.operations)?;
        Ok(normalized)
    }

    /// All three stages against `document`
    #[instrument(skip_all, fields(version = document.version(), operations = operations.len()))]
    pub fn agent_edit(
        &mut self,
        document: &mut Document,
        scope: &ScopeRequest,
        operations: &[Operation],
    ) -> Result<AgentEdit, EditorError> {
        let NormalizedBatch { operations, id_map } = self.prepare(document.state(), scope, operations)?;

        let before = document.state().clone();
        let entry = document.apply(Author::Agent, operations)?;
        let (version, operations, summary) = (entry.version, entry.operations.clone(), entry.summary.clone());
        let diff = diff_states(&before, document.state());

        info!(version, summary = %summary, "Agent edit applied");
        Ok(AgentEdit {
            version,
            operations,
            id_map,
            summary,
            diff,
        })
    }
}
