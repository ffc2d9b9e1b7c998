//! # Mindmap Editor
//!
//! Core editing engine for mindmap documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ agent / human editor: proposes operations   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: batch lifecycle                     │
//! │  - Normalize placeholder ids                │
//! │  - Confine batch to a scope                 │
//! │  - Apply all-or-nothing                     │
//! │  - Record audit entries, diff for highlight │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ persistence (external): rows, version       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Flat map is source of truth**: children lists are derived per call
//! 2. **Operations only**: no free-form field writes on a document
//! 3. **All or nothing**: a failed batch leaves the caller's state intact
//! 4. **Deterministic**: same state + same batch = same result
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mindmap_editor::{apply, Operation, TreeState};
//!
//! let state = TreeState::new(root_id, "Project");
//! let next = apply(&state, &[Operation::AddNode {
//!     node_id: child_id,
//!     parent_id: root_id,
//!     text: "Milestones".into(),
//!     index: None,
//! }])?;
//! ```

mod diff;
mod document;
mod errors;
mod model;
mod normalize;
mod operations;
mod pipeline;
mod scope;
mod subtree;
mod summary;

pub use diff::{diff_states, StateDiff};
pub use document::{replay, AuditEntry, Author, Document};
pub use errors::EditorError;
pub use model::{Node, NodeRow, StateError, TreeState};
pub use normalize::{
    is_stable_id, normalize_operations, IdAllocator, NormalizeError, NormalizedBatch, SequentialAllocator,
    UuidAllocator,
};
pub use operations::{apply, apply_batch, summarize_batch, AppliedBatch, ApplyError, Operation, OperationError};
pub use pipeline::{AgentEdit, Pipeline};
pub use scope::{validate_scope, Scope, ScopeError, ScopeRequest};
pub use subtree::{subtree_ids, ChildIndex, SubtreeError};
pub use summary::BatchSummary;
