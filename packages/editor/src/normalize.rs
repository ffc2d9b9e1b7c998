//! # Operation-Id Normalizer
//!
//! Agents cannot know the ids of nodes they are about to create, so they
//! propose placeholders (`"new-1"`, `"idea"`, ...). Normalization swaps each
//! placeholder `add_node` id for a fresh stable id and rewrites every
//! reference to it elsewhere in the batch.
//!
//! Stable ids are canonical hyphenated UUIDs. Ids that are already stable
//! pass through untouched, so normalizing a normalized batch changes nothing.

use crate::model::TreeState;
use crate::operations::Operation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Cap on ids listed in an error message
const MAX_REPORTED_IDS: usize = 10;

/// Attempts to find an unused id before giving up
const MAX_ALLOCATION_ATTEMPTS: usize = 16;

/// Source of fresh stable ids
pub trait IdAllocator {
    fn allocate(&mut self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidAllocator;

impl IdAllocator for UuidAllocator {
    fn allocate(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic UUIDs counting up from a seed (tests, replays)
#[derive(Debug, Clone)]
pub struct SequentialAllocator {
    next: u128,
}

impl SequentialAllocator {
    pub fn new(seed: u128) -> Self {
        Self { next: seed }
    }
}

impl Default for SequentialAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl IdAllocator for SequentialAllocator {
    fn allocate(&mut self) -> String {
        let id = Uuid::from_u128(self.next).to_string();
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Whether `id` has the stable storage format
pub fn is_stable_id(id: &str) -> bool {
    id.len() == 36 && Uuid::parse_str(id).is_ok()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("add_node id must be new, but {0} already exists")]
    AlreadyExists(String),

    #[error("Duplicate add_node id in batch: {0}")]
    Duplicate(String),

    #[error("Could not allocate a fresh id for {0}")]
    AllocationFailed(String),

    #[error("Operations reference invalid node ids: {}", list_ids(.ids, .total))]
    InvalidIds { ids: Vec<String>, total: usize },
}

fn list_ids(ids: &[String], total: &usize) -> String {
    let listed = ids.join(", ");
    match total.saturating_sub(ids.len()) {
        0 => listed,
        more => format!("{listed} (and {more} more)"),
    }
}

/// Rewritten batch plus the placeholder → final id map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBatch {
    pub operations: Vec<Operation>,
    pub id_map: BTreeMap<String, String>,
}

/// Replace placeholder ids in `operations` with fresh stable ids
#[instrument(skip_all, fields(operations = operations.len()))]
pub fn normalize_operations(
    state: &TreeState,
    operations: &[Operation],
    allocator: &mut dyn IdAllocator,
) -> Result<NormalizedBatch, NormalizeError> {
    // 1. Proposed ids must be new and unique within the batch
    let mut proposed: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for operation in operations {
        if let Operation::AddNode { node_id, .. } = operation {
            if state.contains(node_id) {
                return Err(NormalizeError::AlreadyExists(node_id.clone()));
            }
            if !seen.insert(node_id.as_str()) {
                return Err(NormalizeError::Duplicate(node_id.clone()));
            }
            proposed.push(node_id);
        }
    }

    // 2. One fresh id per placeholder, unique against the state and the batch
    let mut taken: HashSet<String> = seen.iter().map(|id| id.to_string()).collect();
    let mut id_map = BTreeMap::new();
    for placeholder in proposed.into_iter().filter(|id| !is_stable_id(id)) {
        let fresh = allocate_unused(state, &taken, allocator)
            .ok_or_else(|| NormalizeError::AllocationFailed(placeholder.to_string()))?;
        debug!(placeholder, fresh = %fresh, "Allocated id");
        taken.insert(fresh.clone());
        id_map.insert(placeholder.to_string(), fresh);
    }

    // 3. Rewrite every reference
    let rewritten: Vec<Operation> = operations
        .iter()
        .map(|operation| rewrite(operation, &id_map))
        .collect();

    // 4. Everything left must be a stable id
    let mut invalid: Vec<String> = Vec::new();
    let mut reported: HashSet<&str> = HashSet::new();
    for operation in &rewritten {
        for id in operation.referenced_ids() {
            if !is_stable_id(id) && reported.insert(id) {
                invalid.push(id.to_string());
            }
        }
    }
    if !invalid.is_empty() {
        let total = invalid.len();
        invalid.truncate(MAX_REPORTED_IDS);
        warn!(total, "Batch references invalid ids");
        return Err(NormalizeError::InvalidIds { ids: invalid, total });
    }

    Ok(NormalizedBatch {
        operations: rewritten,
        id_map,
    })
}

fn allocate_unused(state: &TreeState, taken: &HashSet<String>, allocator: &mut dyn IdAllocator) -> Option<String> {
    (0..MAX_ALLOCATION_ATTEMPTS)
        .map(|_| allocator.allocate())
        .find(|id| is_stable_id(id) && !state.contains(id) && !taken.contains(id))
}

fn rewrite(operation: &Operation, id_map: &BTreeMap<String, String>) -> Operation {
    let map = |id: &String| id_map.get(id).cloned().unwrap_or_else(|| id.clone());

    match operation {
        Operation::AddNode { node_id, parent_id, text, index } => Operation::AddNode {
            node_id: map(node_id),
            parent_id: map(parent_id),
            text: text.clone(),
            index: *index,
        },
        Operation::RenameNode { node_id, text } => Operation::RenameNode {
            node_id: map(node_id),
            text: text.clone(),
        },
        Operation::UpdateNotes { node_id, notes } => Operation::UpdateNotes {
            node_id: map(node_id),
            notes: notes.clone(),
        },
        Operation::MoveNode { node_id, new_parent_id, index } => Operation::MoveNode {
            node_id: map(node_id),
            new_parent_id: map(new_parent_id),
            index: *index,
        },
        Operation::DeleteNode { node_id } => Operation::DeleteNode { node_id: map(node_id) },
        Operation::ReorderChildren { parent_id, ordered_child_ids } => Operation::ReorderChildren {
            parent_id: map(parent_id),
            ordered_child_ids: ordered_child_ids.iter().map(map).collect(),
        },
    }
}
