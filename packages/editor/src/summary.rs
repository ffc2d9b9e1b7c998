//! Per-batch impact counters, recorded while the engine runs.

use crate::model::TreeState;
use crate::operations::Operation;
use crate::subtree::subtree_ids;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub added: usize,
    pub renamed: usize,
    pub notes_updated: usize,
    pub moved: usize,
    pub reordered: usize,
    /// `delete_node` operations in the batch
    pub deleted: usize,
    /// Nodes removed by those deletes, descendants included
    pub removed_nodes: usize,
}

impl BatchSummary {
    /// Count `operation` against the state it is about to run on
    pub(crate) fn record(&mut self, operation: &Operation, before: &TreeState) {
        match operation {
            Operation::AddNode { .. } => self.added += 1,
            Operation::RenameNode { .. } => self.renamed += 1,
            Operation::UpdateNotes { .. } => self.notes_updated += 1,
            Operation::MoveNode { .. } => self.moved += 1,
            Operation::ReorderChildren { .. } => self.reordered += 1,
            Operation::DeleteNode { node_id } => {
                self.deleted += 1;
                self.removed_nodes += subtree_ids(before, node_id).map_or(0, |ids| ids.len());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            (self.added, "added"),
            (self.renamed, "renamed"),
            (self.notes_updated, "notes updated"),
            (self.moved, "moved"),
            (self.reordered, "reordered"),
            (self.removed_nodes, "removed"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect();

        if parts.is_empty() {
            write!(f, "no changes")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}
