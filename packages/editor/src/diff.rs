//! State-to-state diff, used to highlight what a batch changed.

use crate::model::TreeState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ids touched between two states, each list sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub renamed: Vec<String>,
    pub notes_changed: Vec<String>,
    /// Parent changed
    pub moved: Vec<String>,
    /// Same parent, different position
    pub reordered: Vec<String>,
}

impl StateDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.renamed.is_empty()
            && self.notes_changed.is_empty()
            && self.moved.is_empty()
            && self.reordered.is_empty()
    }

    /// Every id present in `after` that should be highlighted
    pub fn touched(&self) -> BTreeSet<&str> {
        self.added
            .iter()
            .chain(&self.renamed)
            .chain(&self.notes_changed)
            .chain(&self.moved)
            .chain(&self.reordered)
            .map(String::as_str)
            .collect()
    }
}

pub fn diff_states(before: &TreeState, after: &TreeState) -> StateDiff {
    let mut diff = StateDiff::default();

    for (id, old) in &before.nodes {
        let Some(new) = after.nodes.get(id) else {
            diff.removed.push(id.clone());
            continue;
        };
        if old.text != new.text {
            diff.renamed.push(id.clone());
        }
        if old.notes != new.notes {
            diff.notes_changed.push(id.clone());
        }
        if old.parent_id != new.parent_id {
            diff.moved.push(id.clone());
        } else if old.order_index != new.order_index {
            diff.reordered.push(id.clone());
        }
    }

    diff.added = after
        .nodes
        .keys()
        .filter(|id| !before.nodes.contains_key(*id))
        .cloned()
        .collect();

    diff
}
