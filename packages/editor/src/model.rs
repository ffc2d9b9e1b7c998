//! # Tree State
//!
//! The mindmap document value: a root id plus a flat `id → Node` map.
//!
//! Structure is carried only by `parent_id` and `order_index`; the
//! children-by-parent view is derived on demand (see [`crate::ChildIndex`])
//! and never stored alongside the map.
//!
//! ## Invariants
//!
//! 1. `root_node_id` exists and the root has no parent
//! 2. Every other node points at an existing parent
//! 3. Following parents always terminates at the root
//! 4. Each sibling group is ordered `0..n-1` without gaps or repeats

use crate::subtree::ChildIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// One outline entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,

    /// `None` only for the root
    pub parent_id: Option<String>,

    /// Non-empty label
    pub text: String,

    #[serde(default)]
    pub notes: Option<String>,

    /// Sibling-local position
    pub order_index: usize,

    /// Display coordinates, opaque to the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_x: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_y: Option<f64>,
}

impl Node {
    pub fn new(id: impl Into<String>, parent_id: Option<String>, text: impl Into<String>, order_index: usize) -> Self {
        Self {
            id: id.into(),
            parent_id,
            text: text.into(),
            notes: None,
            order_index,
            pos_x: None,
            pos_y: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// The whole document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TreeState {
    pub root_node_id: String,
    pub nodes: BTreeMap<String, Node>,
}

/// Storage row, as exchanged with the persistence layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeRow {
    pub id: String,
    pub parent_id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub order_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_y: Option<f64>,
}

impl From<&Node> for NodeRow {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            parent_id: node.parent_id.clone(),
            text: node.text.clone(),
            notes: node.notes.clone(),
            order_index: node.order_index,
            pos_x: node.pos_x,
            pos_y: node.pos_y,
        }
    }
}

impl From<NodeRow> for Node {
    fn from(row: NodeRow) -> Self {
        Self {
            id: row.id,
            parent_id: row.parent_id,
            text: row.text,
            notes: row.notes,
            order_index: row.order_index,
            pos_x: row.pos_x,
            pos_y: row.pos_y,
        }
    }
}

/// Invariant violations found when loading or checking a state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Root node not found: {0}")]
    MissingRoot(String),

    #[error("Root node {0} must not have a parent")]
    RootHasParent(String),

    #[error("Node {0} has no parent but is not the root")]
    ExtraRoot(String),

    #[error("Node {id} references missing parent {parent_id}")]
    DanglingParent { id: String, parent_id: String },

    #[error("Node {0} does not reach the root (parent cycle)")]
    Cycle(String),

    #[error("Node {0} has empty text")]
    EmptyText(String),

    #[error("Node stored under key {key} has id {id}")]
    KeyMismatch { key: String, id: String },

    #[error("Children of {parent_id} are not ordered 0..{count}")]
    BrokenOrder { parent_id: String, count: usize },

    #[error("Duplicate row id: {0}")]
    DuplicateRow(String),

    #[error("No root row found")]
    NoRootRow,
}

impl TreeState {
    /// Create a document holding only its root
    pub fn new(root_id: impl Into<String>, text: impl Into<String>) -> Self {
        let root_id = root_id.into();
        let mut nodes = BTreeMap::new();
        nodes.insert(root_id.clone(), Node::new(root_id.clone(), None, text, 0));
        Self {
            root_node_id: root_id,
            nodes,
        }
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.get(&self.root_node_id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `parent_id`, sorted by `order_index`
    pub fn children_of(&self, parent_id: &str) -> Vec<&Node> {
        let mut children: Vec<&Node> = self
            .nodes
            .values()
            .filter(|node| node.parent_id.as_deref() == Some(parent_id))
            .collect();
        children.sort_by(|a, b| a.order_index.cmp(&b.order_index).then_with(|| a.id.cmp(&b.id)));
        children
    }

    /// Ancestors of `id`, nearest first. Stops early on a broken chain.
    pub fn ancestors(&self, id: &str) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut cursor = self.nodes.get(id).and_then(|node| node.parent_id.as_deref());
        while let Some(parent_id) = cursor {
            let Some(parent) = self.nodes.get(parent_id) else {
                break;
            };
            // A cycle can only appear in unvalidated input
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(parent);
            cursor = parent.parent_id.as_deref();
        }
        out
    }

    /// Nodes from the root down to `id` (inclusive)
    pub fn path_to(&self, id: &str) -> Vec<&Node> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut path = self.ancestors(id);
        path.reverse();
        path.push(node);
        path
    }

    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.nodes.get(id).map(|_| self.ancestors(id).len())
    }

    /// Check every structural invariant
    pub fn validate(&self) -> Result<(), StateError> {
        let root = self
            .nodes
            .get(&self.root_node_id)
            .ok_or_else(|| StateError::MissingRoot(self.root_node_id.clone()))?;
        if root.parent_id.is_some() {
            return Err(StateError::RootHasParent(root.id.clone()));
        }

        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (key, node) in &self.nodes {
            if key != &node.id {
                return Err(StateError::KeyMismatch {
                    key: key.clone(),
                    id: node.id.clone(),
                });
            }
            if node.text.trim().is_empty() {
                return Err(StateError::EmptyText(node.id.clone()));
            }
            match node.parent_id.as_deref() {
                None if node.id != self.root_node_id => {
                    return Err(StateError::ExtraRoot(node.id.clone()));
                }
                None => {}
                Some(parent_id) => {
                    if !self.nodes.contains_key(parent_id) {
                        return Err(StateError::DanglingParent {
                            id: node.id.clone(),
                            parent_id: parent_id.to_string(),
                        });
                    }
                    groups.entry(parent_id).or_default().push(node.order_index);
                }
            }
        }

        self.check_acyclic()?;

        for (parent_id, mut indices) in groups {
            indices.sort_unstable();
            if indices.iter().enumerate().any(|(position, index)| position != *index) {
                return Err(StateError::BrokenOrder {
                    parent_id: parent_id.to_string(),
                    count: indices.len(),
                });
            }
        }

        Ok(())
    }

    fn check_acyclic(&self) -> Result<(), StateError> {
        let mut reaches_root: HashSet<&str> = HashSet::new();
        reaches_root.insert(self.root_node_id.as_str());

        for id in self.nodes.keys() {
            let mut chain: Vec<&str> = Vec::new();
            let mut cursor = Some(id.as_str());
            while let Some(current) = cursor {
                if reaches_root.contains(current) {
                    break;
                }
                if chain.len() > self.nodes.len() {
                    return Err(StateError::Cycle(id.clone()));
                }
                chain.push(current);
                cursor = self.nodes.get(current).and_then(|node| node.parent_id.as_deref());
            }
            if cursor.is_none() {
                return Err(StateError::Cycle(id.clone()));
            }
            reaches_root.extend(chain);
        }
        Ok(())
    }

    /// Flatten into storage rows, parents before children
    pub fn to_rows(&self) -> Vec<NodeRow> {
        let index = ChildIndex::build(self);
        let mut rows = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root_node_id.as_str()];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                rows.push(NodeRow::from(node));
            }
            stack.extend(index.children(id).iter().rev());
        }
        rows
    }

    /// Rebuild a state from storage rows.
    ///
    /// Without an explicit `root_id`, the single row lacking a parent is the root.
    pub fn from_rows(root_id: Option<&str>, rows: Vec<NodeRow>) -> Result<Self, StateError> {
        let mut nodes = BTreeMap::new();
        let mut parentless: Vec<String> = Vec::new();
        for row in rows {
            if row.parent_id.is_none() {
                parentless.push(row.id.clone());
            }
            if nodes.contains_key(&row.id) {
                return Err(StateError::DuplicateRow(row.id));
            }
            nodes.insert(row.id.clone(), Node::from(row));
        }

        let root_node_id = match root_id {
            Some(id) => id.to_string(),
            None => match parentless.as_slice() {
                [] => return Err(StateError::NoRootRow),
                [only] => only.clone(),
                [_, extra, ..] => return Err(StateError::ExtraRoot(extra.clone())),
            },
        };

        let state = Self { root_node_id, nodes };
        state.validate()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeState {
        let mut state = TreeState::new("root", "Root");
        state.nodes.insert("a".into(), Node::new("a", Some("root".into()), "A", 0));
        state.nodes.insert("b".into(), Node::new("b", Some("root".into()), "B", 1));
        state.nodes.insert("a1".into(), Node::new("a1", Some("a".into()), "A1", 0));
        state
    }

    #[test]
    fn test_new_state_is_valid() {
        let state = TreeState::new("root", "Root");
        assert_eq!(state.len(), 1);
        assert!(state.validate().is_ok());
        assert!(state.root().unwrap().is_root());
    }

    #[test]
    fn test_children_sorted_by_order_index() {
        let state = sample();
        let ids: Vec<&str> = state.children_of("root").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_path_and_depth() {
        let state = sample();
        let path: Vec<&str> = state.path_to("a1").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(path, vec!["root", "a", "a1"]);
        assert_eq!(state.depth_of("a1"), Some(2));
        assert_eq!(state.depth_of("missing"), None);
    }

    #[test]
    fn test_validate_rejects_gap_in_order() {
        let mut state = sample();
        state.nodes.get_mut("b").unwrap().order_index = 2;
        assert_eq!(
            state.validate().unwrap_err(),
            StateError::BrokenOrder {
                parent_id: "root".into(),
                count: 2
            }
        );
    }

    #[test]
    fn test_broken_order_reports_first_parent_by_id() {
        let mut state = TreeState::new("r", "Root");
        for (i, parent) in ["e", "c", "a", "d", "b"].into_iter().enumerate() {
            state.nodes.insert(parent.into(), Node::new(parent, Some("r".into()), parent, i));
            let child = format!("{parent}1");
            state.nodes.insert(child.clone(), Node::new(child, Some(parent.into()), "Child", 3));
        }

        let expected = StateError::BrokenOrder {
            parent_id: "a".into(),
            count: 1,
        };
        for _ in 0..20 {
            assert_eq!(state.validate().unwrap_err(), expected);
        }
    }

    #[test]
    fn test_validate_rejects_dangling_parent() {
        let mut state = sample();
        state.nodes.get_mut("a1").unwrap().parent_id = Some("ghost".into());
        assert!(matches!(state.validate(), Err(StateError::DanglingParent { .. })));
    }

    #[test]
    fn test_validate_rejects_cycle() {
        let mut state = sample();
        // a -> a1 -> a, detached from the root
        state.nodes.get_mut("a").unwrap().parent_id = Some("a1".into());
        state.nodes.get_mut("b").unwrap().order_index = 0;
        assert!(matches!(state.validate(), Err(StateError::Cycle(_))));
    }

    #[test]
    fn test_validate_rejects_second_root() {
        let mut state = sample();
        state.nodes.insert("stray".into(), Node::new("stray", None, "Stray", 0));
        assert_eq!(state.validate().unwrap_err(), StateError::ExtraRoot("stray".into()));
    }

    #[test]
    fn test_rows_are_parent_first() {
        let state = sample();
        let rows = state.to_rows();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_rows_rebuild_same_state() {
        let state = sample();
        let rebuilt = TreeState::from_rows(None, state.to_rows()).unwrap();
        assert_eq!(rebuilt, state);
    }

    #[test]
    fn test_rows_reject_duplicates() {
        let state = sample();
        let mut rows = state.to_rows();
        rows.push(rows[1].clone());
        assert_eq!(
            TreeState::from_rows(None, rows).unwrap_err(),
            StateError::DuplicateRow("a".into())
        );
    }

    #[test]
    fn test_json_uses_camel_case() {
        let state = TreeState::new("root", "Root");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["rootNodeId"], "root");
        assert_eq!(json["nodes"]["root"]["orderIndex"], 0);
        assert!(json["nodes"]["root"]["parentId"].is_null());
    }
}
