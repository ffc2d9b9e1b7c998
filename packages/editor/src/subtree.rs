//! # Subtree Resolver
//!
//! Children-by-parent index and closed descendant sets.
//!
//! Traversals use an explicit stack, so tree depth is bounded by memory
//! rather than by the call stack.

use crate::model::{Node, TreeState};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubtreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),
}

/// Children of every node, sorted by `order_index`.
///
/// Built from a [`TreeState`] in one linear pass; borrowed, never persisted.
#[derive(Debug)]
pub struct ChildIndex<'a> {
    children: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> ChildIndex<'a> {
    pub fn build(state: &'a TreeState) -> Self {
        let mut grouped: HashMap<&'a str, Vec<&'a Node>> = HashMap::new();
        for node in state.nodes.values() {
            if let Some(parent_id) = node.parent_id.as_deref() {
                grouped.entry(parent_id).or_default().push(node);
            }
        }

        let children = grouped
            .into_iter()
            .map(|(parent_id, mut nodes)| {
                nodes.sort_by(|a, b| a.order_index.cmp(&b.order_index).then_with(|| a.id.cmp(&b.id)));
                (parent_id, nodes.into_iter().map(|node| node.id.as_str()).collect())
            })
            .collect();

        Self { children }
    }

    pub fn children(&self, id: &str) -> &[&'a str] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn child_count(&self, id: &str) -> usize {
        self.children(id).len()
    }

    pub fn has_children(&self, id: &str) -> bool {
        !self.children(id).is_empty()
    }

    /// `id` and every descendant reachable through this index
    pub fn descendants_of(&self, id: &'a str) -> BTreeSet<&'a str> {
        let mut out = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if out.insert(current) {
                stack.extend_from_slice(self.children(current));
            }
        }
        out
    }
}

/// `node_id` plus all of its descendants
pub fn subtree_ids(state: &TreeState, node_id: &str) -> Result<BTreeSet<String>, SubtreeError> {
    let Some(node) = state.node(node_id) else {
        return Err(SubtreeError::NodeNotFound(node_id.to_string()));
    };
    let index = ChildIndex::build(state);
    Ok(index
        .descendants_of(node.id.as_str())
        .into_iter()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(depth: usize) -> TreeState {
        let mut state = TreeState::new("n0", "Node 0");
        for i in 1..=depth {
            let id = format!("n{i}");
            state
                .nodes
                .insert(id.clone(), Node::new(id, Some(format!("n{}", i - 1)), format!("Node {i}"), 0));
        }
        state
    }

    #[test]
    fn test_subtree_includes_self_and_descendants() {
        let state = chain(3);
        let ids = subtree_ids(&state, "n1").unwrap();
        let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["n1", "n2", "n3"]);
    }

    #[test]
    fn test_subtree_of_leaf_is_itself() {
        let state = chain(2);
        let ids = subtree_ids(&state, "n2").unwrap();
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("n2"));
    }

    #[test]
    fn test_subtree_missing_node() {
        let state = chain(1);
        assert_eq!(
            subtree_ids(&state, "ghost").unwrap_err(),
            SubtreeError::NodeNotFound("ghost".into())
        );
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let state = chain(50_000);
        let ids = subtree_ids(&state, "n0").unwrap();
        assert_eq!(ids.len(), 50_001);
    }

    #[test]
    fn test_child_index_order() {
        let mut state = TreeState::new("root", "Root");
        state.nodes.insert("b".into(), Node::new("b", Some("root".into()), "B", 1));
        state.nodes.insert("a".into(), Node::new("a", Some("root".into()), "A", 0));
        let index = ChildIndex::build(&state);
        assert_eq!(index.children("root"), &["a", "b"]);
        assert_eq!(index.child_count("a"), 0);
        assert!(!index.has_children("b"));
    }
}
