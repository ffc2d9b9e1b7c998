//! Untrusted batches: id normalization, scope confinement, and the
//! three-stage pipeline run end to end.

use mindmap_editor::{
    apply, is_stable_id, normalize_operations, validate_scope, Author, Document, EditorError, Node, NormalizeError,
    Operation, Pipeline, ScopeError, ScopeRequest, SequentialAllocator, TreeState,
};

const ROOT: &str = "10000000-0000-0000-0000-000000000000";
const LEFT: &str = "10000000-0000-0000-0000-000000000001";
const RIGHT: &str = "10000000-0000-0000-0000-000000000002";
const LEFT_CHILD: &str = "10000000-0000-0000-0000-000000000003";

fn tree() -> TreeState {
    let mut state = TreeState::new(ROOT, "Plan");
    state.nodes.insert(LEFT.into(), Node::new(LEFT, Some(ROOT.into()), "Research", 0));
    state.nodes.insert(RIGHT.into(), Node::new(RIGHT, Some(ROOT.into()), "Launch", 1));
    state
        .nodes
        .insert(LEFT_CHILD.into(), Node::new(LEFT_CHILD, Some(LEFT.into()), "Interviews", 0));
    state
}

fn add(id: &str, parent: &str) -> Operation {
    Operation::AddNode {
        node_id: id.into(),
        parent_id: parent.into(),
        text: format!("Node {id}"),
        index: None,
    }
}

#[test]
fn test_normalize_stable_batch_is_noop() {
    let state = tree();
    let ops = vec![
        add("20000000-0000-0000-0000-000000000000", LEFT),
        Operation::RenameNode {
            node_id: RIGHT.into(),
            text: "Go live".into(),
        },
        Operation::ReorderChildren {
            parent_id: ROOT.into(),
            ordered_child_ids: vec![RIGHT.into(), LEFT.into()],
        },
    ];

    let out = normalize_operations(&state, &ops, &mut SequentialAllocator::default()).unwrap();
    assert_eq!(out.operations, ops);
    assert!(out.id_map.is_empty());

    let again = normalize_operations(&state, &out.operations, &mut SequentialAllocator::default()).unwrap();
    assert_eq!(again.operations, out.operations);
}

#[test]
fn test_normalize_rewrites_every_reference() {
    let state = tree();
    let ops = vec![
        add("topic", LEFT),
        add("detail", "topic"),
        Operation::MoveNode {
            node_id: LEFT_CHILD.into(),
            new_parent_id: "detail".into(),
            index: None,
        },
        Operation::ReorderChildren {
            parent_id: LEFT.into(),
            ordered_child_ids: vec!["topic".into()],
        },
        Operation::DeleteNode {
            node_id: "detail".into(),
        },
    ];

    let out = normalize_operations(&state, &ops, &mut SequentialAllocator::new(100)).unwrap();
    let topic = out.id_map["topic"].clone();
    let detail = out.id_map["detail"].clone();
    assert_ne!(topic, detail);
    assert!(is_stable_id(&topic) && is_stable_id(&detail));

    assert_eq!(
        out.operations[1],
        Operation::AddNode {
            node_id: detail.clone(),
            parent_id: topic.clone(),
            text: "Node detail".into(),
            index: None,
        }
    );
    assert_eq!(
        out.operations[2],
        Operation::MoveNode {
            node_id: LEFT_CHILD.into(),
            new_parent_id: detail.clone(),
            index: None,
        }
    );
    assert_eq!(
        out.operations[3],
        Operation::ReorderChildren {
            parent_id: LEFT.into(),
            ordered_child_ids: vec![topic.clone()],
        }
    );
    assert_eq!(out.operations[4], Operation::DeleteNode { node_id: detail });
}

#[test]
fn test_normalize_rejects_duplicate_placeholder() {
    let state = tree();
    let ops = vec![add("x", LEFT), add("x", RIGHT)];
    assert_eq!(
        normalize_operations(&state, &ops, &mut SequentialAllocator::default()).unwrap_err(),
        NormalizeError::Duplicate("x".into())
    );
}

#[test]
fn test_normalize_rejects_existing_id() {
    let state = tree();
    let ops = vec![add(LEFT, ROOT)];
    let err = normalize_operations(&state, &ops, &mut SequentialAllocator::default()).unwrap_err();
    assert_eq!(err, NormalizeError::AlreadyExists(LEFT.into()));
    assert!(err.to_string().contains("must be new"));
}

#[test]
fn test_fresh_ids_avoid_stable_ids_in_same_batch() {
    let state = tree();
    // The allocator's first pick collides with a stable id proposed in the batch
    let ops = vec![add("00000000-0000-0000-0000-000000000001", ROOT), add("tmp", ROOT)];
    let out = normalize_operations(&state, &ops, &mut SequentialAllocator::new(1)).unwrap();
    assert_eq!(out.id_map["tmp"], "00000000-0000-0000-0000-000000000002");
}

#[test]
fn test_scope_allows_add_then_edit_inside_subtree() {
    let state = tree();
    let ops = vec![
        add("30000000-0000-0000-0000-000000000000", LEFT_CHILD),
        Operation::RenameNode {
            node_id: "30000000-0000-0000-0000-000000000000".into(),
            text: "Follow-up".into(),
        },
        Operation::MoveNode {
            node_id: LEFT_CHILD.into(),
            new_parent_id: LEFT.into(),
            index: Some(0),
        },
    ];
    assert!(validate_scope(&state, &ScopeRequest::node(LEFT), &ops).is_ok());
    assert!(apply(&state, &ops).is_ok());
}

#[test]
fn test_scope_rejects_add_under_outside_parent() {
    let state = tree();
    let ops = vec![add("30000000-0000-0000-0000-000000000000", RIGHT)];
    let err = validate_scope(&state, &ScopeRequest::node(LEFT), &ops).unwrap_err();
    assert_eq!(
        err,
        ScopeError::OutOfScope {
            index: 0,
            kind: "add_node",
            node_id: RIGHT.into(),
        }
    );
}

#[test]
fn test_scope_rejects_reorder_naming_outside_child() {
    let state = tree();
    let ops = vec![Operation::ReorderChildren {
        parent_id: LEFT.into(),
        ordered_child_ids: vec![RIGHT.into()],
    }];
    assert!(validate_scope(&state, &ScopeRequest::node(LEFT), &ops).is_err());
}

#[test]
fn test_scope_unknown_selection() {
    let state = tree();
    assert_eq!(
        validate_scope(&state, &ScopeRequest::node("ghost"), &[]).unwrap_err(),
        ScopeError::SelectedNotFound("ghost".into())
    );
}

#[test]
fn test_pipeline_end_to_end() {
    let mut doc = Document::from_state(tree()).unwrap();
    let mut pipeline = Pipeline::new(SequentialAllocator::new(500));

    let ops = vec![
        add("q1", LEFT),
        Operation::UpdateNotes {
            node_id: "q1".into(),
            notes: Some("Ask about pricing".into()),
        },
    ];
    let edit = pipeline.agent_edit(&mut doc, &ScopeRequest::node(LEFT), &ops).unwrap();

    assert_eq!(edit.version, 1);
    assert_eq!(edit.summary.added, 1);
    assert_eq!(edit.summary.notes_updated, 1);
    let q1 = &edit.id_map["q1"];
    assert!(edit.diff.touched().contains(q1.as_str()));
    assert_eq!(doc.history()[0].author, Author::Agent);
    assert_eq!(doc.state().node(q1).unwrap().parent_id.as_deref(), Some(LEFT));
}

#[test]
fn test_pipeline_scope_failure_keeps_document() {
    let mut doc = Document::from_state(tree()).unwrap();
    let mut pipeline = Pipeline::new(SequentialAllocator::default());

    let ops = vec![Operation::DeleteNode { node_id: RIGHT.into() }];
    let result = pipeline.agent_edit(&mut doc, &ScopeRequest::node(LEFT), &ops);

    assert!(matches!(result, Err(EditorError::Scope(_))));
    assert_eq!(doc.version(), 0);
    assert_eq!(doc.state(), &tree());
}
