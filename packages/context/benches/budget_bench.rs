use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mindmap_context::render_context;
use mindmap_editor::{apply, Node, Operation, ScopeRequest, TreeState};

fn generated_tree(fanout: usize, levels: usize) -> TreeState {
    let mut state = TreeState::new("root", "Roadmap");
    let mut frontier = vec!["root".to_string()];
    for _ in 0..levels {
        let mut next = Vec::new();
        for parent in &frontier {
            for i in 0..fanout {
                let id = format!("{parent}.{i}");
                state
                    .nodes
                    .insert(id.clone(), Node::new(id.clone(), Some(parent.clone()), format!("Item {id}"), i));
                next.push(id);
            }
        }
        frontier = next;
    }
    state
}

fn render_global_fits(c: &mut Criterion) {
    let state = generated_tree(10, 3);

    c.bench_function("render_global_fits", |b| {
        b.iter(|| render_context(black_box(&state), &ScopeRequest::global(), None))
    });
}

fn render_global_shrinks(c: &mut Criterion) {
    let state = generated_tree(10, 4);

    c.bench_function("render_global_shrinks", |b| {
        b.iter(|| render_context(black_box(&state), &ScopeRequest::global(), Some(2_000)))
    });
}

fn render_node_scope(c: &mut Criterion) {
    let state = generated_tree(10, 4);
    let request = ScopeRequest::node("root.4.2");

    c.bench_function("render_node_scope", |b| {
        b.iter(|| render_context(black_box(&state), &request, None))
    });
}

fn apply_large_batch(c: &mut Criterion) {
    let state = generated_tree(10, 3);
    let operations: Vec<Operation> = (0..200)
        .map(|i| Operation::AddNode {
            node_id: format!("new.{i}"),
            parent_id: format!("root.{}", i % 10),
            text: format!("New item {i}"),
            index: Some(0),
        })
        .chain((0..10).map(|i| Operation::MoveNode {
            node_id: format!("root.{i}.0"),
            new_parent_id: format!("root.{}", (i + 1) % 10),
            index: None,
        }))
        .collect();

    c.bench_function("apply_large_batch", |b| {
        b.iter(|| apply(black_box(&state), black_box(&operations)))
    });
}

criterion_group!(
    benches,
    render_global_fits,
    render_global_shrinks,
    render_node_scope,
    apply_large_batch
);
criterion_main!(benches);
