use super::{read_operations, read_state, ScopeArgs};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mindmap_editor::{summarize_batch, validate_scope, ChildIndex, TreeState};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Mindmap file (tree state JSON or storage rows)
    #[arg(long)]
    pub state: PathBuf,

    /// Dry-run this batch without writing anything
    #[arg(long)]
    pub ops: Option<PathBuf>,

    #[command(flatten)]
    pub scope: ScopeArgs,
}

pub fn check(args: CheckArgs) -> Result<()> {
    // Loading validates every invariant
    let state = read_state(&args.state)?;

    let shape = Shape::of(&state);
    eprintln!(
        "{} {} nodes, {} leaves, depth {}",
        "✓".green(),
        shape.nodes,
        shape.leaves,
        shape.depth
    );

    if let Some(ops) = &args.ops {
        let operations = read_operations(ops)?;
        validate_scope(&state, &args.scope.request(), &operations)?;
        let summary = summarize_batch(&state, &operations)?;
        eprintln!(
            "{} {} operation(s) would apply: {}",
            "✓".green(),
            operations.len(),
            summary
        );
    }

    Ok(())
}

/// Node, leaf and depth counts of a validated tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
}

impl Shape {
    /// One pass from the root over an explicit stack
    pub fn of(state: &TreeState) -> Self {
        let index = ChildIndex::build(state);
        let mut shape = Shape {
            nodes: 0,
            leaves: 0,
            depth: 0,
        };
        let mut stack = vec![(state.root_node_id.as_str(), 0usize)];
        while let Some((id, depth)) = stack.pop() {
            shape.nodes += 1;
            shape.depth = shape.depth.max(depth);
            let children = index.children(id);
            if children.is_empty() {
                shape.leaves += 1;
            }
            stack.extend(children.iter().map(|child| (*child, depth + 1)));
        }
        shape
    }
}
