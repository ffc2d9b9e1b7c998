use super::{read_operations, read_state, write_json, ScopeArgs};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mindmap_editor::{diff_states, validate_scope, Author, BatchSummary, Document, Pipeline, StateDiff};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Mindmap file (tree state JSON or storage rows)
    #[arg(long)]
    pub state: PathBuf,

    /// Operation batch file
    #[arg(long)]
    pub ops: PathBuf,

    /// Treat the batch as agent output: allocate ids for placeholders first
    #[arg(long)]
    pub agent: bool,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Write the new state here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Write storage rows instead of the tree state
    #[arg(long)]
    pub rows: bool,
}

pub fn apply(args: ApplyArgs) -> Result<()> {
    let state = read_state(&args.state)?;
    let operations = read_operations(&args.ops)?;
    let request = args.scope.request();
    let mut document = Document::from_state(state)?;

    let (summary, diff) = if args.agent {
        let edit = Pipeline::default().agent_edit(&mut document, &request, &operations)?;
        for (placeholder, id) in &edit.id_map {
            eprintln!("   {} {} → {}", "id".dimmed(), placeholder, id);
        }
        (edit.summary, edit.diff)
    } else {
        validate_scope(document.state(), &request, &operations)?;
        let before = document.state().clone();
        let summary = document.apply(Author::Human, operations)?.summary.clone();
        (summary, diff_states(&before, document.state()))
    };

    report(&summary, &diff);

    if args.rows {
        write_json(&document.state().to_rows(), args.out.as_deref())?;
    } else {
        write_json(document.state(), args.out.as_deref())?;
    }
    if let Some(out) = &args.out {
        eprintln!("   {} Wrote {}", "✓".green(), out.display());
    }

    Ok(())
}

fn report(summary: &BatchSummary, diff: &StateDiff) {
    eprintln!("{} {}", "Applied:".green().bold(), summary);
    if !diff.is_empty() {
        eprintln!("   {} node(s) touched", diff.touched().len());
    }
}
