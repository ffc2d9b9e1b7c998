pub mod apply;
pub mod check;
pub mod context;
pub mod init;
pub mod rows;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use context::{context, ContextArgs};
pub use init::{init, InitArgs};
pub use rows::{rows, RowsArgs};

use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use mindmap_editor::{NodeRow, Operation, Scope, ScopeRequest, TreeState};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ScopeArg {
    #[default]
    Global,
    Node,
}

/// Editing or rendering boundary
#[derive(Args, Debug, Clone)]
pub struct ScopeArgs {
    /// Scope of the request
    #[arg(long, value_enum, default_value_t = ScopeArg::Global)]
    pub scope: ScopeArg,

    /// Selected node id (required with --scope node)
    #[arg(long)]
    pub selected: Option<String>,
}

impl ScopeArgs {
    pub fn request(&self) -> ScopeRequest {
        ScopeRequest {
            scope: match self.scope {
                ScopeArg::Global => Scope::Global,
                ScopeArg::Node => Scope::Node,
            },
            selected_node_id: self.selected.clone(),
        }
    }
}

/// Load a mindmap saved either as a tree state object or as storage rows
pub fn read_state(path: &Path) -> Result<TreeState> {
    let content = fs::read_to_string(path).map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| anyhow!("Invalid JSON in {}: {}", path.display(), e))?;

    let state = if value.is_array() {
        let rows: Vec<NodeRow> = serde_json::from_value(value)?;
        TreeState::from_rows(None, rows)?
    } else {
        let state: TreeState = serde_json::from_value(value)?;
        state.validate()?;
        state
    };
    tracing::debug!(path = %path.display(), nodes = state.len(), "Loaded mindmap");
    Ok(state)
}

/// Load an operation batch: a JSON array, or an object with `operations`
pub fn read_operations(path: &Path) -> Result<Vec<Operation>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Batch {
        List(Vec<Operation>),
        Wrapped { operations: Vec<Operation> },
    }

    let content = fs::read_to_string(path).map_err(|e| anyhow!("Cannot read {}: {}", path.display(), e))?;
    let batch: Batch =
        serde_json::from_str(&content).map_err(|e| anyhow!("Invalid operations in {}: {}", path.display(), e))?;
    Ok(match batch {
        Batch::List(operations) | Batch::Wrapped { operations } => operations,
    })
}

/// Pretty JSON to `out`, or to stdout
pub fn write_json<T: Serialize + ?Sized>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => fs::write(path, json + "\n")?,
        None => println!("{json}"),
    }
    Ok(())
}
