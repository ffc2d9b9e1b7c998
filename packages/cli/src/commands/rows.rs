use super::{read_state, write_json};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RowsArgs {
    /// Mindmap file (tree state JSON or storage rows)
    #[arg(long)]
    pub state: PathBuf,

    /// Write rows here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn rows(args: RowsArgs) -> Result<()> {
    let state = read_state(&args.state)?;
    write_json(&state.to_rows(), args.out.as_deref())
}
