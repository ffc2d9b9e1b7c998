use super::{read_state, ScopeArgs};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use mindmap_context::{render_context_with, RenderOutcome};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

#[derive(Args, Debug)]
pub struct ContextArgs {
    /// Mindmap file (tree state JSON or storage rows)
    #[arg(long)]
    pub state: PathBuf,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Character budget (defaults to contextBudget from config)
    #[arg(short, long)]
    pub budget: Option<usize>,

    /// Output format (json, text)
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

pub fn context(args: ContextArgs, config: &Config) -> Result<()> {
    let state = read_state(&args.state)?;
    let outcome = render_context_with(&state, &args.scope.request(), args.budget, &config.budget_limits())?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => {
            if let RenderOutcome::Ok { context, .. } = &outcome {
                println!("{context}");
            }
        }
    }

    let meta = outcome.meta();
    match &outcome {
        RenderOutcome::Ok { .. } => {
            eprintln!(
                "{} {} chars, {} lines (budget {}, attempt {}){}",
                "Context:".green().bold(),
                meta.chars,
                meta.lines,
                meta.budget,
                meta.attempts,
                if meta.truncated { ", truncated" } else { "" }
            );
            Ok(())
        }
        RenderOutcome::TooLarge { hints, .. } => {
            for hint in hints {
                eprintln!("   {} {}", "hint:".yellow(), hint);
            }
            Err(anyhow!(
                "Context too large: {} chars after {} attempts, budget {}",
                meta.chars,
                meta.attempts,
                meta.budget
            ))
        }
    }
}
