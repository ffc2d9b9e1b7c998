mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, check, context, init, rows, ApplyArgs, CheckArgs, ContextArgs, InitArgs, RowsArgs};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Mindmap CLI - apply operation batches and render agent context
#[derive(Parser, Debug)]
#[command(name = "mindmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./mindmap.config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and a fresh single-root mindmap
    Init(InitArgs),

    /// Apply an operation batch to a mindmap
    Apply(ApplyArgs),

    /// Render budgeted outline context for an agent
    Context(ContextArgs),

    /// Flatten a mindmap into storage rows
    Rows(RowsArgs),

    /// Validate a mindmap, and optionally dry-run a batch against it
    Check(CheckArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd, cli.config.as_deref())?;

    // JSON goes to stdout, so diagnostics stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Apply(args) => apply(args),
        Command::Context(args) => context(args, &config),
        Command::Rows(args) => rows(args),
        Command::Check(args) => check(args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
