use super::write_json;
use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use mindmap_editor::{IdAllocator, TreeState, UuidAllocator};
use std::fs;
use std::path::Path;

pub const DEFAULT_MAP_NAME: &str = "mindmap.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Root node label
    #[arg(short, long, default_value = "Untitled")]
    pub title: String,

    /// Force overwrite existing files
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    if args.title.trim().is_empty() {
        return Err(anyhow!("Root title must not be empty"));
    }

    let config_path = cwd.join(DEFAULT_CONFIG_NAME);
    let map_path = cwd.join(DEFAULT_MAP_NAME);

    // Check if files already exist
    if (config_path.exists() || map_path.exists()) && !args.force {
        println!(
            "{} {} or {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white(),
            DEFAULT_MAP_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing mindmap...".bright_blue().bold());

    let config_json = serde_json::to_string_pretty(&Config::default())?;
    fs::write(&config_path, config_json + "\n")?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let state = TreeState::new(UuidAllocator.allocate(), args.title.as_str());
    write_json(&state, Some(&map_path))?;
    println!("  {} Created {}", "✓".green(), DEFAULT_MAP_NAME);

    println!();
    println!("{}", "✅ Mindmap initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Write an operation batch, e.g. ops.json");
    println!("  2. Run: mindmap apply --state {DEFAULT_MAP_NAME} --ops ops.json --out {DEFAULT_MAP_NAME}");
    println!("  3. Run: mindmap context --state {DEFAULT_MAP_NAME} --format text");

    Ok(())
}
