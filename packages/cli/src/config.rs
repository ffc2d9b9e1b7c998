use anyhow::{anyhow, Result};
use mindmap_context::{BudgetLimits, DEFAULT_BUDGET, MAX_BUDGET};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "mindmap.config.json";

/// Mindmap configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Character budget used when `--budget` is not given
    #[serde(default = "default_context_budget")]
    pub context_budget: usize,

    /// Hard ceiling on any requested budget
    #[serde(default = "default_max_budget")]
    pub max_budget: usize,

    /// Filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_context_budget() -> usize {
    DEFAULT_BUDGET
}

fn default_max_budget() -> usize {
    MAX_BUDGET
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load `explicit`, or the default config file in `cwd` if present
    pub fn load(cwd: &Path, explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) if !path.exists() => {
                return Err(anyhow!("Config file not found: {}", path.display()));
            }
            Some(path) => path.to_path_buf(),
            None => cwd.join(DEFAULT_CONFIG_NAME),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| anyhow!("Invalid config {}: {}", config_path.display(), e))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn budget_limits(&self) -> BudgetLimits {
        BudgetLimits {
            default_budget: self.context_budget,
            max_budget: self.max_budget,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            context_budget: default_context_budget(),
            max_budget: default_max_budget(),
            log_level: default_log_level(),
        }
    }
}
