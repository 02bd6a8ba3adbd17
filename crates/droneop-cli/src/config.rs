//! CLI configuration from environment.

use anyhow::{Context, Result};
use droneop_core::FormRules;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file overriding the default form rules
    pub rules_path: Option<PathBuf>,
    /// Directory export files are written to when no path is given
    pub export_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            rules_path: env::var("DRONEOP_RULES").ok().map(PathBuf::from),
            export_dir: env::var("DRONEOP_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Apply command-line flags on top of the environment.
    pub fn with_overrides(mut self, rules_path: Option<PathBuf>, export_dir: Option<PathBuf>) -> Self {
        if rules_path.is_some() {
            self.rules_path = rules_path;
        }
        if let Some(dir) = export_dir {
            self.export_dir = dir;
        }
        self
    }

    pub fn load_rules(&self) -> Result<FormRules> {
        let Some(path) = &self.rules_path else {
            return Ok(FormRules::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read rules file {}", path.display()))?;
        let rules = serde_json::from_str(&raw)
            .with_context(|| format!("invalid rules file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded form rules");
        Ok(rules)
    }
}
