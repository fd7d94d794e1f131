//! # CLI Configuration
//!
//! Optional YAML file supplying defaults for the conversion subcommands.
//! Every section may be omitted; command-line flags override whatever the
//! file sets.
//!
//! ```yaml
//! formats: ["%d/%m/%Y", "unix-milli"]
//! rounding:
//!   mode: auto
//!   places: 2
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use anyval_core::{RoundingMode, RoundingPolicy};

/// Defaults loaded from `--config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Candidate formats for `time` when none are given on the command line.
    pub formats: Vec<String>,
    /// Rounding applied by `float` unless overridden.
    pub rounding: RoundingPolicy,
}

impl CliConfig {
    /// Load from `path`, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            formats = config.formats.len(),
            rounding = %config.rounding.mode,
            "loaded config"
        );
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as unit, not as an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: Self = serde_yaml::from_str(content)?;
        config.rounding = RoundingPolicy::new(config.rounding.mode, config.rounding.places);
        Ok(config)
    }

    /// The file's rounding policy with any command-line overrides applied.
    pub fn rounding_with(&self, mode: Option<RoundingMode>, places: Option<i32>) -> RoundingPolicy {
        RoundingPolicy::new(
            mode.unwrap_or(self.rounding.mode),
            places.unwrap_or(self.rounding.places),
        )
    }

    /// Command-line formats when any were given, otherwise the file's.
    pub fn formats_with<'a>(&'a self, flags: &'a [String]) -> &'a [String] {
        if flags.is_empty() {
            &self.formats
        } else {
            flags
        }
    }
}
