// src/config.rs
// =============================================================================
// Optional TOML configuration.
//
// Example:
//
//   [crawl]
//   max_depth = 3
//   concurrency = 8
//
//   [formats]
//   include_builtin = true
//
//   [[formats.families]]
//   name = "Esri File Geodatabase"
//   main = "gdbtable"
//   related = ["gdbtablx", "gdbindexes"]
//
// Every key has a default, so an empty file (or no file at all) is valid.
// Command-line flags override the [crawl] values.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::formats::{FormatFamily, FormatRegistry};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub formats: FormatsConfig,
}

/// Crawler behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Listing levels to descend into (1 = only the starting listing)
    pub max_depth: usize,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Children probed at the same time within one listing
    pub concurrency: usize,
    /// Pause after each listing page, to go easy on the server
    pub delay_ms: u64,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        CrawlConfig {
            max_depth: 3,
            timeout_secs: 10,
            concurrency: 8,
            delay_ms: 100,
            user_agent: concat!("link-bundler/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatsConfig {
    /// Start from the built-in families
    pub include_builtin: bool,
    /// Extra families, registered after the built-ins
    pub families: Vec<FormatFamily>,
}

impl Default for FormatsConfig {
    fn default() -> Self {
        FormatsConfig {
            include_builtin: true,
            families: Vec::new(),
        }
    }
}

impl Config {
    /// Reads a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        info!(
            path = %path.display(),
            families = config.formats.families.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Builds the format registry this config describes.
    pub fn registry(&self) -> Result<FormatRegistry> {
        let mut registry = if self.formats.include_builtin {
            FormatRegistry::builtin()
        } else {
            FormatRegistry::default()
        };

        registry
            .extend(self.formats.families.clone())
            .context("Invalid format family in config")?;
        Ok(registry)
    }
}
