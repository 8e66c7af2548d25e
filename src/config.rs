//! Service configuration.
//!
//! Loaded from TOML when a file is given, defaults otherwise. The binary
//! applies CLI overrides on top.

use std::collections::HashSet;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{BubbleError, Result};

pub const DEFAULT_CATEGORIES: [&str; 6] = ["Politics", "Technology", "Health", "Science", "Sports", "Culture"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleConfig {
    /// Initial category list, in index order
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Seconds before an unanswered disclosure request may be replaced.
    /// `None` keeps requests open until the next analysis.
    #[serde(default)]
    pub disclosure_timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            disclosure_timeout_secs: None,
            log_level: default_log_level(),
        }
    }
}

impl BubbleConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| BubbleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` if it exists, fall back to defaults if it does not.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| BubbleError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in &self.categories {
            if name.trim().is_empty() {
                return Err(BubbleError::Config("blank category name".into()));
            }
            if !seen.insert(name.as_str()) {
                return Err(BubbleError::Config(format!("duplicate category {name:?}")));
            }
        }
        if self.disclosure_timeout_secs == Some(0) {
            return Err(BubbleError::Config("disclosure_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn disclosure_timeout(&self) -> Option<Duration> {
        self.disclosure_timeout_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(Duration::seconds)
    }
}
