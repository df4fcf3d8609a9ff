//! Top-level application configuration.
//!
//! Configuration is stored in `<root>/config.json` and covers the CLI's
//! defaults: who mutations are attributed to and which priority new
//! tickets get when none is given. A missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::types::Priority;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Actor recorded on history events when no `--actor` is given.
    #[serde(default = "default_actor")]
    pub default_actor: String,

    #[serde(default)]
    pub default_priority: Priority,
}

fn default_actor() -> String {
    std::env::var("USER").unwrap_or_else(|_| "cli".to_string())
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_actor: default_actor(),
            default_priority: Priority::default(),
        }
    }
}

impl Config {
    /// Load from `<root>/config.json`, falling back to defaults when the
    /// file does not exist.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.default_priority, Priority::Normal);
        assert!(!config.default_actor.is_empty());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"default_priority": "high"}"#,
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.default_priority, Priority::High);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }
}
