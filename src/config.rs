// Configuration for syncdocs
// Process-wide settings come from environment variables, per-project settings
// from `_syncdocs/config.yaml`.

use crate::util;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

pub const DEFAULT_OUTPUT_DIR: &str = "_syncdocs";
pub const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Process-wide configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Token budget for one discovery call (SYNCDOCS_DISCOVERY_MAX_TOKENS)
    pub discovery_max_tokens: u32,

    /// Path cap for path queries (SYNCDOCS_MAX_PATHS)
    pub max_paths: usize,

    /// Model used when the project config names none (SYNCDOCS_MODEL)
    pub model: String,

    /// Anthropic API key (ANTHROPIC_API_KEY)
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discovery_max_tokens: 1024,
            max_paths: 10,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let mut config = Config::default();
        parse_env("SYNCDOCS_DISCOVERY_MAX_TOKENS", &mut config.discovery_max_tokens);
        parse_env("SYNCDOCS_MAX_PATHS", &mut config.max_paths);
        if let Ok(val) = env::var("SYNCDOCS_MODEL") {
            if !val.trim().is_empty() {
                config.model = val.trim().to_string();
            }
        }
        config.api_key = env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}

fn parse_env<T>(name: &str, slot: &mut T)
where
    T: FromStr + std::fmt::Display,
{
    let Ok(val) = env::var(name) else {
        return;
    };
    match val.trim().parse() {
        Ok(parsed) => *slot = parsed,
        Err(_) => tracing::warn!("invalid {name} value: {val}, using default: {slot}"),
    }
}

/// Settings read from `<project>/_syncdocs/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(alias = "dir", default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub model: Option<String>,
}

fn default_output_dir() -> String {
    DEFAULT_OUTPUT_DIR.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            model: None,
        }
    }
}

impl ProjectConfig {
    pub fn config_path(project_root: &Path) -> PathBuf {
        project_root.join(DEFAULT_OUTPUT_DIR).join(CONFIG_FILE)
    }

    /// Defaults when the file does not exist; a file that exists but does not
    /// parse is an error.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = Self::config_path(project_root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = util::read_to_string(&path)?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(&raw).with_context(|| format!("parse {}", path.display()))
    }

    pub fn output_dir(&self, project_root: &Path) -> PathBuf {
        let dir = Path::new(&self.output_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            project_root.join(dir)
        }
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| Config::get().model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.discovery_max_tokens, 1024);
        assert_eq!(config.max_paths, 10);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn missing_project_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.output_dir(dir.path()), dir.path().join("_syncdocs"));
    }

    #[test]
    fn project_config_accepts_dir_alias() {
        let dir = tempfile::tempdir().unwrap();
        let path = ProjectConfig::config_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();

        fs::write(&path, "outputDir: docs/generated\nstyle: concise\n").unwrap();
        let config = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(config.output_dir, "docs/generated");
        assert_eq!(config.model, None);

        fs::write(&path, "dir: out\nmodel: claude-x\n").unwrap();
        let config = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(config.output_dir, "out");
        assert_eq!(config.model(), "claude-x");
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = ProjectConfig::config_path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "outputDir: [unterminated\n").unwrap();
        assert!(ProjectConfig::load(dir.path()).is_err());
    }
}
