//! Application configuration management.
//!
//! Configuration is stored at `~/.config/boh-desk/config.json` and can be
//! overridden per run with `BOH_API_URL`, `BOH_USERNAME` and `BOH_EXPORT_DIR`
//! (a `.env` file is honored; the binary loads it before calling
//! [`Config::load`]).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "boh-desk";

const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_URL: &str = "http://localhost:8001";

pub const ENV_API_URL: &str = "BOH_API_URL";
pub const ENV_USERNAME: &str = "BOH_USERNAME";
pub const ENV_PASSWORD: &str = "BOH_PASSWORD";
pub const ENV_EXPORT_DIR: &str = "BOH_EXPORT_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub last_username: Option<String>,
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            last_username: None,
            export_dir: None,
        }
    }
}

impl Config {
    /// Load from disk and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from an environment lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(user) = get(ENV_USERNAME) {
            self.last_username = Some(user);
        }
        if let Some(dir) = get(ENV_EXPORT_DIR) {
            self.export_dir = Some(PathBuf::from(dir));
        }
    }

    /// Base URL for every API path: `{api_url}/api`.
    pub fn api_base(&self) -> String {
        format!("{}/api", self.api_url.trim_end_matches('/'))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Holds `session.json` and the log files.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Where CSV and print exports go: the configured directory, else the
    /// user's download directory, else the current directory.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base(), "http://localhost:8001/api");
        assert!(config.last_username.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            ENV_API_URL => Some("https://boh.example.org/".to_string()),
            ENV_USERNAME => Some("axle".to_string()),
            ENV_EXPORT_DIR => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base(), "https://boh.example.org/api");
        assert_eq!(config.last_username.as_deref(), Some("axle"));
        assert!(config.export_dir.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = serde_json::from_str(r#"{"last_username":"tank"}"#).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.last_username.as_deref(), Some("tank"));
    }
}
