//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the backend base URL and the last used username.
//!
//! Configuration is stored at `~/.config/quill/config.json`. The base URL
//! can be overridden per-invocation with `--api-url` or the `QUILL_API_URL`
//! environment variable; that is the only process-boundary configuration
//! the client takes.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/session directory paths
const APP_NAME: &str = "quill";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Fallback backend URL for local development servers.
const DEFAULT_API_URL: &str = "http://localhost:4000/api";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
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

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Resolve the backend base URL: CLI/env override first, then the
    /// config file, then the local default.
    pub fn resolve_api_url(&self, cli_override: Option<&str>) -> String {
        cli_override
            .map(str::to_string)
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Directory holding the persisted session keys.
    pub fn session_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_api_url_prefers_override() {
        let config = Config {
            api_base_url: Some("https://configured.example/api".to_string()),
            last_username: None,
        };
        assert_eq!(
            config.resolve_api_url(Some("https://cli.example/api")),
            "https://cli.example/api"
        );
        assert_eq!(
            config.resolve_api_url(None),
            "https://configured.example/api"
        );
    }

    #[test]
    fn test_resolve_api_url_falls_back_to_default() {
        assert_eq!(Config::default().resolve_api_url(None), DEFAULT_API_URL);
    }
}
