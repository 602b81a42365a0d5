use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::render::Theme;

pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";
pub const LIBRARY_ENV: &str = "SIMULADO_LIBRARY";
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_QUESTIONS: u32 = 10;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub default_model: Option<String>,
    pub library_dir: Option<PathBuf>,
    pub default_questions: Option<u32>,
    #[serde(default)]
    pub theme: Theme,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine config directory")?;
        Ok(base.join("simulado"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            Self::parse(&content)
        } else {
            tracing::debug!("No config file at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Load config, falling back to defaults when the file is unreadable so
    /// the settings screen stays reachable
    pub fn load_or_default() -> Self {
        Self::or_default(Self::load())
    }

    fn or_default(loaded: Result<Self>) -> Self {
        loaded.unwrap_or_else(|e| {
            tracing::warn!("Ignoring config file: {:#}", e);
            Config::default()
        })
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config file")
    }

    /// Save config to file with secure permissions (600)
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let dir = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Config path has no parent directory"))?;

        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&path, &content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        // Owner read/write only, the file holds the API key
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)
                .with_context(|| "Failed to set config file permissions")?;
        }

        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_some()
    }

    /// Get the API key, checking the environment variable as fallback
    pub fn get_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }

    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn question_count(&self) -> u32 {
        self.default_questions
            .map(crate::quiz::clamp_question_count)
            .unwrap_or(DEFAULT_QUESTIONS)
    }

    /// Resolve the library root: explicit override, then environment, then
    /// the configured directory, then the working directory.
    pub fn library_root(&self, cli_override: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = cli_override {
            return Ok(dir);
        }
        if let Ok(dir) = std::env::var(LIBRARY_ENV)
            && !dir.is_empty()
        {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.library_dir {
            return Ok(dir.clone());
        }
        std::env::current_dir().context("Could not determine the working directory")
    }
}
