//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings used when fetching source pages
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Item store location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Search endpoint listen address
    #[serde(default)]
    pub server: ServerConfig,

    /// Input file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Title preprocessing settings
    #[serde(default)]
    pub cleaning: CleaningConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::config("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::config("crawler.timeout_secs must be > 0"));
        }
        if self.storage.database_path.as_os_str().is_empty() {
            return Err(AppError::config("storage.database_path is empty"));
        }
        if self.server.port == 0 {
            return Err(AppError::config("server.port must be > 0"));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file
    #[serde(default = "defaults::database_path")]
    pub database_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: defaults::database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "defaults::host")]
    pub host: String,

    #[serde(default = "defaults::port")]
    pub port: u16,
}

impl ServerConfig {
    /// Address string suitable for binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::host(),
            port: defaults::port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// JSON file holding the source rules
    #[serde(default = "defaults::rules_file")]
    pub rules_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            rules_file: defaults::rules_file(),
        }
    }
}

/// Text cleaning/preprocessing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Collapse whitespace runs in titles and trim them
    #[serde(default = "defaults::normalize_whitespace")]
    pub normalize_whitespace: bool,

    /// Substrings to remove from titles
    #[serde(default)]
    pub title_remove_patterns: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            normalize_whitespace: defaults::normalize_whitespace(),
            title_remove_patterns: Vec::new(),
        }
    }
}

impl CleaningConfig {
    /// Clean a title string.
    pub fn clean_title(&self, text: &str) -> String {
        let mut result = if self.normalize_whitespace {
            Self::collapse_whitespace(text)
        } else {
            text.to_string()
        };

        for pattern in self.title_remove_patterns.iter().filter(|p| !p.is_empty()) {
            result = result.replace(pattern.as_str(), "");
        }

        if self.normalize_whitespace {
            result.trim().to_string()
        } else {
            result
        }
    }

    fn collapse_whitespace(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; news-harvester/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn database_path() -> PathBuf {
        PathBuf::from("news.db")
    }
    pub fn host() -> String {
        "127.0.0.1".into()
    }
    pub fn port() -> u16 {
        8383
    }
    pub fn rules_file() -> PathBuf {
        PathBuf::from("rules.json")
    }
    pub fn normalize_whitespace() -> bool {
        true
    }
}
