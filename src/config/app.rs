//! Application configuration loading from config.toml
//!
//! The portal reads one TOML file holding server, database, assistant and
//! dashboard settings plus the seed catalog used to populate a fresh database.
//! A copy of the shipped `config.toml` is compiled into the binary and used
//! whenever no file is found on disk.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Built-in configuration, identical to the repository's `config.toml`.
pub const DEFAULT_CONFIG: &str = include_str!("../../config.toml");

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "RADPORTAL_CONFIG";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listener and upload settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Database location
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Completion service settings
    #[serde(default)]
    pub assistant: AssistantConfig,
    /// Device roster for the status board
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// Data written into a fresh database
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory holding uploaded guideline images
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Largest accepted request body, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL; `DATABASE_URL` overrides it
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Model name sent to the completion service
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the completion API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Open sessions kept before the least recently used one is dropped
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    /// Device tags shown on the status board, in display order
    #[serde(default)]
    pub devices: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    /// Announcement written when none is stored yet
    #[serde(default)]
    pub announcement: Option<String>,
    /// Guideline catalog, inserted per title when missing
    #[serde(default)]
    pub guidelines: Vec<GuidelineSeed>,
}

/// One seeded knowledge-base article
#[derive(Debug, Clone, Deserialize)]
pub struct GuidelineSeed {
    pub category: String,
    pub title: String,
    pub content: String,
    pub keywords: String,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

const fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

const fn default_max_sessions() -> usize {
    256
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns `Error::Config` if the TOML syntax is invalid or a field has the
/// wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `RADPORTAL_CONFIG` or `./config.toml`, falling
/// back to the built-in copy when the file does not exist.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV)
        .map_or_else(|_| PathBuf::from("config.toml"), PathBuf::from);

    if path.exists() {
        info!("Loading configuration from {}", path.display());
        load_config(&path)
    } else {
        info!("No configuration at {}, using built-in defaults", path.display());
        parse_config(DEFAULT_CONFIG)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_builtin_config_parses() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.seed.guidelines.len(), 8);
        assert!(config.seed.announcement.is_some());
        assert!(config.dashboard.devices.iter().any(|d| d == "CT"));
        assert_eq!(config.assistant.model, "gemini-2.5-flash");
        assert_eq!(config.assistant.max_sessions, 256);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.server.upload_dir, PathBuf::from("uploads"));
        assert!(config.database.url.is_none());
        assert!(config.seed.guidelines.is_empty());
        assert!(config.dashboard.devices.is_empty());
    }

    #[test]
    fn test_parse_guideline_seed() {
        let toml_str = r#"
            [seed]
            announcement = "hello"

            [[seed.guidelines]]
            category = "甲狀腺"
            title = "Nodule"
            content = "TI-RADS"
            keywords = "nodule, 結節"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.seed.announcement.as_deref(), Some("hello"));
        assert_eq!(config.seed.guidelines.len(), 1);
        assert_eq!(config.seed.guidelines[0].title, "Nodule");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = parse_config("[server\nbind = 3");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/radportal/config.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
