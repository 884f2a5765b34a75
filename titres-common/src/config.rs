//! Configuration loading for the titres tooling
//!
//! Two-tier configuration:
//! 1. **TOML bootstrap**: backend URL, transport strategy, limits, logging.
//! 2. **Overrides**: command-line arguments and `TITRES_*` environment
//!    variables, applied by the consuming binary.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments
//! 2. Environment variables (`TITRES_API_BASE_URL`, `TITRES_TRANSPORT`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which ingestion endpoint a deployment uses.
///
/// The two integrations differ in route and multipart field naming but
/// share one response shape. The strategy is an explicit configuration
/// value resolved once at startup, never probed at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TransportStrategy {
    /// `POST <base>/titres/import-excel/`, multipart field `fichier`
    #[default]
    TitleApi,
    /// `POST <base>/upload-excel`, multipart field `file`
    DirectUpload,
}

impl std::str::FromStr for TransportStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "title-api" => Ok(TransportStrategy::TitleApi),
            "direct-upload" => Ok(TransportStrategy::DirectUpload),
            other => Err(Error::Config(format!(
                "Unknown transport strategy '{}' (expected 'title-api' or 'direct-upload')",
                other
            ))),
        }
    }
}

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Backend API section
    #[serde(default)]
    pub api: ApiConfig,

    /// Import pipeline section
    #[serde(default)]
    pub import: ImportConfig,

    /// Notification surface section
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the titles backend REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Import pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Active ingestion endpoint strategy
    #[serde(default)]
    pub transport: TransportStrategy,

    /// Accept `.csv` in addition to `.xlsx`/`.xls`
    #[serde(default)]
    pub accept_csv: bool,

    /// Maximum accepted file size in MiB
    #[serde(default = "default_max_file_size_mib")]
    pub max_file_size_mib: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            transport: TransportStrategy::default(),
            accept_csv: false,
            max_file_size_mib: default_max_file_size_mib(),
        }
    }
}

/// Notification surface configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Seconds before a notification auto-dismisses (5-7 typical)
    #[serde(default = "default_auto_dismiss_secs")]
    pub auto_dismiss_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            auto_dismiss_secs: default_auto_dismiss_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_file_size_mib() -> u64 {
    10
}

fn default_auto_dismiss_secs() -> u64 {
    6
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load configuration from an optional path, falling back to defaults
    ///
    /// A missing file is not an error when no explicit path was given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
