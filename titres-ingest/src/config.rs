//! Settings resolution for the ingest binary
//!
//! Multi-tier resolution with CLI > ENV > TOML > built-in default
//! priority. Resolution happens once at startup; nothing downstream
//! probes configuration at call time.

use std::time::Duration;
use titres_common::config::{TomlConfig, TransportStrategy};
use titres_common::{Error, Result};
use tracing::{info, warn};

/// Environment variable overriding the backend base URL
pub const ENV_BASE_URL: &str = "TITRES_API_BASE_URL";

/// Environment variable overriding the transport strategy
pub const ENV_TRANSPORT: &str = "TITRES_TRANSPORT";

/// Command-line overrides collected by the binary
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub transport: Option<TransportStrategy>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Backend API base URL
    pub base_url: String,
    /// Active ingestion endpoint strategy
    pub transport: TransportStrategy,
    /// Accept `.csv` uploads
    pub accept_csv: bool,
    /// Size ceiling in bytes
    pub max_file_size_bytes: u64,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Notification auto-dismiss duration
    pub auto_dismiss: Duration,
    /// Log level string for the subscriber
    pub log_level: String,
}

/// Resolve settings from overrides, environment, and TOML
pub fn resolve_settings(
    overrides: &ConfigOverrides,
    toml_config: &TomlConfig,
) -> Result<IngestSettings> {
    let base_url = resolve_base_url(overrides, toml_config);
    let transport = resolve_transport(overrides, toml_config)?;

    Ok(IngestSettings {
        base_url,
        transport,
        accept_csv: toml_config.import.accept_csv,
        max_file_size_bytes: toml_config.import.max_file_size_mib * 1024 * 1024,
        timeout: Duration::from_secs(toml_config.api.timeout_secs),
        auto_dismiss: Duration::from_secs(toml_config.notifications.auto_dismiss_secs),
        log_level: toml_config.logging.level.clone(),
    })
}

fn resolve_base_url(overrides: &ConfigOverrides, toml_config: &TomlConfig) -> String {
    if let Some(url) = &overrides.base_url {
        info!(url = %url, "Backend URL from command line");
        return url.clone();
    }

    if let Ok(url) = std::env::var(ENV_BASE_URL) {
        if !url.trim().is_empty() {
            info!(url = %url, "Backend URL from environment");
            return url;
        }
        warn!("{} is set but empty, ignoring", ENV_BASE_URL);
    }

    toml_config.api.base_url.clone()
}

fn resolve_transport(
    overrides: &ConfigOverrides,
    toml_config: &TomlConfig,
) -> Result<TransportStrategy> {
    if let Some(strategy) = overrides.transport {
        return Ok(strategy);
    }

    if let Ok(value) = std::env::var(ENV_TRANSPORT) {
        if !value.trim().is_empty() {
            return value.parse().map_err(|_: Error| {
                Error::Config(format!(
                    "{}='{}' is not a known transport strategy",
                    ENV_TRANSPORT, value
                ))
            });
        }
    }

    Ok(toml_config.import.transport)
}
