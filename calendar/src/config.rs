use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::calendar_grid::DEFAULT_EVENTS_PER_DAY;

pub const API_URL_ENV: &str = "ECOSYSTEM_API_URL";
pub const AUTH_TOKEN_ENV: &str = "ECOSYSTEM_AUTH_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub api: ApiConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// IANA zone used to decide which day an event falls on; empty means the system zone
    pub timezone: String,
    /// Log level
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the directory REST API
    pub base_url: String,
    /// Bearer token (optional - falls back to environment variable)
    pub auth_token: Option<String>,
    pub timeout_seconds: u64,
    /// Whether to also pull the third-party event feed
    pub fetch_external: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Events listed per day cell before the "+ N more" summary
    pub max_events_per_day: usize,
    pub use_colors: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig {
                timezone: String::new(),
                log_level: "info".to_string(),
            },
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                auth_token: None, // Falls back to ECOSYSTEM_AUTH_TOKEN environment variable
                timeout_seconds: 15,
                fetch_external: true,
            },
            display: DisplayConfig {
                max_events_per_day: DEFAULT_EVENTS_PER_DAY,
                use_colors: true,
            },
        }
    }
}

impl Config {
    /// Load the configuration, writing defaults on first run
    pub async fn load(path: Option<&Path>) -> Result<Config> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::get_config_path()?,
        };

        let config = if config_path.exists() {
            Self::load_from(&config_path).await?
        } else {
            info!("Config file not found, creating default configuration");
            let default_config = Config::default();
            if let Err(e) = default_config.save_to(&config_path).await {
                warn!("Could not write default configuration: {:#}", e);
            }
            default_config
        };

        Ok(config)
    }

    pub async fn load_from(config_path: &Path) -> Result<Config> {
        let content = fs::read_to_string(config_path)
            .await
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
        debug!("Loaded configuration from {:?}", config_path);
        Ok(config)
    }

    pub async fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, content)
            .await
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("ecosystem-calendar");

        Ok(config_dir.join("config.toml"))
    }

    /// Get timezone as parsed Tz object.
    ///
    /// An empty setting uses the system zone; anything unparseable falls back to UTC.
    pub fn get_timezone(&self) -> Tz {
        let configured = self.general.timezone.trim();
        if !configured.is_empty() {
            return configured.parse::<Tz>().unwrap_or_else(|_| {
                warn!("Unknown timezone '{}', using UTC", configured);
                chrono_tz::UTC
            });
        }

        iana_time_zone::get_timezone()
            .ok()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(chrono_tz::UTC)
    }

    /// API base URL from the environment or config, without a trailing slash
    pub fn get_api_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.api.base_url.clone())
            .trim_end_matches('/')
            .to_string()
    }

    /// Get auth token from config or environment variable
    pub fn get_auth_token(&self) -> Option<String> {
        self.api
            .auth_token
            .clone()
            .filter(|token| !token.is_empty())
            .or_else(|| std::env::var(AUTH_TOKEN_ENV).ok())
    }

    pub fn get_request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds.max(1))
    }

    pub fn get_events_per_day(&self) -> usize {
        self.display.max_events_per_day.max(1)
    }
}
