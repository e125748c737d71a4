//! Front-end configuration read from `catalog.ron`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use catalog_engine::{EngineConfig, FetchSettings, DEFAULT_API_BASE_URL};
use catalog_logging::LogDestination;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILENAME: &str = "catalog.ron";
/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "CATALOG_CONFIG";
/// Overrides `api_base_url` from the config file.
pub const API_URL_ENV: &str = "CATALOG_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
    /// How long the front end waits for the engine after each command.
    pub wait_timeout_secs: u64,
    pub log_destination: LogTarget,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_bytes: fetch.max_bytes,
            wait_timeout_secs: 35,
            log_destination: LogTarget::File,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `path`. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(ron::from_str(&content)?))
    }

    pub fn with_api_override(mut self, api_base_url: Option<String>) -> Self {
        if let Some(url) = api_base_url.filter(|url| !url.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    /// Unknown level names fall back to `Info`.
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(self.log_level.trim()).unwrap_or(LevelFilter::Info)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            api_base_url: self.api_base_url.clone(),
            fetch: FetchSettings {
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                max_bytes: self.max_bytes,
                ..FetchSettings::default()
            },
        }
    }
}

pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME))
}
