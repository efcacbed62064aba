//! Startup configuration for the customer core.
//!
//! # Responsibility
//! - Choose the storage adapter and database location at process start.
//! - Resolve logging settings from defaults and environment overrides.
//!
//! # Invariants
//! - Unknown backend names are rejected, never silently defaulted.
//! - Configuration is read once; the service never re-reads it.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_STORAGE_BACKEND: &str = "CUSTOMER_STORAGE_BACKEND";
pub const ENV_DB_PATH: &str = "CUSTOMER_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CUSTOMER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CUSTOMER_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "customers.sqlite3";

/// Storage adapter implementation chosen at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Hand-written parameterized statements.
    #[default]
    Query,
    /// Generic entity mapper.
    Orm,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Orm => "orm",
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "query" => Ok(Self::Query),
            "orm" => Ok(Self::Orm),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnknownBackend(String),
    EmptyValue(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(value) => {
                write!(f, "unknown storage backend `{value}`; expected query|orm")
            }
            Self::EmptyValue(key) => write!(f, "configuration value `{key}` cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub backend: StorageBackend,
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Builds configuration from defaults overlaid with process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from defaults overlaid with `lookup` values.
    ///
    /// Absent keys keep their defaults; present but blank keys are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = non_empty(&lookup, ENV_STORAGE_BACKEND)? {
            config.backend = value.parse()?;
        }
        if let Some(value) = non_empty(&lookup, ENV_DB_PATH)? {
            config.db_path = PathBuf::from(value);
        }
        if let Some(value) = non_empty(&lookup, ENV_LOG_LEVEL)? {
            config.log_level = value;
        }
        if let Some(value) = non_empty(&lookup, ENV_LOG_DIR)? {
            config.log_dir = Some(PathBuf::from(value));
        }

        Ok(config)
    }
}

fn non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyValue(key)),
        Some(value) => Ok(Some(value.trim().to_string())),
    }
}
