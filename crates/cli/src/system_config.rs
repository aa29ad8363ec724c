//! Planner configuration file
//!
//! Location: `$PLANNER_HOME/config.toml`, falling back to
//! `<config dir>/planner/config.toml`. A missing file means defaults.

use planner_core::OwnerId;
use planner_sync::{SyncConfig, UpsertMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the planner home directory
pub const HOME_ENV: &str = "PLANNER_HOME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub planner: PlannerSection,
    pub sync: SyncSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSection {
    /// Owner id written on every plan
    pub owner: String,
    /// Journal location (default: <home>/data)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    pub quiet_period_ms: u64,
    pub write_timeout_ms: u64,
    pub upsert_mode: UpsertMode,
    pub skip_unchanged: bool,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            owner: "me".to_string(),
            data_dir: None,
        }
    }
}

impl Default for SyncSection {
    fn default() -> Self {
        let defaults = SyncConfig::default();
        Self {
            quiet_period_ms: defaults.quiet_period.as_millis() as u64,
            write_timeout_ms: defaults.write_timeout.as_millis() as u64,
            upsert_mode: defaults.upsert_mode,
            skip_unchanged: defaults.skip_unchanged,
        }
    }
}

impl SystemConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.planner.owner.trim().is_empty() {
            return Err(ConfigError::Invalid("planner.owner must not be empty".into()));
        }
        if !(50..=60_000).contains(&self.sync.quiet_period_ms) {
            return Err(ConfigError::Invalid(format!(
                "sync.quiet_period_ms must be 50-60000 (got {})",
                self.sync.quiet_period_ms
            )));
        }
        if !(100..=300_000).contains(&self.sync.write_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "sync.write_timeout_ms must be 100-300000 (got {})",
                self.sync.write_timeout_ms
            )));
        }
        Ok(())
    }

    pub fn owner(&self) -> Result<OwnerId, ConfigError> {
        OwnerId::new(self.planner.owner.clone()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            quiet_period: Duration::from_millis(self.sync.quiet_period_ms),
            write_timeout: Duration::from_millis(self.sync.write_timeout_ms),
            upsert_mode: self.sync.upsert_mode,
            skip_unchanged: self.sync.skip_unchanged,
        }
    }

    /// Journal directory
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.planner.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(home_dir()?.join("data")),
        }
    }
}

/// Planner home directory
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    dirs::config_dir()
        .map(|dir| dir.join("planner"))
        .ok_or(ConfigError::NoConfigDir)
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(home_dir()?.join("config.toml"))
}

/// Load the configuration, falling back to defaults when no file exists
pub fn load() -> Result<SystemConfig, ConfigError> {
    load_from(&config_file_path()?)
}

pub fn load_from(path: &Path) -> Result<SystemConfig, ConfigError> {
    if !path.exists() {
        return Ok(SystemConfig::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SystemConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

pub fn save(config: &SystemConfig) -> Result<(), ConfigError> {
    save_to(config, &config_file_path()?)
}

pub fn save_to(config: &SystemConfig, path: &Path) -> Result<(), ConfigError> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the default configuration if no file exists; returns whether it wrote
pub fn init_if_missing() -> Result<bool, ConfigError> {
    let path = config_file_path()?;
    if path.exists() {
        return Ok(false);
    }
    save_to(&SystemConfig::default(), &path)?;
    Ok(true)
}

/// Annotated example configuration
pub fn example_config() -> String {
    r#"# Planner configuration

[planner]
# Owner id stored on every plan
owner = "me"
# Journal location (default: <planner home>/data)
# data_dir = "/home/me/.local/share/planner"

[sync]
# Delay after the last keystroke before saving
quiet_period_ms = 1000
# Bound on each store call
write_timeout_ms = 10000
# "check_then_act" (find, then update or insert) or "atomic"
upsert_mode = "check_then_act"
# Skip saving text identical to what is stored
skip_unchanged = true
"#
    .to_string()
}
