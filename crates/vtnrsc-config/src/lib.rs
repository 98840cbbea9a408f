//! Configuration for the vtnrsc CLI.
//!
//! TOML file at the platform config path, layered with `VTNRSC_`
//! environment variables, and translation to
//! `vtnrsc_core::InventoryConfig`. The CLI adds flag-aware wrappers on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vtnrsc_core::{InventoryConfig, UpdatePolicy};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "VTNRSC_CONFIG";

/// File name of the inventory snapshot inside the data directory.
pub const SNAPSHOT_FILE: &str = "inventory.json";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Output and timing defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Where and whether inventory state is kept between runs.
    #[serde(default)]
    pub store: StoreSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Seconds to wait for a counter increment.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreSettings {
    /// Save the inventory on exit and load it on start.
    #[serde(default = "default_persist")]
    pub persist: bool,

    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// `unchecked` or `validate-references`.
    #[serde(default = "default_update_policy")]
    pub update_policy: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            persist: default_persist(),
            data_dir: None,
            update_policy: default_update_policy(),
        }
    }
}

fn default_persist() -> bool {
    true
}
fn default_update_policy() -> String {
    "unchecked".into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "vtnrsc", "vtnrsc")
}

/// Resolve the config file path: `VTNRSC_CONFIG` if set, otherwise the
/// platform config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Platform data directory holding the inventory snapshot.
pub fn default_data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("data"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vtnrsc");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layered under the environment. Nested keys
/// use a double underscore: `VTNRSC_STORE__DATA_DIR=/srv/vtnrsc`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("VTNRSC_").ignore(&["config"]).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Data directory in effect: the configured one or the platform default.
    pub fn data_dir(&self) -> PathBuf {
        self.store.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Snapshot file, or `None` when persistence is off.
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        self.store
            .persist
            .then(|| self.data_dir().join(SNAPSHOT_FILE))
    }
}

/// Parse an update policy name.
pub fn parse_update_policy(raw: &str) -> Result<UpdatePolicy, ConfigError> {
    match raw {
        "unchecked" => Ok(UpdatePolicy::Unchecked),
        "validate-references" => Ok(UpdatePolicy::ValidateReferences),
        other => Err(ConfigError::Validation {
            field: "store.update_policy".into(),
            reason: format!("expected 'unchecked' or 'validate-references', got '{other}'"),
        }),
    }
}

/// Build an `InventoryConfig` from the file settings alone, with no flag
/// overrides.
pub fn to_inventory_config(cfg: &Config) -> Result<InventoryConfig, ConfigError> {
    let mut inventory = InventoryConfig::default()
        .with_counter_timeout(Duration::from_secs(cfg.defaults.timeout))
        .with_update_policy(parse_update_policy(&cfg.store.update_policy)?);
    inventory.snapshot_path = cfg.snapshot_path();
    Ok(inventory)
}
