//! Configuration loading for TableTalk.
//! Reads tabletalk.toml from the current directory or the path in the TABLETALK_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_ENV_VAR: &str = "TABLETALK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "tabletalk.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub recommendations: RecommendationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16    { 3001 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    /// Upper bound on the nearby-meal lookup.
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
}

fn default_limit()             -> usize { 6 }
fn default_max_limit()         -> usize { 50 }
fn default_radius_km()         -> f64   { 15.0 }
fn default_lookup_timeout_ms() -> u64   { 5_000 }

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            default_radius_km: default_radius_km(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Required when `backend = "postgres"`.
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// JSON array of meals to load into the in-memory meal store.
    pub meals_seed_path: Option<String>,
}

fn default_max_connections() -> usize { 10 }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: default_max_connections(),
            meals_seed_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Used when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

mod tests;

impl Config {
    /// Load configuration from tabletalk.toml.
    /// Checks TABLETALK_CONFIG env var first, then current directory. A
    /// missing file at the default path gives the built-in defaults; a
    /// missing file at an explicit path is an error.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => Self::from_path(&path),
            Err(_) if !Path::new(DEFAULT_CONFIG_PATH).exists() => Ok(Self::default()),
            Err(_) => Self::from_path(DEFAULT_CONFIG_PATH),
        }
    }

    /// Parse a TOML or YAML file, chosen by extension.
    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy tabletalk.example.toml to tabletalk.toml and edit it.",
                path
            );
        }

        let content = std::fs::read_to_string(path)?;
        let config = if path.ends_with(".yaml") || path.ends_with(".yml") {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let rec = &self.recommendations;
        if rec.default_limit == 0 || rec.max_limit == 0 {
            anyhow::bail!("recommendation limits must be at least 1");
        }
        if rec.default_limit > rec.max_limit {
            anyhow::bail!(
                "default_limit ({}) exceeds max_limit ({})",
                rec.default_limit,
                rec.max_limit
            );
        }
        if !(rec.default_radius_km > 0.0 && rec.default_radius_km <= 1000.0) {
            anyhow::bail!("default_radius_km must be in (0, 1000]");
        }
        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none() {
            anyhow::bail!("storage.database_url is required for the postgres backend");
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
