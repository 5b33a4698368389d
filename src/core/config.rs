//! Application configuration management
//!
//! Configuration is loaded from a TOML file and validated at startup. The
//! handlers never touch it directly; they take a [`GatewaySnapshot`] from a
//! [`ConfigProvider`] at the start of each request, so the serving policy a
//! request sees is fixed for that request's lifetime.

use crate::models::catalog::LlmModel;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default server port
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whether the gateway should serve at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Administrator-pinned serving model. Overrides the client's requested
    /// model name when it matches an installed model exactly.
    #[serde(default)]
    pub selected_model: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
            enabled: default_enabled(),
            log_level: default_log_level(),
            selected_model: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Application configuration loaded from a TOML file
///
/// The `[[models]]` array is the installed-model catalog; `[server]` carries
/// the listening address and the serving-model override.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub models: Vec<LlmModel>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read configuration file")?;
        let config: Config =
            toml::from_str(&content).context("Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Load configuration from the path in `CONFIG_PATH`
    ///
    /// Defaults to `config.toml` in the current directory.
    pub fn from_env() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::from_file(config_path)
    }
}

/// Serving policy captured at the start of a request
#[derive(Debug, Clone)]
pub struct GatewaySnapshot {
    /// Administrator-pinned serving model, if any.
    pub selected_model: Option<String>,
}

/// Source of per-request configuration snapshots
///
/// Handlers call `snapshot()` once per request instead of reading shared
/// mutable state mid-flight.
pub trait ConfigProvider: Send + Sync {
    fn snapshot(&self) -> GatewaySnapshot;
}

/// Provider backed by the startup configuration
pub struct StaticProvider {
    snapshot: GatewaySnapshot,
}

impl StaticProvider {
    pub fn new(config: &Config) -> Self {
        Self::from_snapshot(GatewaySnapshot {
            selected_model: config.server.selected_model.clone(),
        })
    }

    pub fn from_snapshot(snapshot: GatewaySnapshot) -> Self {
        Self { snapshot }
    }
}

impl ConfigProvider for StaticProvider {
    fn snapshot(&self) -> GatewaySnapshot {
        self.snapshot.clone()
    }
}
