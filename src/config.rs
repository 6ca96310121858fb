//! Runtime configuration for the dispatcher and its HTTP front end.
//!
//! Every field has a default, so an empty TOML document is a valid config.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use tokio::sync::Semaphore;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Answer `GET /` with `root_body` when no sub-router owns it.
    #[serde(default = "default_root_fallback")]
    pub root_fallback: bool,

    #[serde(default = "default_root_body")]
    pub root_body: String,

    /// Header written by the mount-path injector.
    #[serde(default = "default_mount_header")]
    pub mount_header: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_connections() -> usize {
    256
}

fn default_root_fallback() -> bool {
    true
}

fn default_root_body() -> String {
    "Servidor en funcionamiento".to_string()
}

fn default_mount_header() -> String {
    "url".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            max_connections: default_max_connections(),
            root_fallback: default_root_fallback(),
            root_body: default_root_body(),
            mount_header: default_mount_header(),
        }
    }
}

impl ServerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ServerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_address.parse::<SocketAddr>().map_err(|e| {
            ConfigError::Validation(format!("bind_address {:?}: {}", self.bind_address, e))
        })?;

        if self.max_connections == 0 || self.max_connections > Semaphore::MAX_PERMITS {
            return Err(ConfigError::Validation(format!(
                "max_connections must be between 1 and {}",
                Semaphore::MAX_PERMITS
            )));
        }

        let is_token = !self.mount_header.is_empty()
            && self
                .mount_header
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !is_token {
            return Err(ConfigError::Validation(format!(
                "mount_header {:?} is not a valid header name",
                self.mount_header
            )));
        }

        Ok(())
    }

    /// The placeholder body for `GET /`, if the fallback is enabled.
    pub fn root_placeholder(&self) -> Option<&str> {
        self.root_fallback.then_some(self.root_body.as_str())
    }
}
