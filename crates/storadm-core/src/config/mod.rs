//! Configuration management for storadm
//!
//! Configuration is two-phase. [`ConnectionConfig`] is built from parsed
//! command-line flags and a [`ConnectionDefaults`] value without any I/O;
//! opening the session and resolving groups happens afterwards.

mod connection;
mod defaults;
pub mod serde_utils;

pub use connection::{ConnectionConfig, ConnectionConfigBuilder};
pub use defaults::{ConfigFile, ConnectionDefaults, LogLevel};

use crate::error::ConfigError;
use std::path::Path;

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}
