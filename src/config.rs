//! Configuration loading and management.
//!
//! Configuration is TOML; every key has a default, so an empty (or absent)
//! file yields a working broker on `0.0.0.0:8080`.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network listen configuration.
    pub listen: ListenConfig,
    /// Protocol and resource limits.
    pub limits: LimitsConfig,
    /// File upload configuration.
    pub upload: UploadConfig,
}

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080").
    pub address: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// Protocol and resource limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered command line length in bytes; exceeding it
    /// disconnects the session.
    pub max_line_bytes: usize,
    /// Maximum accepted `/sendfile` size in bytes.
    pub max_file_bytes: u64,
    /// Disconnect sessions silent for this many seconds; 0 disables.
    pub idle_timeout_secs: u64,
    /// Depth of each session's outbound message queue.
    pub outbound_queue_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_bytes: 64 * 1024,
            max_file_bytes: 64 * 1024 * 1024,
            idle_timeout_secs: 300,
            outbound_queue_depth: 64,
        }
    }
}

/// File upload configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploaded files are stored under.
    pub dir: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// The idle cutoff, `None` when disabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        match self.limits.idle_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.listen.address.port(), 8080);
        assert_eq!(config.limits.max_line_bytes, 64 * 1024);
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(300)));
        assert_eq!(config.upload.dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [listen]
            address = "127.0.0.1:9000"

            [limits]
            idle_timeout_secs = 0
            "#,
        )
        .unwrap();
        assert_eq!(config.listen.address.port(), 9000);
        assert_eq!(config.idle_timeout(), None);
        // Unspecified sections keep their defaults.
        assert_eq!(config.limits.outbound_queue_depth, 64);
    }

    #[test]
    fn test_parse_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.listen.address.port(), 8080);
    }
}
