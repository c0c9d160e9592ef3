//! Configuration management for the skytale harness
//!
//! Handles loading and saving settings from YAML files, including the
//! scrambling toggle handed to the obfuscation layer.

use crate::constants::{BLOCK_LEN, DEFAULT_BUFFER_SIZE, DEFAULT_MTU, MAX_BUFFER_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::warn;

/// Obfuscation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObfuscationConfig {
    /// Whether packet scrambling is active; when false both directions
    /// pass payloads through unmodified
    #[serde(default = "default_scramble")]
    pub scramble: bool,
}

impl Default for ObfuscationConfig {
    fn default() -> Self {
        Self {
            scramble: default_scramble(),
        }
    }
}

/// Tunnel link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunnelConfig {
    /// Maximum transmission unit for tunnel packets
    #[serde(default = "default_mtu")]
    pub mtu: usize,
    /// Buffer size for packet I/O
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            mtu: default_mtu(),
            buffer_size: default_buffer_size(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Obfuscation configuration
    #[serde(default)]
    pub obfuscation: ObfuscationConfig,
    /// Tunnel link configuration
    #[serde(default)]
    pub tunnel: TunnelConfig,
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Path to logging theme configuration file
    #[serde(default = "default_log_theme_path")]
    pub log_theme_path: String,
    /// Whether to log to file
    #[serde(default)]
    pub log_to_file: bool,
    /// Path to log file (used when log_to_file is true)
    #[serde(default)]
    pub log_file_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            obfuscation: ObfuscationConfig::default(),
            tunnel: TunnelConfig::default(),
            log_level: default_log_level(),
            log_theme_path: default_log_theme_path(),
            log_to_file: false,
            log_file_path: None,
        }
    }
}

fn default_scramble() -> bool {
    true
}

fn default_mtu() -> usize {
    DEFAULT_MTU
}

fn default_buffer_size() -> usize {
    DEFAULT_BUFFER_SIZE
}

fn default_log_level() -> String {
    "INFO".to_string()
}

fn default_log_theme_path() -> String {
    "config/logging_theme.yml".to_string()
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        match fs::read_to_string(&path).await {
            Ok(contents) => {
                // Parse YAML, propagate parse errors instead of silently defaulting
                let config: Config = serde_yaml::from_str(&contents)
                    .map_err(|e| anyhow::anyhow!("Failed to parse YAML configuration: {}", e))?;
                config.validate()?;
                Ok(config)
            }
            Err(e) => {
                // Distinguish NotFound from other errors
                if e.kind() == std::io::ErrorKind::NotFound {
                    warn!(
                        "Configuration file not found at '{}', using default configuration",
                        path.as_ref().display()
                    );
                    let config = Config::default();
                    config.validate()?;
                    Ok(config)
                } else {
                    Err(anyhow::anyhow!(
                        "Failed to read configuration file '{}': {}",
                        path.as_ref().display(),
                        e
                    ))
                }
            }
        }
    }

    /// Save configuration to a YAML file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).await?;
        Ok(())
    }

    /// Validate configuration fields
    pub fn validate(&self) -> anyhow::Result<()> {
        // Validate log level
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.log_level.to_uppercase().as_str()) {
            return Err(anyhow::anyhow!("Invalid log level: {}", self.log_level));
        }

        // Validate log file path if logging to file
        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if path.trim().is_empty() {
                    return Err(anyhow::anyhow!(
                        "Log file path cannot be empty when log_to_file is true"
                    ));
                }
            }
        }

        // Validate tunnel configuration
        if self.tunnel.mtu < BLOCK_LEN {
            return Err(anyhow::anyhow!(
                "MTU must be at least the scrambler block size ({} bytes)",
                BLOCK_LEN
            ));
        }
        if self.tunnel.buffer_size < self.tunnel.mtu {
            return Err(anyhow::anyhow!("Buffer size must be at least the MTU"));
        }
        if self.tunnel.buffer_size > MAX_BUFFER_SIZE {
            return Err(anyhow::anyhow!(
                "Buffer size must not exceed {} bytes",
                MAX_BUFFER_SIZE
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.obfuscation.scramble);
        assert_eq!(config.tunnel.mtu, DEFAULT_MTU);
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert!(config.obfuscation.scramble);
        assert_eq!(config.log_level, "INFO");
    }

    #[test]
    fn test_scramble_toggle_parsed() {
        let config: Config = serde_yaml::from_str("obfuscation:\n  scramble: false\n").unwrap();
        assert!(!config.obfuscation.scramble);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = Config::default();
        config.log_level = "LOUD".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mtu_below_block_size_rejected() {
        let mut config = Config::default();
        config.tunnel.mtu = 4;
        assert!(config.validate().is_err());
    }
}
