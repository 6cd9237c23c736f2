//! Configuration file handling

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Timeout settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Console output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Provider wait budget in milliseconds
#[derive(Debug, Deserialize)]
pub struct Timeouts {
    /// How long a locate may wait for its element to appear
    #[serde(default = "default_locate")]
    pub locate_ms: u64,

    /// Interval between locate attempts while waiting
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            locate_ms: default_locate(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Timeouts {
    pub fn locate(&self) -> Duration {
        Duration::from_millis(self.locate_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero interval would spin the wait loop
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

fn default_locate() -> u64 {
    5_000
}
fn default_poll_interval() -> u64 {
    50
}

/// Console output configuration
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Colorize console output
    #[serde(default = "default_color")]
    pub color: bool,

    /// Print every step, not only failures and the summary
    #[serde(default)]
    pub verbose: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
            verbose: false,
        }
    }
}

fn default_color() -> bool {
    true
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.timeouts.locate_ms, 5_000);
        assert_eq!(config.timeouts.poll_interval_ms, 50);
        assert!(config.output.color);
        assert!(!config.output.verbose);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config = Config::parse("[timeouts]\nlocate_ms = 250\n").unwrap();
        assert_eq!(config.timeouts.locate(), Duration::from_millis(250));
        assert_eq!(config.timeouts.poll_interval(), Duration::from_millis(50));
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let config = Config::parse("[timeouts]\npoll_interval_ms = 0\n").unwrap();
        assert_eq!(config.timeouts.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let err = Config::parse("[timeouts]\nlocate_ms = \"soon\"\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_read_error() {
        let err = Config::load_from(Path::new("/nonexistent/scenario-runner.toml")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
