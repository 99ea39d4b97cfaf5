//! Configuration schema definitions.
//!
//! Structure of the TOML configuration file. Every section has defaults, so
//! an empty file (or no file) is a valid configuration.

use super::error::{ConfigError, ConfigResult};
use crate::port::{DataBits, Parity, PortConfig, StopBits};
use crate::transport::DEFAULT_POLL_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial line settings
    pub serial: SerialConfig,
    /// Transport timing
    pub link: LinkConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Check every section for out-of-range values.
    pub fn validate(&self) -> ConfigResult<()> {
        self.serial.port_config()?;
        self.link.validate()
    }
}

/// Serial line section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path, e.g. "/dev/ttyUSB0" or "COM3"
    pub device: String,
    pub baud_rate: u32,
    /// 5 to 8
    pub data_bits: u8,
    pub parity: Parity,
    /// 1 or 2
    pub stop_bits: u8,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 19200,
            data_bits: 8,
            parity: Parity::Even,
            stop_bits: 1,
        }
    }
}

impl SerialConfig {
    /// Build validated line settings for the transport.
    pub fn port_config(&self) -> ConfigResult<PortConfig> {
        if self.device.trim().is_empty() {
            return Err(ConfigError::serial_line("device", "must not be empty"));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::serial_line("baud_rate", "must be positive"));
        }
        let data_bits = DataBits::try_from(self.data_bits)
            .map_err(|e| ConfigError::serial_line("data_bits", e.to_string()))?;
        let stop_bits = StopBits::try_from(self.stop_bits)
            .map_err(|e| ConfigError::serial_line("stop_bits", e.to_string()))?;

        Ok(PortConfig {
            device: self.device.clone(),
            baud_rate: self.baud_rate,
            data_bits,
            parity: self.parity,
            stop_bits,
        })
    }
}

/// Transport timing section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Deadline applied to each request, in milliseconds
    pub request_timeout_ms: u64,
    /// Driver poll window for a single read, in milliseconds
    pub poll_timeout_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 1000,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT.as_millis() as u64,
        }
    }
}

impl LinkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    fn validate(&self) -> ConfigResult<()> {
        let timings = [
            ("poll_timeout_ms", self.poll_timeout_ms),
            ("request_timeout_ms", self.request_timeout_ms),
        ];
        match timings.into_iter().find(|&(_, ms)| ms == 0) {
            Some((setting, _)) => Err(ConfigError::LinkTiming { setting }),
            None => Ok(()),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    #[default]
    Pretty,
    /// Compact format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.serial.baud_rate, 19200);
        assert_eq!(config.serial.parity, Parity::Even);
        assert_eq!(config.link.poll_timeout(), Duration::from_millis(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[serial]"));
        assert!(toml_str.contains("[link]"));
        assert!(toml_str.contains("parity = \"even\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [serial]
            device = "/dev/ttyAMA0"
            parity = "none"
            stop_bits = 2

            [link]
            request_timeout_ms = 250
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        let port = config.serial.port_config().unwrap();
        assert_eq!(port.device, "/dev/ttyAMA0");
        assert_eq!(port.parity, Parity::None);
        assert_eq!(port.stop_bits, StopBits::Two);
        // Defaults should still work
        assert_eq!(port.baud_rate, 19200);
        assert_eq!(config.link.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_validation_rejects_bad_bits() {
        let mut config = Config::default();
        config.serial.data_bits = 9;
        match config.validate() {
            Err(ConfigError::SerialLine { setting, .. }) => assert_eq!(setting, "data_bits"),
            other => panic!("Expected validation error, got: {:?}", other),
        }

        let mut config = Config::default();
        config.link.poll_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LinkTiming {
                setting: "poll_timeout_ms"
            })
        ));
    }
}
