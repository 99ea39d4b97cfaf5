//! Errors raised while loading, checking or writing link configuration.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The selected configuration file cannot be read.
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not TOML, or does not fit the `[serial]`/`[link]`/`[logging]` layout.
    #[error("malformed configuration in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A `[serial]` setting cannot describe a usable line.
    #[error("serial.{setting}: {reason}")]
    SerialLine {
        setting: &'static str,
        reason: String,
    },

    /// A `[link]` timing value would make every read time out.
    #[error("link.{setting} must be at least 1 ms")]
    LinkTiming { setting: &'static str },

    /// An `RTU_LINK_*` variable is set but its value does not parse.
    #[error("{var}={value:?}: {reason}")]
    Override {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("cannot render configuration: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("cannot write {}: {source}", .path.display())]
    Unwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ConfigError {
    pub fn serial_line(setting: &'static str, reason: impl Into<String>) -> Self {
        Self::SerialLine {
            setting,
            reason: reason.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_setting() {
        let err = ConfigError::serial_line("stop_bits", "expected 1 or 2, got 3");
        assert_eq!(err.to_string(), "serial.stop_bits: expected 1 or 2, got 3");

        let err = ConfigError::LinkTiming {
            setting: "poll_timeout_ms",
        };
        assert_eq!(err.to_string(), "link.poll_timeout_ms must be at least 1 ms");

        let err = ConfigError::Override {
            var: "RTU_LINK_SERIAL_BAUD_RATE",
            value: "fast".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "RTU_LINK_SERIAL_BAUD_RATE=\"fast\": invalid digit found in string"
        );
    }
}
