//! Locating, reading and writing `rtu-link.toml`, plus `RTU_LINK_*` overrides.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use crate::port::Parity;
use std::env::{self, VarError};
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const CONFIG_FILE_NAME: &str = "rtu-link.toml";
const APP_DIR: &str = "rtu-link";
const CONFIG_PATH_ENV: &str = "RTU_LINK_CONFIG";

/// One environment variable and the setting it replaces.
struct EnvOverride {
    var: &'static str,
    apply: fn(&mut Config, &str) -> Result<(), String>,
}

const ENV_OVERRIDES: &[EnvOverride] = &[
    EnvOverride {
        var: "RTU_LINK_SERIAL_DEVICE",
        apply: set_device,
    },
    EnvOverride {
        var: "RTU_LINK_SERIAL_BAUD_RATE",
        apply: set_baud_rate,
    },
    EnvOverride {
        var: "RTU_LINK_SERIAL_PARITY",
        apply: set_parity,
    },
    EnvOverride {
        var: "RTU_LINK_LINK_REQUEST_TIMEOUT_MS",
        apply: set_request_timeout,
    },
    EnvOverride {
        var: "RTU_LINK_LINK_POLL_TIMEOUT_MS",
        apply: set_poll_timeout,
    },
    EnvOverride {
        var: "RTU_LINK_LOGGING_LEVEL",
        apply: set_log_level,
    },
];

fn set_device(config: &mut Config, value: &str) -> Result<(), String> {
    config.serial.device = value.to_string();
    Ok(())
}

fn set_baud_rate(config: &mut Config, value: &str) -> Result<(), String> {
    config.serial.baud_rate = parse(value)?;
    Ok(())
}

fn set_parity(config: &mut Config, value: &str) -> Result<(), String> {
    config.serial.parity = parse::<Parity>(value)?;
    Ok(())
}

fn set_request_timeout(config: &mut Config, value: &str) -> Result<(), String> {
    config.link.request_timeout_ms = parse(value)?;
    Ok(())
}

fn set_poll_timeout(config: &mut Config, value: &str) -> Result<(), String> {
    config.link.poll_timeout_ms = parse(value)?;
    Ok(())
}

fn set_log_level(config: &mut Config, value: &str) -> Result<(), String> {
    config.logging.level = value.to_string();
    Ok(())
}

fn parse<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e: T::Err| e.to_string())
}

/// Effective configuration and the file it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// `None` when no file was found and the built-in defaults were used.
    pub source: Option<PathBuf>,
    pub config: Config,
}

impl ConfigLoader {
    /// Load the first file on [`search_path`], or the defaults if none
    /// exists, then apply `RTU_LINK_*` overrides.
    pub fn load() -> ConfigResult<Self> {
        Self::build(resolve_config_path())
    }

    /// Load an explicit file, then apply `RTU_LINK_*` overrides.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::build(Some(path.as_ref().to_path_buf()))
    }

    /// Built-in defaults with `RTU_LINK_*` overrides; no file is read.
    pub fn with_defaults() -> ConfigResult<Self> {
        Self::build(None)
    }

    fn build(source: Option<PathBuf>) -> ConfigResult<Self> {
        let base = match source {
            Some(ref path) => read_file(path)?,
            None => Config::default(),
        };
        let config = apply_env_overrides(base)?;
        Ok(Self { source, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Write the effective configuration as TOML, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let rendered = toml::to_string_pretty(&self.config)?;
        let unwritable = |source: io::Error| ConfigError::Unwritable {
            path: path.to_path_buf(),
            source,
        };

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(unwritable)?;
        }
        fs::write(path, rendered).map_err(unwritable)
    }
}

/// Candidate files in priority order.
///
/// `$RTU_LINK_CONFIG`, then `./rtu-link.toml`, then `rtu-link/rtu-link.toml`
/// under the user configuration directory (`$XDG_CONFIG_HOME`, `~/.config`,
/// or `%APPDATA%` on Windows).
pub fn search_path() -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(3);
    if let Some(explicit) = env::var_os(CONFIG_PATH_ENV) {
        candidates.push(PathBuf::from(explicit));
    }
    candidates.push(PathBuf::from(CONFIG_FILE_NAME));
    if let Some(dir) = user_config_dir() {
        candidates.push(dir.join(APP_DIR).join(CONFIG_FILE_NAME));
    }
    candidates
}

/// The first existing file on [`search_path`].
pub fn resolve_config_path() -> Option<PathBuf> {
    search_path().into_iter().find(|candidate| candidate.is_file())
}

fn user_config_dir() -> Option<PathBuf> {
    if cfg!(windows) {
        return env::var_os("APPDATA").map(PathBuf::from);
    }
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))
}

fn read_file(path: &Path) -> ConfigResult<Config> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply every set `RTU_LINK_*` variable. Either all of them apply or the
/// first bad one is reported and nothing is returned.
fn apply_env_overrides(mut config: Config) -> ConfigResult<Config> {
    for entry in ENV_OVERRIDES {
        let value = match env::var(entry.var) {
            Ok(value) => value,
            Err(VarError::NotPresent) => continue,
            Err(VarError::NotUnicode(raw)) => {
                return Err(ConfigError::Override {
                    var: entry.var,
                    value: raw.to_string_lossy().into_owned(),
                    reason: "not valid UTF-8".to_string(),
                })
            }
        };

        (entry.apply)(&mut config, &value).map_err(|reason| ConfigError::Override {
            var: entry.var,
            value: value.clone(),
            reason,
        })?;
        debug!(var = entry.var, %value, "configuration override");
    }
    Ok(config)
}
