//! Configuration module for rtu-link.
//!
//! This module provides TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `RTU_LINK_CONFIG` environment variable (explicit path)
//! 2. `./rtu-link.toml` (current directory)
//! 3. `~/.config/rtu-link/rtu-link.toml` (XDG on Linux/macOS)
//! 4. `%APPDATA%\rtu-link\rtu-link.toml` (Windows)
//! 5. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! Selected values can be overridden via `RTU_LINK_<SECTION>_<KEY>`:
//! - `RTU_LINK_SERIAL_DEVICE`, `RTU_LINK_SERIAL_BAUD_RATE`, `RTU_LINK_SERIAL_PARITY`
//! - `RTU_LINK_LINK_REQUEST_TIMEOUT_MS`, `RTU_LINK_LINK_POLL_TIMEOUT_MS`
//! - `RTU_LINK_LOGGING_LEVEL`
//!
//! A set variable that does not parse fails the load; overrides are never
//! partially applied.
//!
//! # Example
//!
//! ```rust,ignore
//! use rtu_serial_link::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! let port = loader.config().serial.port_config()?;
//! println!("Device: {} @ {}", port.device, port.baud_rate);
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{resolve_config_path, search_path, ConfigLoader};
pub use schema::{Config, LinkConfig, LogFormat, LoggingConfig, SerialConfig};
