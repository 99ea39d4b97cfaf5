//! Serial transport for Modbus RTU links.
//!
//! This library adapts a physical serial port into a deadline-aware byte
//! stream for an RTU framing layer, with named hooks around every read and
//! write.
//!
//! # Modules
//!
//! - `transport`: `SerialTransport` and the `RtuLink` trait
//! - `hooks`: hook vocabularies and the filtered `HookRegistry`
//! - `port`: driver-facing traits, the `serialport` backend and mocks
//! - `config`: configuration management with TOML support
//! - `error`: transport error type
//! - `logging`: subscriber setup for binaries

pub mod config;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod port;
pub mod transport;

// Re-export commonly used types for convenience
pub use error::{TransportError, TransportResult};
pub use hooks::{
    hook_fn, FramingEvent, Hook, HookContext, HookEvent, HookRegistry, TransportEvent,
};
pub use port::{
    DataBits, DriverConfig, MockConnector, MockSerialPort, Parity, PortConfig, PortError,
    SerialConnector, SerialPortAdapter, StopBits, SyncSerialPort, SystemConnector,
};
pub use transport::{LinkState, RtuLink, SerialTransport, DEFAULT_POLL_TIMEOUT};

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
