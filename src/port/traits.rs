//! Core traits for serial port abstraction.
//!
//! Defines the driver-facing seam: `SerialConnector` opens a port from a
//! `DriverConfig` and hands back a `SerialPortAdapter`. Real serial ports
//! and mock implementations can be used interchangeably behind it.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Line settings for one serial device, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfig {
    /// System path of the device (e.g. "/dev/ttyUSB0" or "COM3").
    pub device: String,

    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Number of data bits per character.
    pub data_bits: DataBits,

    /// Parity checking mode.
    pub parity: Parity,

    /// Number of stop bits.
    pub stop_bits: StopBits,
}

impl PortConfig {
    /// Create an 8N1 configuration for `device` at `baud_rate`.
    pub fn new(device: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            device: device.into(),
            baud_rate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl DataBits {
    /// The bit count as a number.
    pub fn count(self) -> u8 {
        match self {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

impl TryFrom<u8> for DataBits {
    type Error = PortError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            5 => Ok(DataBits::Five),
            6 => Ok(DataBits::Six),
            7 => Ok(DataBits::Seven),
            8 => Ok(DataBits::Eight),
            other => Err(PortError::config(format!(
                "Unsupported data bits: {other} (expected 5-8)"
            ))),
        }
    }
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    /// Single-character code used in driver configuration records.
    pub fn code(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
        }
    }

    /// Inverse of [`Parity::code`].
    pub fn from_code(code: char) -> Result<Self, PortError> {
        match code {
            'N' => Ok(Parity::None),
            'E' => Ok(Parity::Even),
            'O' => Ok(Parity::Odd),
            other => Err(PortError::config(format!("Invalid parity code '{other}'"))),
        }
    }
}

impl FromStr for Parity {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "n" => Ok(Parity::None),
            "even" | "e" => Ok(Parity::Even),
            "odd" | "o" => Ok(Parity::Odd),
            _ => Err(PortError::config(format!("Invalid parity: {s}"))),
        }
    }
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    /// The bit count as a number.
    pub fn count(self) -> u8 {
        match self {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}

impl TryFrom<u8> for StopBits {
    type Error = PortError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        match bits {
            1 => Ok(StopBits::One),
            2 => Ok(StopBits::Two),
            other => Err(PortError::config(format!(
                "Unsupported stop bits: {other} (expected 1 or 2)"
            ))),
        }
    }
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

/// Configuration record handed to the driver when opening a port.
///
/// `timeout` bounds a single low-level read attempt when no bytes are
/// available; it is unrelated to any caller-level deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub address: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: char,
    pub stop_bits: StopBits,
    pub timeout: Duration,
}

impl DriverConfig {
    /// Build a driver record from caller line settings.
    pub fn from_port_config(config: &PortConfig, poll_timeout: Duration) -> Self {
        Self {
            address: config.device.clone(),
            baud_rate: config.baud_rate,
            data_bits: config.data_bits,
            parity: config.parity.code(),
            stop_bits: config.stop_bits,
            timeout: poll_timeout,
        }
    }
}

/// Trait for an open serial port.
///
/// Implementations must report [`PortError::PollTimeout`] when a read
/// finds no data within the driver's poll window.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read, which may be fewer than
    /// `buffer.len()`.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Release the connection. The adapter is dropped afterwards.
    fn close(&mut self) -> Result<(), PortError>;
}

/// Opens physical connections.
pub trait SerialConnector: Send + std::fmt::Debug {
    fn connect(&self, config: &DriverConfig) -> Result<Box<dyn SerialPortAdapter>, PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_port_config_is_8n1() {
        let config = PortConfig::new("/dev/ttyUSB0", 19200);
        assert_eq!(config.baud_rate, 19200);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }

    #[test]
    fn test_parity_codes() {
        assert_eq!(Parity::None.code(), 'N');
        assert_eq!(Parity::Even.code(), 'E');
        assert_eq!(Parity::Odd.code(), 'O');
        assert_eq!(Parity::from_code('E').unwrap(), Parity::Even);
        assert!(Parity::from_code('M').is_err());
    }

    #[test]
    fn test_parity_from_str() {
        assert_eq!("even".parse::<Parity>().unwrap(), Parity::Even);
        assert_eq!("O".parse::<Parity>().unwrap(), Parity::Odd);
        assert_eq!("None".parse::<Parity>().unwrap(), Parity::None);
        assert!("mark".parse::<Parity>().is_err());
    }

    #[test]
    fn test_bit_counts() {
        assert_eq!(DataBits::try_from(7).unwrap(), DataBits::Seven);
        assert_eq!(DataBits::Seven.count(), 7);
        assert!(DataBits::try_from(9).is_err());
        assert_eq!(StopBits::try_from(2).unwrap(), StopBits::Two);
        assert!(StopBits::try_from(0).is_err());
    }

    #[test]
    fn test_driver_config_from_port_config() {
        let mut config = PortConfig::new("/dev/ttyS1", 9600);
        config.parity = Parity::Even;

        let driver = DriverConfig::from_port_config(&config, Duration::from_millis(10));
        assert_eq!(driver.address, "/dev/ttyS1");
        assert_eq!(driver.baud_rate, 9600);
        assert_eq!(driver.parity, 'E');
        assert_eq!(driver.timeout, Duration::from_millis(10));
    }

    #[test]
    fn test_parity_conversion() {
        let parity = Parity::Even;
        let serialport_parity: serialport::Parity = parity.into();
        assert_eq!(serialport_parity, serialport::Parity::Even);
    }

    #[test]
    fn test_stop_bits_conversion() {
        let stop_bits = StopBits::Two;
        let serialport_stop_bits: serialport::StopBits = stop_bits.into();
        assert_eq!(serialport_stop_bits, serialport::StopBits::Two);
    }
}
