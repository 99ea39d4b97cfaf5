//! Synchronous serial port implementation.
//!
//! Wraps the `serialport` crate's `SerialPort` trait with our own
//! `SerialPortAdapter` trait, translating the driver's read timeout into
//! the `PollTimeout` sentinel.

use super::error::PortError;
use super::traits::{DriverConfig, Parity, SerialConnector, SerialPortAdapter};
use std::io::{self, Read, Write};

/// Synchronous serial port implementation wrapping `serialport::SerialPort`.
pub struct SyncSerialPort {
    /// The underlying serial port implementation.
    port: Box<dyn serialport::SerialPort>,
    /// The port name/path for identification.
    name: String,
}

impl SyncSerialPort {
    /// Open a serial port from a driver configuration record.
    ///
    /// # Example
    /// ```no_run
    /// use rtu_serial_link::port::{DriverConfig, PortConfig, SyncSerialPort};
    /// use std::time::Duration;
    ///
    /// let config = PortConfig::new("/dev/ttyUSB0", 9600);
    /// let driver = DriverConfig::from_port_config(&config, Duration::from_millis(10));
    /// let port = SyncSerialPort::open(&driver)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(config: &DriverConfig) -> Result<Self, PortError> {
        let parity = Parity::from_code(config.parity)?;
        let port = serialport::new(config.address.as_str(), config.baud_rate)
            .data_bits(config.data_bits.into())
            .parity(parity.into())
            .stop_bits(config.stop_bits.into())
            .flow_control(serialport::FlowControl::None)
            .timeout(config.timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(&config.address),
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        Ok(Self {
            port,
            name: config.address.clone(),
        })
    }
}

/// Map a driver read failure, turning the poll-window timeout into the sentinel.
fn read_error(e: io::Error) -> PortError {
    match e.kind() {
        io::ErrorKind::TimedOut => PortError::PollTimeout,
        _ => PortError::Io(e),
    }
}

impl SerialPortAdapter for SyncSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        self.port.write(data).map_err(PortError::Io)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        self.port.read(buffer).map_err(read_error)
    }

    fn close(&mut self) -> Result<(), PortError> {
        // The descriptor is released when the boxed port is dropped.
        self.port.flush().map_err(PortError::Io)
    }
}

impl std::fmt::Debug for SyncSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSerialPort")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate())
            .finish()
    }
}

/// Connector that opens real devices through the `serialport` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemConnector;

impl SerialConnector for SystemConnector {
    fn connect(&self, config: &DriverConfig) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        Ok(Box::new(SyncSerialPort::open(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortConfig;
    use std::time::Duration;

    #[test]
    fn test_port_not_found_error() {
        let config = PortConfig::new("/dev/nonexistent_port_12345", 9600);
        let driver = DriverConfig::from_port_config(&config, Duration::from_millis(10));
        let result = SystemConnector.connect(&driver);

        match result {
            Err(PortError::NotFound(name)) => assert!(name.contains("nonexistent")),
            // Some platforms report a missing node as a generic I/O failure.
            Err(PortError::Serial(_)) | Err(PortError::Io(_)) => {}
            other => panic!("Expected open failure, got: {:?}", other),
        }
    }

    #[test]
    fn test_read_timeout_becomes_poll_sentinel() {
        let err = read_error(io::Error::new(io::ErrorKind::TimedOut, "Operation timed out"));
        assert!(matches!(err, PortError::PollTimeout));
    }

    #[test]
    fn test_other_read_failures_stay_io() {
        for kind in [
            io::ErrorKind::BrokenPipe,
            io::ErrorKind::WouldBlock,
            io::ErrorKind::Interrupted,
        ] {
            match read_error(io::Error::new(kind, "read failed")) {
                PortError::Io(e) => assert_eq!(e.kind(), kind),
                other => panic!("Expected I/O error for {:?}, got: {:?}", kind, other),
            }
        }
    }

    #[test]
    fn test_invalid_parity_code_rejected_before_open() {
        let config = PortConfig::new("/dev/nonexistent_port_12345", 9600);
        let mut driver = DriverConfig::from_port_config(&config, Duration::from_millis(10));
        driver.parity = 'X';

        let result = SyncSerialPort::open(&driver);
        assert!(matches!(result, Err(PortError::Config(_))));
    }
}
