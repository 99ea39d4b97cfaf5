//! Mock serial port implementation for testing.
//!
//! Provides a `MockSerialPort` that simulates a driver without requiring
//! actual hardware, and a `MockConnector` that hands it out on connect.
//! Reads follow a script of steps; an exhausted script behaves like an idle
//! line and reports the poll-timeout sentinel.

use super::error::PortError;
use super::traits::{DriverConfig, SerialConnector, SerialPortAdapter};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::Arc;

/// One scripted outcome for a read call.
#[derive(Debug, Clone)]
enum ReadStep {
    Data(Vec<u8>),
    PollTimeout,
    Fail(ErrorKind),
}

/// Inner state of the mock port, shared between clones.
#[derive(Debug, Default)]
struct MockPortState {
    /// Scripted read outcomes, consumed front to back.
    reads: VecDeque<ReadStep>,
    /// Log of all bytes written to the port.
    write_log: Vec<Vec<u8>>,
    /// Error to return from the next write, if any.
    write_failure: Option<ErrorKind>,
    close_failure: Option<ErrorKind>,
    read_calls: usize,
    write_calls: usize,
    close_calls: usize,
}

/// Mock serial port implementation for testing.
///
/// Clones share state, so a test can keep one handle for inspection while
/// the transport owns another.
///
/// # Example
/// ```
/// use rtu_serial_link::port::{MockSerialPort, PortError, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new();
/// port.push_poll_timeout();
/// port.enqueue_read(b"\x01\x03\x02");
///
/// let mut buffer = [0u8; 8];
/// assert!(matches!(port.read_bytes(&mut buffer), Err(PortError::PollTimeout)));
/// assert_eq!(port.read_bytes(&mut buffer).unwrap(), 3);
/// assert_eq!(port.read_calls(), 2);
/// ```
#[derive(Clone, Default)]
pub struct MockSerialPort {
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to be returned by one read call.
    ///
    /// A read with a smaller buffer returns a prefix and leaves the rest for
    /// the next call.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state
            .lock()
            .reads
            .push_back(ReadStep::Data(data.to_vec()));
    }

    /// Queue a read that finds no data within the poll window.
    pub fn push_poll_timeout(&mut self) {
        self.state.lock().reads.push_back(ReadStep::PollTimeout);
    }

    /// Queue a read that fails with an I/O error of `kind`.
    pub fn push_read_error(&mut self, kind: ErrorKind) {
        self.state.lock().reads.push_back(ReadStep::Fail(kind));
    }

    /// Make the next write fail with an I/O error of `kind`.
    pub fn fail_next_write(&mut self, kind: ErrorKind) {
        self.state.lock().write_failure = Some(kind);
    }

    /// Make the next close fail with an I/O error of `kind`.
    pub fn fail_next_close(&mut self, kind: ErrorKind) {
        self.state.lock().close_failure = Some(kind);
    }

    /// Get a copy of all data written to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    pub fn read_calls(&self) -> usize {
        self.state.lock().read_calls
    }

    pub fn write_calls(&self) -> usize {
        self.state.lock().write_calls
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().close_calls
    }

    /// Number of scripted read steps not yet consumed.
    pub fn pending_reads(&self) -> usize {
        self.state.lock().reads.len()
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        state.write_calls += 1;

        if let Some(kind) = state.write_failure.take() {
            return Err(PortError::Io(std::io::Error::new(kind, "mock write failure")));
        }

        state.write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        state.read_calls += 1;

        let step = state.reads.pop_front();
        match step {
            None | Some(ReadStep::PollTimeout) => Err(PortError::PollTimeout),
            Some(ReadStep::Fail(kind)) => {
                Err(PortError::Io(std::io::Error::new(kind, "mock read failure")))
            }
            Some(ReadStep::Data(mut data)) => {
                let n = data.len().min(buffer.len());
                buffer[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    let rest = data.split_off(n);
                    state.reads.push_front(ReadStep::Data(rest));
                }
                Ok(n)
            }
        }
    }

    fn close(&mut self) -> Result<(), PortError> {
        let mut state = self.state.lock();
        state.close_calls += 1;

        match state.close_failure.take() {
            Some(kind) => Err(PortError::Io(std::io::Error::new(kind, "mock close failure"))),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("pending_reads", &self.pending_reads())
            .finish()
    }
}

/// Connector that hands out clones of one `MockSerialPort`.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    port: MockSerialPort,
    last_config: Arc<Mutex<Option<DriverConfig>>>,
    failure: Arc<Mutex<Option<ErrorKind>>>,
    connects: Arc<Mutex<usize>>,
}

impl MockConnector {
    pub fn new(port: MockSerialPort) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Make the next connect fail with an I/O error of `kind`.
    pub fn fail_next_connect(&self, kind: ErrorKind) {
        *self.failure.lock() = Some(kind);
    }

    /// The driver record passed to the most recent connect.
    pub fn last_config(&self) -> Option<DriverConfig> {
        self.last_config.lock().clone()
    }

    pub fn connects(&self) -> usize {
        *self.connects.lock()
    }
}

impl SerialConnector for MockConnector {
    fn connect(&self, config: &DriverConfig) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        *self.connects.lock() += 1;
        *self.last_config.lock() = Some(config.clone());

        if let Some(kind) = self.failure.lock().take() {
            return Err(PortError::Io(std::io::Error::new(kind, "mock open failure")));
        }
        Ok(Box::new(self.port.clone()))
    }
}
