//! Deadline-aware serial transport.
//!
//! [`SerialTransport`] wraps a driver-level serial port to give the RTU
//! framing layer a byte stream with per-request deadlines. Each read is a
//! single short driver poll: an idle line comes back as `Ok(0)` so the
//! caller's loop can try again, while an elapsed deadline comes back as
//! [`TransportError::RequestTimedOut`] before any I/O or hook runs.

use crate::error::{TransportError, TransportResult};
use crate::hooks::{HookRegistry, TransportEvent};
use crate::port::{
    DriverConfig, PortConfig, PortError, SerialConnector, SerialPortAdapter, SystemConnector,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// How long one driver read blocks when no bytes are available.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Byte-stream link consumed by the RTU framing layer.
pub trait RtuLink {
    fn open(&mut self) -> TransportResult<()>;

    fn close(&mut self) -> TransportResult<()>;

    /// One read attempt. `Ok(0)` means "no bytes yet, retry while time
    /// remains".
    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize>;

    fn write(&mut self, buf: &[u8]) -> TransportResult<usize>;

    /// Store the absolute deadline for subsequent reads.
    fn set_deadline(&mut self, deadline: Instant);

    /// Repeat [`RtuLink::read`] until `buf` is full.
    ///
    /// Stops at the first error, which includes the deadline expiring.
    fn read_full(&mut self, buf: &mut [u8]) -> TransportResult<()> {
        let mut filled = 0;
        while filled < buf.len() {
            filled += self.read(&mut buf[filled..])?;
        }
        Ok(())
    }
}

/// Lifecycle of a transport's physical connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Unopened,
    Open,
    Closed,
}

/// Serial port wrapper with deadline and hook support.
///
/// Not internally synchronized: calls on one instance must come from one
/// flow of control.
#[derive(Debug)]
pub struct SerialTransport<C: SerialConnector = SystemConnector> {
    config: Arc<PortConfig>,
    connector: C,
    port: Option<Box<dyn SerialPortAdapter>>,
    state: LinkState,
    deadline: Option<Instant>,
    poll_timeout: Duration,
    hooks: Arc<HookRegistry<TransportEvent>>,
}

impl SerialTransport<SystemConnector> {
    /// Create a transport that opens real devices.
    pub fn new(config: Arc<PortConfig>, hooks: Arc<HookRegistry<TransportEvent>>) -> Self {
        Self::with_connector(config, hooks, SystemConnector)
    }
}

impl<C: SerialConnector> SerialTransport<C> {
    /// Create a transport that opens ports through `connector`.
    pub fn with_connector(
        config: Arc<PortConfig>,
        hooks: Arc<HookRegistry<TransportEvent>>,
        connector: C,
    ) -> Self {
        Self {
            config,
            connector,
            port: None,
            state: LinkState::Unopened,
            deadline: None,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            hooks,
        }
    }

    /// Override the driver poll timeout used by the next `open`.
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    /// The record handed to the driver on open.
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig::from_port_config(&self.config, self.poll_timeout)
    }

    pub fn config(&self) -> &Arc<PortConfig> {
        &self.config
    }

    pub fn hooks(&self) -> &Arc<HookRegistry<TransportEvent>> {
        &self.hooks
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// The most recently stored deadline.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Set the deadline to `timeout` from now.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.set_deadline(Instant::now() + timeout);
    }

    fn deadline_passed(&self) -> bool {
        // Reads before the first set_deadline are treated as already late.
        match self.deadline {
            Some(deadline) => Instant::now() > deadline,
            None => true,
        }
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPortAdapter>, PortError> {
        self.port.as_mut().ok_or(PortError::NotOpen)
    }
}

impl<C: SerialConnector> RtuLink for SerialTransport<C> {
    fn open(&mut self) -> TransportResult<()> {
        if self.port.is_some() {
            return Err(PortError::AlreadyOpen.into());
        }

        let driver = self.driver_config();
        debug!(
            device = %driver.address,
            baud = driver.baud_rate,
            data_bits = driver.data_bits.count(),
            parity = %driver.parity,
            stop_bits = driver.stop_bits.count(),
            "opening serial port"
        );

        self.port = Some(self.connector.connect(&driver)?);
        self.state = LinkState::Open;
        Ok(())
    }

    fn close(&mut self) -> TransportResult<()> {
        let mut port = self.port.take().ok_or(PortError::NotOpen)?;
        self.state = LinkState::Closed;
        debug!(device = %self.config.device, "closing serial port");
        port.close()?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> TransportResult<usize> {
        if self.deadline_passed() {
            return Err(TransportError::RequestTimedOut);
        }

        let hooks = Arc::clone(&self.hooks);
        let config = Arc::clone(&self.config);

        hooks.trigger(TransportEvent::BeforeReceive, &config.device);
        let result = self.port_mut().and_then(|port| port.read_bytes(buf));
        hooks.trigger(TransportEvent::AfterReceive, &config.device);

        match result {
            Ok(n) => {
                trace!(device = %config.device, bytes = n, "read");
                Ok(n)
            }
            Err(PortError::PollTimeout) => {
                trace!(device = %config.device, "no data within poll window");
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, buf: &[u8]) -> TransportResult<usize> {
        let hooks = Arc::clone(&self.hooks);
        let config = Arc::clone(&self.config);

        hooks.trigger(TransportEvent::BeforeTransmit, &config.device);
        let result = self.port_mut().and_then(|port| port.write_bytes(buf));
        hooks.trigger(TransportEvent::AfterTransmit, &config.device);

        let n = result?;
        trace!(device = %config.device, bytes = n, "wrote");
        Ok(n)
    }

    fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }
}
