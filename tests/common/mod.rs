//! Shared test utilities for transport tests.
//!
//! This module provides common test infrastructure including:
//! - Mock-backed transports with recorded hook events
//! - Deadline helpers
//! - Test logging setup

#![allow(dead_code)]

use parking_lot::Mutex;
use rtu_serial_link::{
    hook_fn, Hook, HookContext, HookRegistry, MockConnector, MockSerialPort, PortConfig,
    SerialTransport, TransportEvent,
};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize test logging. Call this at the start of each test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("warn,rtu_serial_link=trace")),
            )
            .with_test_writer()
            .init();
    });
}

/// A deadline `ago` in the past.
pub fn deadline_ago(ago: Duration) -> Instant {
    Instant::now()
        .checked_sub(ago)
        .expect("monotonic clock earlier than test deadline")
}

/// A deadline `ahead` in the future.
pub fn deadline_in(ahead: Duration) -> Instant {
    Instant::now() + ahead
}

/// One observed hook call, with the driver read count at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    pub event: TransportEvent,
    pub reads_so_far: usize,
    pub writes_so_far: usize,
}

/// Records every hook trigger against a mock port.
#[derive(Clone, Default)]
pub struct HookRecorder {
    events: Arc<Mutex<Vec<Observed>>>,
}

impl HookRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hook that records into this recorder, snapshotting `port` counters.
    pub fn hook(&self, port: &MockSerialPort) -> Arc<dyn Hook<TransportEvent>> {
        let events = Arc::clone(&self.events);
        let port = port.clone();
        hook_fn(move |ctx: &HookContext<'_, TransportEvent>| {
            events.lock().push(Observed {
                event: ctx.event,
                reads_so_far: port.read_calls(),
                writes_so_far: port.write_calls(),
            });
        })
    }

    /// Registry with a recording hook for every transport event.
    pub fn registry(&self, port: &MockSerialPort) -> HookRegistry<TransportEvent> {
        HookRegistry::from_map(
            [
                "beforeReceive",
                "afterReceive",
                "beforeTransmit",
                "afterTransmit",
            ]
            .into_iter()
            .map(|name| (name, self.hook(port))),
        )
    }

    pub fn observed(&self) -> Vec<Observed> {
        self.events.lock().clone()
    }

    pub fn events(&self) -> Vec<TransportEvent> {
        self.events.lock().iter().map(|o| o.event).collect()
    }
}

/// A transport over `port` with every hook recorded, already opened.
pub fn open_recorded_transport(
    port: &MockSerialPort,
) -> (SerialTransport<MockConnector>, HookRecorder) {
    use rtu_serial_link::RtuLink;

    let recorder = HookRecorder::new();
    let mut link = SerialTransport::with_connector(
        Arc::new(PortConfig::new("MOCK0", 19200)),
        Arc::new(recorder.registry(port)),
        MockConnector::new(port.clone()),
    );
    link.open().expect("mock open");
    (link, recorder)
}
