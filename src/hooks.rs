//! Named I/O hooks.
//!
//! A transport variant declares a closed vocabulary of lifecycle events
//! (an enum implementing [`HookEvent`]). Callers hand over a loosely typed
//! mapping from event name to hook; [`HookRegistry::from_map`] keeps only
//! the names in that vocabulary and drops the rest without failing.
//!
//! # Example
//!
//! ```
//! use rtu_serial_link::hooks::{hook_fn, HookRegistry, TransportEvent};
//! use std::collections::HashMap;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let count = Arc::new(AtomicUsize::new(0));
//! let seen = Arc::clone(&count);
//!
//! let mut raw = HashMap::new();
//! raw.insert("beforeReceive", hook_fn(move |_| {
//!     seen.fetch_add(1, Ordering::SeqCst);
//! }));
//! raw.insert("onConnect", hook_fn(|_| {}));
//!
//! let hooks = HookRegistry::<TransportEvent>::from_map(raw);
//! assert_eq!(hooks.registered(), vec![TransportEvent::BeforeReceive]);
//!
//! hooks.trigger(TransportEvent::BeforeReceive, "/dev/ttyUSB0");
//! assert_eq!(count.load(Ordering::SeqCst), 1);
//! ```

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// A closed set of hook names recognized by one transport variant.
pub trait HookEvent: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Every event in the vocabulary, in declaration order.
    const ALL: &'static [Self];

    /// Wire name of the event, as used in hook mappings.
    fn name(self) -> &'static str;

    fn valid_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|event| event.name()).collect()
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|event| event.name() == name)
    }
}

/// Events around the byte-stream transport's read and write calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportEvent {
    BeforeReceive,
    AfterReceive,
    BeforeTransmit,
    AfterTransmit,
}

impl HookEvent for TransportEvent {
    const ALL: &'static [Self] = &[
        Self::BeforeReceive,
        Self::AfterReceive,
        Self::BeforeTransmit,
        Self::AfterTransmit,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::BeforeReceive => "beforeReceive",
            Self::AfterReceive => "afterReceive",
            Self::BeforeTransmit => "beforeTransmit",
            Self::AfterTransmit => "afterTransmit",
        }
    }
}

/// Events for the RTU framing layer that sits on top of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramingEvent {
    BeforeSerialReceive,
    AfterSerialReceive,
    BeforeSerialTransmit,
    AfterSerialTransmit,
    BeforeTransportWrite,
    AfterTransportWrite,
    BeforeTransportRead,
    AfterTransportRead,
}

impl HookEvent for FramingEvent {
    const ALL: &'static [Self] = &[
        Self::BeforeSerialReceive,
        Self::AfterSerialReceive,
        Self::BeforeSerialTransmit,
        Self::AfterSerialTransmit,
        Self::BeforeTransportWrite,
        Self::AfterTransportWrite,
        Self::BeforeTransportRead,
        Self::AfterTransportRead,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::BeforeSerialReceive => "beforeSerialReceive",
            // Existing hook configurations use this spelling.
            Self::AfterSerialReceive => "afterSerailReceive",
            Self::BeforeSerialTransmit => "beforeSerialTransmit",
            Self::AfterSerialTransmit => "afterSerialTransmit",
            Self::BeforeTransportWrite => "beforeRTUTransportWrite",
            Self::AfterTransportWrite => "afterRTUTransportWrite",
            Self::BeforeTransportRead => "beforeRTUTransportRead",
            Self::AfterTransportRead => "afterRTUTransportRead",
        }
    }
}

/// Arguments passed to every hook invocation.
#[derive(Debug, Clone)]
pub struct HookContext<'a, E> {
    /// The event being triggered.
    pub event: E,
    /// Device identifier of the port the operation runs against.
    pub device: &'a str,
    /// When the trigger happened.
    pub timestamp: DateTime<Utc>,
}

/// A side-effect callback run around an I/O operation.
///
/// Hooks run synchronously on the caller's thread. A panicking hook unwinds
/// through the operation that triggered it.
pub trait Hook<E>: Send + Sync {
    fn run(&self, ctx: &HookContext<'_, E>);
}

impl<E, F> Hook<E> for F
where
    F: Fn(&HookContext<'_, E>) + Send + Sync,
{
    fn run(&self, ctx: &HookContext<'_, E>) {
        self(ctx)
    }
}

/// Box a closure as a shareable hook.
pub fn hook_fn<E, F>(f: F) -> Arc<dyn Hook<E>>
where
    E: 'static,
    F: Fn(&HookContext<'_, E>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Filtered, read-only lookup from event to hook.
pub struct HookRegistry<E: HookEvent> {
    hooks: HashMap<E, Arc<dyn Hook<E>>>,
}

impl<E: HookEvent> HookRegistry<E> {
    /// A registry with no hooks; every trigger is a no-op.
    pub fn empty() -> Self {
        Self {
            hooks: HashMap::new(),
        }
    }

    /// Build a registry from a caller-supplied mapping.
    ///
    /// Entries whose name is not in `E`'s vocabulary are discarded. No error
    /// is reported for them.
    pub fn from_map<I, K>(raw: I) -> Self
    where
        I: IntoIterator<Item = (K, Arc<dyn Hook<E>>)>,
        K: AsRef<str>,
    {
        let mut hooks = HashMap::new();
        for (name, hook) in raw {
            match E::from_name(name.as_ref()) {
                Some(event) => {
                    hooks.insert(event, hook);
                }
                None => debug!(hook = name.as_ref(), "ignoring unknown hook name"),
            }
        }
        Self { hooks }
    }

    /// Run the hook registered for `event`, if any.
    pub fn trigger(&self, event: E, device: &str) {
        if let Some(hook) = self.hooks.get(&event) {
            hook.run(&HookContext {
                event,
                device,
                timestamp: Utc::now(),
            });
        }
    }

    /// Trigger by wire name. Names outside the vocabulary are a no-op.
    pub fn trigger_by_name(&self, name: &str, device: &str) {
        if let Some(event) = E::from_name(name) {
            self.trigger(event, device);
        }
    }

    pub fn contains(&self, event: E) -> bool {
        self.hooks.contains_key(&event)
    }

    /// Events that have a hook, in vocabulary order.
    pub fn registered(&self) -> Vec<E> {
        E::ALL
            .iter()
            .copied()
            .filter(|event| self.hooks.contains_key(event))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<E: HookEvent> Default for HookRegistry<E> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<E: HookEvent> fmt::Debug for HookRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("registered", &self.registered())
            .finish()
    }
}
