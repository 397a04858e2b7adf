use crate::transport::Transport;
use crate::{ENDPOINT_IN, INTERFACE};
use std::time::Duration;

/// HID class request, host to interface.
pub const REQUEST_TYPE_SET_REPORT: u8 = 0x21;
pub const REQUEST_SET_REPORT: u8 = 0x09;
/// Output report, id 0.
pub const REPORT_VALUE: u16 = 0x0200;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub interface: u8,
    pub endpoint_in: u8,
    pub request_type: u8,
    pub request: u8,
    pub value: u16,

    /// How long to wait for the single reply to a query.
    pub reply_timeout: Duration,

    /// Per-read bound while flushing after a state change.
    pub drain_timeout: Duration,

    /// Upper bound on frames collected by a single drain.
    pub drain_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interface: INTERFACE,
            endpoint_in: ENDPOINT_IN,
            request_type: REQUEST_TYPE_SET_REPORT,
            request: REQUEST_SET_REPORT,
            value: REPORT_VALUE,
            reply_timeout: Duration::from_millis(1000),
            drain_timeout: Duration::from_millis(500),
            drain_limit: 64,
        }
    }
}

/// Owns the claimed transport for the length of a run.
pub struct Session<T: Transport> {
    transport: T,
    config: SessionConfig,

    // Set when the last drain hit `drain_limit` instead of a timeout.
    backlog: bool,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            backlog: false,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether frames may still be queued from a drain that was cut short.
    pub fn has_backlog(&self) -> bool {
        self.backlog
    }

    pub(crate) fn set_backlog(&mut self, backlog: bool) {
        self.backlog = backlog;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Hands the transport back, so the caller can release the interface.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
