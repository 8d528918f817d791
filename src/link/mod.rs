//! Network reachability: how the daemon decides the printer can be polled.

use std::time::{Duration, Instant};

mod nmcli;
mod tcp;

pub use nmcli::NmcliWifi;
pub use tcp::TcpProbe;

/// How long an `is_connected` answer is reused before probing again.
pub const PROBE_CACHE_MS: u64 = 1_000;

/// Connectivity capability polled by the main loop.
pub trait Link {
    /// Try to bring the link up, giving up after `timeout`.
    fn connect(&mut self, timeout: Duration) -> bool;

    fn is_connected(&mut self) -> bool;

    /// Short human label for status screens (SSID or host).
    fn label(&self) -> &str;
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn connect(&mut self, timeout: Duration) -> bool {
        (**self).connect(timeout)
    }

    fn is_connected(&mut self) -> bool {
        (**self).is_connected()
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}

/// Rate limiter for link probes; the render path asks every tick.
#[derive(Debug, Clone)]
pub(crate) struct ProbeCache {
    ttl: Duration,
    last: Option<(Instant, bool)>,
}

impl ProbeCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self { ttl, last: None }
    }

    pub(crate) fn get_or_probe(&mut self, now: Instant, probe: impl FnOnce() -> bool) -> bool {
        if let Some((at, up)) = self.last {
            if now.saturating_duration_since(at) < self.ttl {
                return up;
            }
        }
        let up = probe();
        self.last = Some((now, up));
        up
    }

    pub(crate) fn record(&mut self, now: Instant, up: bool) {
        self.last = Some((now, up));
    }
}
