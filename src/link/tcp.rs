use std::{
    net::{TcpStream, ToSocketAddrs},
    thread,
    time::{Duration, Instant},
};

use super::{Link, ProbeCache, PROBE_CACHE_MS};

const PROBE_TIMEOUT_MS: u64 = 500;
const RETRY_PAUSE_MS: u64 = 500;

/// Treats "the backend accepts TCP connections" as the link being up.
/// Used when the host's own networking is managed elsewhere.
pub struct TcpProbe {
    host: String,
    port: u16,
    label: String,
    cache: ProbeCache,
}

impl TcpProbe {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            label: format!("{host}:{port}"),
            cache: ProbeCache::new(Duration::from_millis(PROBE_CACHE_MS)),
        }
    }
}

fn probe(host: &str, port: u16, timeout: Duration) -> bool {
    let addrs = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(_) => return false,
    };
    addrs
        .into_iter()
        .any(|addr| TcpStream::connect_timeout(&addr, timeout).is_ok())
}

impl Link for TcpProbe {
    fn connect(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            let remaining = deadline.saturating_duration_since(now);
            if remaining.is_zero() {
                self.cache.record(now, false);
                return false;
            }
            let attempt = remaining.min(Duration::from_millis(PROBE_TIMEOUT_MS));
            if probe(&self.host, self.port, attempt) {
                self.cache.record(Instant::now(), true);
                return true;
            }
            let pause = deadline
                .saturating_duration_since(Instant::now())
                .min(Duration::from_millis(RETRY_PAUSE_MS));
            thread::sleep(pause);
        }
    }

    fn is_connected(&mut self) -> bool {
        let timeout = Duration::from_millis(PROBE_TIMEOUT_MS);
        let (host, port) = (&self.host, self.port);
        self.cache
            .get_or_probe(Instant::now(), || probe(host, port, timeout))
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn connects_to_listening_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut link = TcpProbe::new("127.0.0.1", port);
        assert!(link.connect(Duration::from_millis(1_000)));
        assert!(link.is_connected());
        assert_eq!(link.label(), format!("127.0.0.1:{port}"));
    }

    #[test]
    fn gives_up_after_timeout_on_closed_port() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let mut link = TcpProbe::new("127.0.0.1", port);
        let start = Instant::now();
        assert!(!link.connect(Duration::from_millis(300)));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!link.is_connected());
    }

    #[test]
    fn unresolvable_host_is_down() {
        assert!(!probe("", 7125, Duration::from_millis(100)));
    }
}
