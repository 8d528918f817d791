use std::{
    io::Write,
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use super::{Link, ProbeCache, PROBE_CACHE_MS};

const POLL_PAUSE_MS: u64 = 500;

/// Joins a Wi-Fi network through NetworkManager's `nmcli`.
pub struct NmcliWifi {
    ssid: String,
    password: Option<String>,
    cache: ProbeCache,
}

impl NmcliWifi {
    pub fn new(ssid: &str, password: Option<&str>) -> Self {
        Self {
            ssid: ssid.to_string(),
            password: password.map(str::to_string),
            cache: ProbeCache::new(Duration::from_millis(PROBE_CACHE_MS)),
        }
    }

    /// Arguments for the join. The password never goes on argv: with `--ask`
    /// nmcli prompts for it and reads the answer from stdin.
    fn connect_args(&self, timeout: Duration) -> Vec<String> {
        let wait_secs = timeout.as_secs().max(1);
        let mut args = Vec::with_capacity(7);
        if self.password.is_some() {
            args.push("--ask".to_string());
        }
        args.extend([
            "--wait".to_string(),
            wait_secs.to_string(),
            "device".to_string(),
            "wifi".to_string(),
            "connect".to_string(),
            self.ssid.clone(),
        ]);
        args
    }

    fn run_join(&self, timeout: Duration) -> std::io::Result<()> {
        let mut child = Command::new("nmcli")
            .args(self.connect_args(timeout))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            if let Some(password) = &self.password {
                writeln!(stdin, "{password}")?;
            }
        }
        child.wait()?;
        Ok(())
    }
}

impl Link for NmcliWifi {
    fn connect(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        // A failed join is not final: NetworkManager may still be associating.
        let _ = self.run_join(timeout);

        loop {
            let now = Instant::now();
            if general_state_connected() {
                self.cache.record(now, true);
                return true;
            }
            if now >= deadline {
                self.cache.record(now, false);
                return false;
            }
            thread::sleep(
                deadline
                    .saturating_duration_since(now)
                    .min(Duration::from_millis(POLL_PAUSE_MS)),
            );
        }
    }

    fn is_connected(&mut self) -> bool {
        self.cache
            .get_or_probe(Instant::now(), general_state_connected)
    }

    fn label(&self) -> &str {
        &self.ssid
    }
}

fn general_state_connected() -> bool {
    Command::new("nmcli")
        .args(["-t", "-f", "STATE", "general"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .map(|out| {
            out.status.success() && is_connected_state(&String::from_utf8_lossy(&out.stdout))
        })
        .unwrap_or(false)
}

/// `nmcli -t -f STATE general` prints e.g. `connected`, `connected (site only)`,
/// `connecting`, `disconnected`. Site-only still reaches a LAN printer.
fn is_connected_state(raw: &str) -> bool {
    let state = raw.trim();
    state == "connected" || state.starts_with("connected ")
}
