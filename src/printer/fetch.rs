use std::{fmt, time::Duration};

use serde_json::Value;

use super::classify::{classify, Temperatures};
use super::snapshot::{PrintState, PrinterSnapshot};
use crate::{Error, Result};

/// Object groups requested from Moonraker on every poll.
pub const QUERY_PATH: &str =
    "/printer/objects/query?webhooks&print_stats&extruder&heater_bed&virtual_sdcard";

const GCODE_SUFFIX: &str = ".gcode";

/// Raw HTTP outcome handed back by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Minimal GET capability so the fetcher can run against a fake in tests.
///
/// Non-2xx statuses come back as `Ok` with their code; `Err` is reserved for
/// transport failures (refused connection, DNS, timeout).
pub trait HttpTransport {
    fn get(&mut self, url: &str) -> Result<HttpResponse>;
}

/// Blocking transport backed by `ureq` with a per-request timeout.
///
/// Redirects are not followed: a 3xx is handed back like any other non-200.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .redirects(0)
            .build();
        Self { agent }
    }
}

impl HttpTransport for UreqTransport {
    fn get(&mut self, url: &str) -> Result<HttpResponse> {
        match self.agent.get(url).call() {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.into_string()?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => Ok(HttpResponse {
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(err)) => Err(Error::Http(err.to_string())),
        }
    }
}

/// Why a poll did not produce fresh data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Backend answered with something other than 200.
    Status(u16),
    /// No usable answer: refused, unreachable, timed out.
    Transport(String),
    /// Body was not JSON.
    Parse(String),
}

impl FetchError {
    /// Marker written into `print_state` for this failure.
    pub fn marker(&self) -> PrintState {
        match self {
            FetchError::Status(_) | FetchError::Transport(_) => PrintState::HttpError,
            FetchError::Parse(_) => PrintState::JsonError,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status(code) => write!(f, "HTTP failed: {code}"),
            FetchError::Transport(msg) => write!(f, "HTTP failed: {msg}"),
            FetchError::Parse(msg) => write!(f, "JSON failed: {msg}"),
        }
    }
}

impl From<FetchError> for Error {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Parse(msg) => Error::Parse(msg),
            other => Error::Http(other.to_string()),
        }
    }
}

/// Typed lookups into a JSON document that fall back to a default when the
/// path is missing or holds the wrong type.
pub trait FieldLookup {
    fn str_or<'a>(&'a self, pointer: &str, default: &'a str) -> &'a str;
    fn f64_or(&self, pointer: &str, default: f64) -> f64;
}

impl FieldLookup for Value {
    fn str_or<'a>(&'a self, pointer: &str, default: &'a str) -> &'a str {
        self.pointer(pointer).and_then(Value::as_str).unwrap_or(default)
    }

    fn f64_or(&self, pointer: &str, default: f64) -> f64 {
        self.pointer(pointer).and_then(Value::as_f64).unwrap_or(default)
    }
}

/// Issues one status query per call and folds the answer into a snapshot.
pub struct StatusFetcher<T: HttpTransport> {
    transport: T,
    url: String,
    tolerance: f64,
}

impl<T: HttpTransport> StatusFetcher<T> {
    pub fn new(transport: T, host: &str, port: u16, tolerance: f64) -> Self {
        Self {
            transport,
            url: query_url(host, port),
            tolerance,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Query the backend once. On failure only `print_state` is overwritten.
    pub fn fetch_into(
        &mut self,
        snapshot: &mut PrinterSnapshot,
    ) -> std::result::Result<(), FetchError> {
        let outcome = match self.transport.get(&self.url) {
            Ok(resp) if resp.status == 200 => apply_status(&resp.body, snapshot, self.tolerance),
            Ok(resp) => Err(FetchError::Status(resp.status)),
            Err(err) => Err(FetchError::Transport(err.to_string())),
        };
        if let Err(err) = &outcome {
            snapshot.print_state = err.marker();
        }
        outcome
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }
}

pub fn query_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}{QUERY_PATH}")
}

/// Parse a `/printer/objects/query` body into `snapshot`.
pub fn apply_status(
    body: &str,
    snapshot: &mut PrinterSnapshot,
    tolerance: f64,
) -> std::result::Result<(), FetchError> {
    let doc: Value = serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let webhooks_state = doc.str_or("/result/status/webhooks/state", "unknown");
    let print_stats_state = doc.str_or("/result/status/print_stats/state", "unknown");

    snapshot.file_name = doc
        .str_or("/result/status/print_stats/filename", "")
        .replacen(GCODE_SUFFIX, "", 1);

    snapshot.nozzle_temp = doc.f64_or("/result/status/extruder/temperature", 0.0);
    snapshot.nozzle_target = doc.f64_or("/result/status/extruder/target", 0.0);
    snapshot.bed_temp = doc.f64_or("/result/status/heater_bed/temperature", 0.0);
    snapshot.bed_target = doc.f64_or("/result/status/heater_bed/target", 0.0);

    let progress = doc.f64_or("/result/status/virtual_sdcard/progress", 0.0);
    snapshot.print_progress = progress * 100.0;

    let temps = Temperatures {
        nozzle: snapshot.nozzle_temp,
        nozzle_target: snapshot.nozzle_target,
        bed: snapshot.bed_temp,
        bed_target: snapshot.bed_target,
    };
    snapshot.print_state = classify(webhooks_state, print_stats_state, temps, tolerance);
    Ok(())
}
