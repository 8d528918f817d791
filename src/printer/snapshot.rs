use serde::{Serialize, Serializer};
use std::fmt;

/// Presentable printer state. Everything except `Passthrough` is a fixed label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PrintState {
    #[default]
    Ready,
    PrinterOff,
    Standby,
    Paused,
    Error,
    Complete,
    Printing,
    Heating,
    HttpError,
    JsonError,
    /// Backend-controlled text shown as-is (still width-capped on render).
    Passthrough(String),
}

impl PrintState {
    pub fn as_str(&self) -> &str {
        match self {
            PrintState::Ready => "Ready",
            PrintState::PrinterOff => "Printer Off",
            PrintState::Standby => "Standby",
            PrintState::Paused => "Paused",
            PrintState::Error => "Error",
            PrintState::Complete => "Complete",
            PrintState::Printing => "Printing",
            PrintState::Heating => "Heating",
            PrintState::HttpError => "HTTP Error",
            PrintState::JsonError => "JSON Error",
            PrintState::Passthrough(raw) => raw,
        }
    }

    /// True for the markers a failed fetch leaves behind.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, PrintState::HttpError | PrintState::JsonError)
    }
}

impl fmt::Display for PrintState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PrintState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Normalized view of one fetch cycle. Overwritten in place on every poll.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PrinterSnapshot {
    pub nozzle_temp: f64,
    pub nozzle_target: f64,
    pub bed_temp: f64,
    pub bed_target: f64,
    /// Percentage in [0, 100].
    pub print_progress: f64,
    pub print_state: PrintState,
    pub file_name: String,
}
