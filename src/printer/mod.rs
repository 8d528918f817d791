//! Printer status model and the Moonraker query pipeline.

pub mod classify;
pub mod fetch;
pub mod snapshot;

pub use classify::{classify, Temperatures};
pub use fetch::{FetchError, HttpResponse, HttpTransport, StatusFetcher, UreqTransport};
pub use snapshot::{PrintState, PrinterSnapshot};
