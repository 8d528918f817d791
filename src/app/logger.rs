use std::fs::{File, OpenOptions};
use std::io::Write;
use std::str::FromStr;
use std::time::SystemTime;

use crate::{Error, Result};

pub const LOG_LEVEL_ENV: &str = "MOONLCD_LOG_LEVEL";
pub const LOG_PATH_ENV: &str = "MOONLCD_LOG_PATH";

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    #[default]
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    fn tag(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(Error::InvalidArgs(format!(
                "unknown log level '{other}' (expected error, warn, info, debug or trace)"
            ))),
        }
    }
}

/// Levelled logger writing to stderr and, optionally, an appended file.
///
/// `MOONLCD_LOG_LEVEL` and `MOONLCD_LOG_PATH` take precedence over the values
/// passed in.
pub struct Logger {
    level: LogLevel,
    file: Option<File>,
}

impl Logger {
    pub fn new(level: LogLevel, file_path: Option<String>) -> Result<Self> {
        let level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|raw| LogLevel::from_str(&raw).ok())
            .unwrap_or(level);
        let path = std::env::var(LOG_PATH_ENV).ok().or(file_path);
        Self::with_sink(level, path)
    }

    /// Logger that ignores the environment; used by tests and `--once`.
    pub fn with_sink(level: LogLevel, file_path: Option<String>) -> Result<Self> {
        let file = match file_path {
            Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
            None => None,
        };
        Ok(Self { level, file })
    }

    pub fn log(&self, level: LogLevel, msg: impl AsRef<str>) {
        if level > self.level {
            return;
        }
        let ts = humantime::format_rfc3339_seconds(SystemTime::now());
        let line = format!("{ts} {:<5} {}", level.tag(), msg.as_ref());
        eprintln!("{line}");
        if let Some(file) = self.file.as_ref() {
            let mut handle = file;
            let _ = writeln!(handle, "{line}");
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Error, msg);
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Warn, msg);
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Info, msg);
    }

    pub fn debug(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn trace(&self, msg: impl AsRef<str>) {
        self.log(LogLevel::Trace, msg);
    }
}
