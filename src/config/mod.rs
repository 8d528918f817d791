use crate::{Error, Result};
use std::path::Path;

pub mod loader;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7125;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_SCREEN_DURATION_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_TEMP_TOLERANCE: f64 = 2.0;
pub const DEFAULT_COLS: u8 = 16;
pub const DEFAULT_ROWS: u8 = 2;
pub const DEFAULT_PCF8574_ADDR: Pcf8574Addr = Pcf8574Addr::Auto;
pub const MIN_INTERVAL_MS: u64 = 100;
pub const MAX_INTERVAL_MS: u64 = 600_000;
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pcf8574Addr {
    Auto,
    Addr(u8),
}

impl std::str::FromStr for Pcf8574Addr {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        parse_pcf_addr(s)
    }
}

/// User-supplied settings loaded from the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub poll_interval_ms: u64,
    pub screen_duration_ms: u64,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub temp_tolerance: f64,
    pub cols: u8,
    pub rows: u8,
    pub pcf8574_addr: Pcf8574Addr,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            screen_duration_ms: DEFAULT_SCREEN_DURATION_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            temp_tolerance: DEFAULT_TEMP_TOLERANCE,
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            pcf8574_addr: DEFAULT_PCF8574_ADDR,
            wifi_ssid: None,
            wifi_password: None,
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        loader::load_or_default()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        loader::load_from_path(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        loader::save_to_path(self, path)
    }
}

pub(crate) fn validate(cfg: &Config) -> Result<()> {
    if cfg.host.trim().is_empty() {
        return Err(Error::InvalidArgs("host must not be empty".into()));
    }
    if cfg.port == 0 {
        return Err(Error::InvalidArgs("port must be between 1 and 65535".into()));
    }
    for (name, value) in [
        ("poll_interval_ms", cfg.poll_interval_ms),
        ("screen_duration_ms", cfg.screen_duration_ms),
        ("request_timeout_ms", cfg.request_timeout_ms),
        ("connect_timeout_ms", cfg.connect_timeout_ms),
    ] {
        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&value) {
            return Err(Error::InvalidArgs(format!(
                "{name} must be between {MIN_INTERVAL_MS} and {MAX_INTERVAL_MS}"
            )));
        }
    }
    if !cfg.temp_tolerance.is_finite() || cfg.temp_tolerance < 0.0 {
        return Err(Error::InvalidArgs(
            "temp_tolerance must be a non-negative number".into(),
        ));
    }
    if !(8..=40).contains(&cfg.cols) {
        return Err(Error::InvalidArgs("cols must be between 8 and 40".into()));
    }
    if !(1..=4).contains(&cfg.rows) {
        return Err(Error::InvalidArgs("rows must be between 1 and 4".into()));
    }
    if cfg.wifi_password.is_some() && cfg.wifi_ssid.is_none() {
        return Err(Error::InvalidArgs(
            "wifi_password requires wifi_ssid".into(),
        ));
    }
    Ok(())
}

fn parse_pcf_addr(raw: &str) -> std::result::Result<Pcf8574Addr, String> {
    if raw.eq_ignore_ascii_case("auto") {
        return Ok(Pcf8574Addr::Auto);
    }
    let cleaned = raw.trim_start_matches("0x");
    let value = u8::from_str_radix(cleaned, 16)
        .or_else(|_| raw.parse::<u8>())
        .map_err(|_| "expected 'auto' or a hex/decimal address (e.g., 0x27)".to_string())?;
    Ok(Pcf8574Addr::Addr(value))
}

fn format_pcf_addr(addr: &Pcf8574Addr) -> String {
    match addr {
        Pcf8574Addr::Auto => "\"auto\"".into(),
        Pcf8574Addr::Addr(a) => format!("{a:#04x}"),
    }
}
