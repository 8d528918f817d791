use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;

use crate::{Error, Result};

use super::{Config, CONFIG_FILE_NAME};

pub fn load_or_default() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        let cfg = Config::default();
        cfg.save_to_path(&path)?;
        super::validate(&cfg)?;
        return Ok(cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        let cfg = Config::default();
        super::validate(&cfg)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(path)?;
    parse(&raw)
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = format!(
        "# moonlcd config\n\
host = \"{}\"\n\
port = {}\n\
poll_interval_ms = {}\n\
screen_duration_ms = {}\n\
request_timeout_ms = {}\n\
connect_timeout_ms = {}\n\
temp_tolerance = {:?}\n\
cols = {}\n\
rows = {}\n\
pcf8574_addr = {}\n\
wifi_ssid = {}\n\
wifi_password = {}\n",
        config.host,
        config.port,
        config.poll_interval_ms,
        config.screen_duration_ms,
        config.request_timeout_ms,
        config.connect_timeout_ms,
        config.temp_tolerance,
        config.cols,
        config.rows,
        super::format_pcf_addr(&config.pcf8574_addr),
        format_optional(config.wifi_ssid.as_deref()),
        format_optional(config.wifi_password.as_deref()),
    );
    fs::write(path, contents)?;
    Ok(())
}

pub fn parse(raw: &str) -> Result<Config> {
    let mut cfg = Config::default();

    for (idx, line) in raw.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = trimmed.split_once('=').ok_or_else(|| {
            Error::InvalidArgs(format!("invalid config line {}: '{}'", idx + 1, line))
        })?;

        let key = key.trim();
        let value = value.trim().trim_matches('"');
        let line_no = idx + 1;
        match key {
            "host" => cfg.host = value.to_string(),
            "port" => cfg.port = parse_number(key, value, line_no)?,
            "poll_interval_ms" => cfg.poll_interval_ms = parse_number(key, value, line_no)?,
            "screen_duration_ms" => cfg.screen_duration_ms = parse_number(key, value, line_no)?,
            "request_timeout_ms" => cfg.request_timeout_ms = parse_number(key, value, line_no)?,
            "connect_timeout_ms" => cfg.connect_timeout_ms = parse_number(key, value, line_no)?,
            "temp_tolerance" => cfg.temp_tolerance = parse_number(key, value, line_no)?,
            "cols" => cfg.cols = parse_number(key, value, line_no)?,
            "rows" => cfg.rows = parse_number(key, value, line_no)?,
            "pcf8574_addr" => {
                cfg.pcf8574_addr = super::parse_pcf_addr(value).map_err(|e| {
                    Error::InvalidArgs(format!("invalid pcf8574_addr on line {line_no}: {e}"))
                })?;
            }
            "wifi_ssid" => cfg.wifi_ssid = parse_optional(value),
            "wifi_password" => cfg.wifi_password = parse_optional(value),
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown config key '{other}' on line {line_no}"
                )));
            }
        }
    }

    super::validate(&cfg)?;
    Ok(cfg)
}

fn config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "moonlcd").ok_or_else(|| {
        Error::InvalidArgs("no home directory; cannot locate config directory".into())
    })?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str, line_no: usize) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::InvalidArgs(format!("invalid {key} value on line {line_no}")))
}

fn parse_optional(value: &str) -> Option<String> {
    if value == "null" || value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn format_optional(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("\"{v}\""),
        None => "null".into(),
    }
}
