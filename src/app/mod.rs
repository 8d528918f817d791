use crate::{
    cli::RunOptions,
    config::{self, Config, Pcf8574Addr},
    display::lcd::Lcd,
    link::{Link, NmcliWifi, TcpProbe},
    printer::{HttpTransport, PrinterSnapshot, StatusFetcher, UreqTransport},
    Error, Result,
};
use std::{
    path::Path,
    str::FromStr,
    sync::atomic::Ordering,
    thread,
    time::{Duration, Instant},
};

mod lifecycle;
mod logger;
mod poll_loop;

use lifecycle::{create_shutdown_flag, render_boot, render_shutdown};
pub use logger::{LogLevel, Logger};
pub use poll_loop::{LoopTimings, PollLoop};

/// Daemon tick; rotation and rendering are checked this often.
pub const TICK_MS: u64 = 100;
/// Pause after a successful initial connect so "connected" stays readable.
const SETTLE_MS: u64 = 1_000;

/// Effective settings: config file values with CLI overrides applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
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
    pub log_level: LogLevel,
    pub log_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let cfg = Config::default();
        Self {
            host: cfg.host,
            port: cfg.port,
            poll_interval_ms: cfg.poll_interval_ms,
            screen_duration_ms: cfg.screen_duration_ms,
            request_timeout_ms: cfg.request_timeout_ms,
            connect_timeout_ms: cfg.connect_timeout_ms,
            temp_tolerance: cfg.temp_tolerance,
            cols: cfg.cols,
            rows: cfg.rows,
            pcf8574_addr: cfg.pcf8574_addr,
            wifi_ssid: None,
            wifi_password: None,
            log_level: LogLevel::default(),
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Merge CLI overrides over the file config and re-validate the result.
    pub fn from_sources(mut config: Config, opts: RunOptions) -> Result<Self> {
        if let Some(host) = opts.host {
            config.host = host;
        }
        if let Some(port) = opts.port {
            config.port = port;
        }
        if let Some(poll) = opts.poll_interval_ms {
            config.poll_interval_ms = poll;
        }
        config::validate(&config)?;

        let log_level = match opts.log_level.as_deref() {
            Some(raw) => LogLevel::from_str(raw)?,
            None => LogLevel::default(),
        };

        Ok(Self {
            host: config.host,
            port: config.port,
            poll_interval_ms: config.poll_interval_ms,
            screen_duration_ms: config.screen_duration_ms,
            request_timeout_ms: config.request_timeout_ms,
            connect_timeout_ms: config.connect_timeout_ms,
            temp_tolerance: config.temp_tolerance,
            cols: config.cols,
            rows: config.rows,
            pcf8574_addr: config.pcf8574_addr,
            wifi_ssid: config.wifi_ssid,
            wifi_password: config.wifi_password,
            log_level,
            log_file: opts.log_file,
        })
    }

    pub fn timings(&self) -> LoopTimings {
        LoopTimings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            screen_duration: Duration::from_millis(self.screen_duration_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }

    /// Wi-Fi when an SSID is configured, otherwise plain reachability of the backend.
    pub fn link(&self) -> Box<dyn Link> {
        match &self.wifi_ssid {
            Some(ssid) => Box::new(NmcliWifi::new(ssid, self.wifi_password.as_deref())),
            None => Box::new(TcpProbe::new(&self.host, self.port)),
        }
    }

    pub fn fetcher<T: HttpTransport>(&self, transport: T) -> StatusFetcher<T> {
        StatusFetcher::new(transport, &self.host, self.port, self.temp_tolerance)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

pub struct App {
    config: AppConfig,
    logger: Logger,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let logger = Logger::new(config.log_level, config.log_file.clone())?;
        Ok(Self { config, logger })
    }

    pub fn from_options(opts: RunOptions) -> Result<Self> {
        let cfg_file = match opts.config_path.as_deref() {
            Some(path) => Config::load_from_path(Path::new(path))?,
            None => Config::load_or_default()?,
        };
        let merged = AppConfig::from_sources(cfg_file, opts)?;
        Self::new(merged)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Entry point for the daemon: bring up the LCD and link, then tick until ctrl-c.
    pub fn run(&self) -> Result<()> {
        let config = &self.config;
        let running = create_shutdown_flag()?;

        let mut lcd = Lcd::new(config.cols, config.rows, config.pcf8574_addr.clone())?;
        render_boot(&mut lcd)?;
        self.logger.info(format!(
            "daemon start (backend={}:{}, poll={}ms, screen={}ms, cols={}, rows={})",
            config.host,
            config.port,
            config.poll_interval_ms,
            config.screen_duration_ms,
            config.cols,
            config.rows
        ));

        let fetcher = config.fetcher(UreqTransport::new(config.request_timeout()));
        let mut poll = PollLoop::new(
            config.link(),
            fetcher,
            lcd,
            config.timings(),
            &self.logger,
            Instant::now(),
        );
        poll.initial_connect()?;
        thread::sleep(Duration::from_millis(SETTLE_MS));
        poll.restart_rotation(Instant::now());

        let tick = Duration::from_millis(TICK_MS);
        while running.load(Ordering::SeqCst) {
            poll.tick(Instant::now())?;
            thread::sleep(tick);
        }

        self.logger.info("shutdown requested; clearing display");
        render_shutdown(poll.display_mut())
    }

    /// One query against the backend, for `--once`.
    pub fn fetch_once<T: HttpTransport>(&self, transport: T) -> Result<PrinterSnapshot> {
        let mut fetcher = self.config.fetcher(transport);
        let mut snapshot = PrinterSnapshot::default();
        self.logger.debug(format!("querying {}", fetcher.url()));
        fetcher.fetch_into(&mut snapshot)?;
        Ok(snapshot)
    }

    pub fn fetch_once_json(&self) -> Result<String> {
        let snapshot = self.fetch_once(UreqTransport::new(self.config.request_timeout()))?;
        snapshot_json(&snapshot)
    }
}

/// Pretty JSON for `--once`; an encoder failure is an output error, not a parse error.
pub fn snapshot_json(snapshot: &PrinterSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).map_err(|e| Error::Io(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::{HttpResponse, PrintState};
    use tempfile::tempdir;

    struct OneShot(Option<HttpResponse>);

    impl HttpTransport for OneShot {
        fn get(&mut self, _url: &str) -> Result<HttpResponse> {
            self.0
                .take()
                .ok_or_else(|| Error::Http("already answered".into()))
        }
    }

    #[test]
    fn cli_overrides_file_values() {
        let opts = RunOptions {
            host: Some("voron.lan".into()),
            port: Some(7126),
            poll_interval_ms: Some(1_500),
            log_level: Some("debug".into()),
            ..RunOptions::default()
        };
        let cfg = AppConfig::from_sources(Config::default(), opts).unwrap();
        assert_eq!(cfg.host, "voron.lan");
        assert_eq!(cfg.port, 7126);
        assert_eq!(cfg.poll_interval_ms, 1_500);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.screen_duration_ms, config::DEFAULT_SCREEN_DURATION_MS);
    }

    #[test]
    fn file_values_win_when_cli_missing() {
        let file = Config {
            host: "10.0.0.8".into(),
            port: 8080,
            temp_tolerance: 3.5,
            wifi_ssid: Some("shop".into()),
            ..Config::default()
        };
        let cfg = AppConfig::from_sources(file.clone(), RunOptions::default()).unwrap();
        assert_eq!(cfg.host, file.host);
        assert_eq!(cfg.port, file.port);
        assert_eq!(cfg.temp_tolerance, 3.5);
        assert_eq!(cfg.wifi_ssid.as_deref(), Some("shop"));
        assert_eq!(cfg.link().label(), "shop");
    }

    #[test]
    fn overrides_are_validated() {
        let opts = RunOptions {
            poll_interval_ms: Some(10),
            ..RunOptions::default()
        };
        let err = AppConfig::from_sources(Config::default(), opts).unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));

        let opts = RunOptions {
            poll_interval_ms: Some(u64::MAX),
            ..RunOptions::default()
        };
        assert!(AppConfig::from_sources(Config::default(), opts).is_err());

        let opts = RunOptions {
            log_level: Some("chatty".into()),
            ..RunOptions::default()
        };
        assert!(AppConfig::from_sources(Config::default(), opts).is_err());
    }

    #[test]
    fn tcp_link_is_used_without_wifi() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.link().label(), "127.0.0.1:7125");
        assert_eq!(
            cfg.fetcher(OneShot(None)).url(),
            "http://127.0.0.1:7125/printer/objects/query?webhooks&print_stats&extruder&heater_bed&virtual_sdcard"
        );
    }

    #[test]
    fn from_options_reads_explicit_config_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = \"mainsail.local\"\nport = 7130\n").unwrap();

        let opts = RunOptions {
            config_path: Some(path.to_string_lossy().into_owned()),
            ..RunOptions::default()
        };
        let app = App::from_options(opts).unwrap();
        assert_eq!(app.config().host, "mainsail.local");
        assert_eq!(app.config().port, 7130);
    }

    #[test]
    fn snapshot_json_uses_display_labels() {
        let snapshot = PrinterSnapshot {
            nozzle_temp: 215.5,
            print_state: PrintState::Passthrough("cancelled".into()),
            file_name: "bracket".into(),
            ..PrinterSnapshot::default()
        };
        let json = snapshot_json(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["print_state"], "cancelled");
        assert_eq!(value["nozzle_temp"], 215.5);
        assert_eq!(value["file_name"], "bracket");
        assert!(json.contains('\n'));
    }

    #[test]
    fn fetch_once_returns_snapshot_or_error() {
        let app = App::new(AppConfig::default()).unwrap();
        let body = r#"{"result":{"status":{"webhooks":{"state":"shutdown"}}}}"#;
        let snapshot = app
            .fetch_once(OneShot(Some(HttpResponse {
                status: 200,
                body: body.into(),
            })))
            .unwrap();
        assert_eq!(snapshot.print_state, PrintState::PrinterOff);

        let err = app
            .fetch_once(OneShot(Some(HttpResponse {
                status: 404,
                body: String::new(),
            })))
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
