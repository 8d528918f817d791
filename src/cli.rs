use crate::{Error, Result};

/// Options for the `run` command; values are `None` when not provided on CLI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config_path: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub once: bool,
}

/// Parsed command-line intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(RunOptions),
    ShowHelp,
    ShowVersion,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        if args.is_empty() {
            return Ok(Command::Run(RunOptions::default()));
        }

        let mut iter = args.iter();
        match iter.next().map(|s| s.as_str()) {
            Some("run") => Ok(Command::Run(parse_run_options(&mut iter)?)),
            Some("--help") | Some("-h") => Ok(Command::ShowHelp),
            Some("--version") | Some("-V") => Ok(Command::ShowVersion),
            Some(flag) if flag.starts_with('-') => {
                // `run` may be omitted: re-feed the consumed flag with the rest.
                let mut flags: Vec<String> = Vec::with_capacity(args.len());
                flags.push(flag.to_string());
                flags.extend(iter.map(|s| s.to_string()));
                let mut iter = flags.iter();
                Ok(Command::Run(parse_run_options(&mut iter)?))
            }
            Some(cmd) => Err(Error::InvalidArgs(format!(
                "unknown command '{cmd}', try --help"
            ))),
            None => Ok(Command::Run(RunOptions::default())),
        }
    }

    pub fn help() -> &'static str {
        concat!(
            "moonlcd - Klipper printer status on a character LCD\n",
            "\n",
            "USAGE:\n",
            "  moonlcd run [--host <addr>] [--port <number>] [--config <path>] [--poll-ms <number>]\n",
            "              [--log-level <level>] [--log-file <path>] [--once]\n",
            "  moonlcd --help\n",
            "  moonlcd --version\n",
            "\n",
            "OPTIONS:\n",
            "  --host <addr>       Moonraker host (default: 127.0.0.1)\n",
            "  --port <number>     Moonraker port (default: 7125)\n",
            "  --config <path>     Config file (default: ~/.config/moonlcd/config.toml)\n",
            "  --poll-ms <number>  Status poll interval in milliseconds (default: 3000)\n",
            "  --log-level <lvl>   error|warn|info|debug|trace (default: info)\n",
            "  --log-file <path>   Append log lines to this file\n",
            "  --once              Fetch status once, print it as JSON and exit\n",
            "  -h, --help          Show this help\n",
            "  -V, --version       Show version\n",
        )
    }

    pub fn print_help() {
        println!("{}", Self::help());
    }
}

fn parse_run_options(iter: &mut std::slice::Iter<String>) -> Result<RunOptions> {
    let mut opts = RunOptions::default();

    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--host" => {
                opts.host = Some(take_value(flag, iter)?);
            }
            "--port" => {
                let raw = take_value(flag, iter)?;
                opts.port = Some(raw.parse().map_err(|_| {
                    Error::InvalidArgs("port must be an integer between 1 and 65535".to_string())
                })?);
            }
            "--config" => {
                opts.config_path = Some(take_value(flag, iter)?);
            }
            "--poll-ms" => {
                let raw = take_value(flag, iter)?;
                opts.poll_interval_ms = Some(raw.parse().map_err(|_| {
                    Error::InvalidArgs("poll-ms must be a positive integer".to_string())
                })?);
            }
            "--log-level" => {
                opts.log_level = Some(take_value(flag, iter)?);
            }
            "--log-file" => {
                opts.log_file = Some(take_value(flag, iter)?);
            }
            "--once" => {
                opts.once = true;
            }
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown flag '{other}', try --help"
                )));
            }
        }
    }

    Ok(opts)
}

fn take_value(flag: &str, iter: &mut std::slice::Iter<String>) -> Result<String> {
    iter.next()
        .cloned()
        .ok_or_else(|| Error::InvalidArgs(format!("expected a value after {flag}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults_with_no_args() {
        let args: Vec<String> = vec![];
        let cmd = Command::parse(&args).unwrap();
        assert_eq!(cmd, Command::Run(RunOptions::default()));
    }

    #[test]
    fn parse_run_with_overrides() {
        let args = vec![
            "run".into(),
            "--host".into(),
            "192.168.1.166".into(),
            "--port".into(),
            "7126".into(),
            "--config".into(),
            "/tmp/moonlcd.toml".into(),
            "--poll-ms".into(),
            "1500".into(),
            "--log-level".into(),
            "debug".into(),
            "--once".into(),
        ];
        let expected = RunOptions {
            host: Some("192.168.1.166".into()),
            port: Some(7126),
            config_path: Some("/tmp/moonlcd.toml".into()),
            poll_interval_ms: Some(1500),
            log_level: Some("debug".into()),
            log_file: None,
            once: true,
        };
        let cmd = Command::parse(&args).unwrap();
        assert_eq!(cmd, Command::Run(expected));
    }

    #[test]
    fn parse_run_allows_implicit_subcommand() {
        let args = vec!["--host".into(), "printer.local".into()];
        let cmd = Command::parse(&args).unwrap();
        match cmd {
            Command::Run(opts) => {
                assert_eq!(opts.host.as_deref(), Some("printer.local"));
                assert_eq!(opts.port, None);
                assert!(!opts.once);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parse_help_and_version() {
        assert_eq!(
            Command::parse(&["--help".to_string()]).unwrap(),
            Command::ShowHelp
        );
        assert_eq!(
            Command::parse(&["-V".to_string()]).unwrap(),
            Command::ShowVersion
        );
    }

    #[test]
    fn parse_rejects_unknown_flag() {
        let args = vec!["--nope".into()];
        let err = Command::parse(&args).unwrap_err();
        assert!(format!("{err}").contains("unknown flag"));
    }

    #[test]
    fn parse_rejects_out_of_range_port() {
        let args = vec!["--port".into(), "70000".into()];
        let err = Command::parse(&args).unwrap_err();
        assert!(format!("{err}").contains("port must"));
    }

    #[test]
    fn parse_requires_flag_value() {
        let args = vec!["--host".into()];
        let err = Command::parse(&args).unwrap_err();
        assert!(format!("{err}").contains("expected a value after --host"));
    }
}
