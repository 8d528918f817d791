use std::time::{Duration, Instant};

use crc32fast::Hasher;

use super::Logger;
use crate::{
    display::{render, DisplayMode, DisplayRotator, TextDisplay},
    link::Link,
    printer::{HttpTransport, PrintState, PrinterSnapshot, StatusFetcher},
    Error, Result,
};

/// Timing knobs for [`PollLoop`], taken from the merged config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTimings {
    pub poll_interval: Duration,
    pub screen_duration: Duration,
    pub connect_timeout: Duration,
}

/// Owns the snapshot and rotator and drives link, fetcher and display once per tick.
pub struct PollLoop<'a, L: Link, T: HttpTransport, D: TextDisplay> {
    link: L,
    fetcher: StatusFetcher<T>,
    display: D,
    logger: &'a Logger,
    snapshot: PrinterSnapshot,
    rotator: DisplayRotator,
    poll_interval: Duration,
    connect_timeout: Duration,
    last_poll: Option<Instant>,
    last_frame_crc: Option<u32>,
}

impl<'a, L: Link, T: HttpTransport, D: TextDisplay> PollLoop<'a, L, T, D> {
    pub fn new(
        link: L,
        fetcher: StatusFetcher<T>,
        display: D,
        timings: LoopTimings,
        logger: &'a Logger,
        now: Instant,
    ) -> Self {
        Self {
            link,
            fetcher,
            display,
            logger,
            snapshot: PrinterSnapshot::default(),
            rotator: DisplayRotator::new(timings.screen_duration, now),
            poll_interval: timings.poll_interval,
            connect_timeout: timings.connect_timeout,
            last_poll: None,
            last_frame_crc: None,
        }
    }

    /// Bring the link up before the first poll. Failure here is fatal.
    pub fn initial_connect(&mut self) -> Result<()> {
        if self.connect_link()? {
            return Ok(());
        }
        self.present("setup failed", "check network")?;
        Err(Error::LinkDown(format!(
            "could not reach {} within {} ms",
            self.link.label(),
            self.connect_timeout.as_millis()
        )))
    }

    /// One pass of the daemon loop: rotate, poll when due, then render.
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        if self.rotator.tick(now) {
            self.logger
                .trace(format!("screen -> {:?}", self.rotator.current_mode()));
        }

        if self.poll_due(now) {
            self.last_poll = Some(now);
            self.poll()?;
        }

        if self.link.is_connected() && !self.snapshot.print_state.is_fetch_error() {
            let width = usize::from(self.display.cols());
            let screen = render(self.rotator.current_mode(), &self.snapshot, width);
            self.present(&screen.line1, &screen.line2)?;
        }
        Ok(())
    }

    /// Start screen rotation from `now`; the first screen gets its full duration.
    pub fn restart_rotation(&mut self, now: Instant) {
        self.rotator.restart(now);
    }

    pub fn snapshot(&self) -> &PrinterSnapshot {
        &self.snapshot
    }

    pub fn mode(&self) -> DisplayMode {
        self.rotator.current_mode()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    fn poll_due(&self, now: Instant) -> bool {
        match self.last_poll {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= self.poll_interval,
        }
    }

    fn poll(&mut self) -> Result<()> {
        if !self.link.is_connected() {
            self.logger
                .warn(format!("link to {} lost; reconnecting", self.link.label()));
            self.present("Reconnecting...", "")?;
            self.connect_link()?;
            return Ok(());
        }

        let previous = self.snapshot.print_state.clone();
        match self.fetcher.fetch_into(&mut self.snapshot) {
            Ok(()) => {
                self.logger.debug(format!(
                    "poll ok: state={} progress={:.1}",
                    self.snapshot.print_state, self.snapshot.print_progress
                ));
            }
            Err(err) => {
                self.logger.warn(format!("{err} ({})", self.fetcher.url()));
                let state = self.snapshot.print_state.to_string();
                self.present("Fetch Error", &state)?;
            }
        }
        if previous != self.snapshot.print_state {
            log_transition(self.logger, &previous, &self.snapshot.print_state);
        }
        Ok(())
    }

    fn connect_link(&mut self) -> Result<bool> {
        let label = self.link.label().to_string();
        self.logger.info(format!("connecting to {label}"));
        self.present("connecting", &label)?;
        let up = self.link.connect(self.connect_timeout);
        if up {
            self.logger.info(format!("connected to {label}"));
            self.present("connected", "")?;
        } else {
            self.logger.error(format!(
                "connect to {label} failed after {} ms",
                self.connect_timeout.as_millis()
            ));
            self.present("failed", "")?;
        }
        Ok(up)
    }

    /// Push two lines to the display unless they match what is already shown.
    fn present(&mut self, line1: &str, line2: &str) -> Result<()> {
        let crc = frame_crc(line1, line2);
        if self.last_frame_crc == Some(crc) {
            return Ok(());
        }
        self.display.show_lines(line1, line2)?;
        self.last_frame_crc = Some(crc);
        Ok(())
    }
}

fn log_transition(logger: &Logger, from: &PrintState, to: &PrintState) {
    logger.info(format!("printer state {from} -> {to}"));
}

fn frame_crc(line1: &str, line2: &str) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(line1.as_bytes());
    hasher.update(&[0]);
    hasher.update(line2.as_bytes());
    hasher.finalize()
}
