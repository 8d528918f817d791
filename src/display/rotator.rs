use std::time::{Duration, Instant};

/// Screens shown in rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    Temperatures,
    PrintInfo,
    FileName,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 3] = [
        DisplayMode::Temperatures,
        DisplayMode::PrintInfo,
        DisplayMode::FileName,
    ];

    pub fn index(self) -> usize {
        match self {
            DisplayMode::Temperatures => 0,
            DisplayMode::PrintInfo => 1,
            DisplayMode::FileName => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            DisplayMode::Temperatures => DisplayMode::PrintInfo,
            DisplayMode::PrintInfo => DisplayMode::FileName,
            DisplayMode::FileName => DisplayMode::Temperatures,
        }
    }
}

/// Advances the active screen on its own timer, independent of polling.
#[derive(Debug, Clone)]
pub struct DisplayRotator {
    mode: DisplayMode,
    last_change: Instant,
    duration: Duration,
}

impl DisplayRotator {
    pub fn new(duration: Duration, now: Instant) -> Self {
        Self {
            mode: DisplayMode::Temperatures,
            last_change: now,
            duration,
        }
    }

    pub fn current_mode(&self) -> DisplayMode {
        self.mode
    }

    /// Step to the next screen once `duration` has elapsed. Returns true on change.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_change) < self.duration {
            return false;
        }
        self.mode = self.mode.next();
        self.last_change = now;
        true
    }

    /// Back to the first screen with a fresh timer.
    pub fn restart(&mut self, now: Instant) {
        self.mode = DisplayMode::Temperatures;
        self.last_change = now;
    }
}
