//! Screen text for each display mode. Pure string building; no device access.

use super::rotator::DisplayMode;
use crate::printer::PrinterSnapshot;

/// HD44780 ROM A00 code point for the degree sign.
pub const DEGREE: char = '\u{df}';

/// Two display lines, already capped to the display width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub line1: String,
    pub line2: String,
}

impl Screen {
    pub fn new(line1: &str, line2: &str, width: usize) -> Self {
        Self {
            line1: truncate_to_width(line1, width),
            line2: truncate_to_width(line2, width),
        }
    }
}

pub fn render(mode: DisplayMode, snapshot: &PrinterSnapshot, width: usize) -> Screen {
    match mode {
        DisplayMode::Temperatures => temperatures(snapshot, width),
        DisplayMode::PrintInfo => print_info(snapshot, width),
        DisplayMode::FileName => file_name(snapshot, width),
    }
}

fn temperatures(snapshot: &PrinterSnapshot, width: usize) -> Screen {
    let nozzle = format!(
        "N:{}/{}{DEGREE}",
        whole(snapshot.nozzle_temp),
        whole(snapshot.nozzle_target)
    );
    let bed = format!(
        "B:{}/{}{DEGREE}",
        whole(snapshot.bed_temp),
        whole(snapshot.bed_target)
    );
    Screen::new(&nozzle, &bed, width)
}

fn print_info(snapshot: &PrinterSnapshot, width: usize) -> Screen {
    let progress = format!("Prog: {}%", whole(snapshot.print_progress));
    Screen::new(snapshot.print_state.as_str(), &progress, width)
}

fn file_name(snapshot: &PrinterSnapshot, width: usize) -> Screen {
    Screen::new("File:", &snapshot.file_name, width)
}

/// Drop the fractional part; display only.
pub fn whole(value: f64) -> i64 {
    value.trunc() as i64
}

pub fn truncate_to_width(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::PrintState;

    fn snapshot() -> PrinterSnapshot {
        PrinterSnapshot {
            nozzle_temp: 214.9,
            nozzle_target: 215.0,
            bed_temp: 59.99,
            bed_target: 60.0,
            print_progress: 43.7,
            print_state: PrintState::Printing,
            file_name: "benchy".into(),
        }
    }

    #[test]
    fn temperatures_truncate_and_append_degree() {
        let screen = render(DisplayMode::Temperatures, &snapshot(), 16);
        assert_eq!(screen.line1, "N:214/215\u{df}");
        assert_eq!(screen.line2, "B:59/60\u{df}");
    }

    #[test]
    fn print_info_shows_truncated_progress() {
        let screen = render(DisplayMode::PrintInfo, &snapshot(), 16);
        assert_eq!(screen.line1, "Printing");
        assert_eq!(screen.line2, "Prog: 43%");
    }

    #[test]
    fn passthrough_state_is_width_capped() {
        let snap = PrinterSnapshot {
            print_state: PrintState::Passthrough("klippy_disconnected_badly".into()),
            ..snapshot()
        };
        let screen = render(DisplayMode::PrintInfo, &snap, 16);
        assert_eq!(screen.line1, "klippy_disconnec");
        assert_eq!(screen.line1.chars().count(), 16);
    }

    #[test]
    fn file_name_is_width_capped() {
        let snap = PrinterSnapshot {
            file_name: "a_really_long_file_name_v2".into(),
            ..snapshot()
        };
        let screen = render(DisplayMode::FileName, &snap, 16);
        assert_eq!(screen.line1, "File:");
        assert_eq!(screen.line2, "a_really_long_fi");
    }

    #[test]
    fn whole_truncates_toward_zero() {
        assert_eq!(whole(43.7), 43);
        assert_eq!(whole(99.999), 99);
        assert_eq!(whole(-0.5), 0);
    }
}
