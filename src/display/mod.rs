pub mod lcd;
pub mod render;
pub mod rotator;

pub use render::{render, Screen};
pub use rotator::{DisplayMode, DisplayRotator};

use crate::Result;

/// Fixed-width two-line text output.
pub trait TextDisplay {
    /// Clear the display, then write both lines starting at column 0.
    fn show_lines(&mut self, line1: &str, line2: &str) -> Result<()>;

    fn cols(&self) -> u8;
}
