use super::TextDisplay;
use crate::{config::Pcf8574Addr, Error, Result};

#[cfg(target_os = "linux")]
use crate::lcd_driver::{self, pcf8574::RppalBus};

/// LCD facade that drives the HD44780 over I2C on Linux and falls back to a
/// recording stub on other platforms.
pub struct Lcd {
    cols: u8,
    rows: u8,
    #[cfg(target_os = "linux")]
    driver: lcd_driver::Hd44780<RppalBus>,
    #[cfg(not(target_os = "linux"))]
    last_lines: (String, String),
}

impl Lcd {
    pub fn new(cols: u8, rows: u8, pcf_addr: Pcf8574Addr) -> Result<Self> {
        #[cfg(target_os = "linux")]
        {
            let mut bus = RppalBus::new_default()?;
            let addr = match pcf_addr {
                Pcf8574Addr::Auto => bus.detect_address(
                    &lcd_driver::pcf8574::CANDIDATE_ADDRS,
                    lcd_driver::DEFAULT_I2C_ADDR,
                ),
                Pcf8574Addr::Addr(a) => a,
            };
            let mut driver = lcd_driver::Hd44780::new(bus, addr, cols, rows)?;
            driver.backlight_on()?;
            Ok(Self { cols, rows, driver })
        }

        #[cfg(not(target_os = "linux"))]
        {
            let _ = pcf_addr;
            Ok(Self {
                cols,
                rows,
                last_lines: (String::new(), String::new()),
            })
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        #[cfg(target_os = "linux")]
        {
            self.driver.clear()
        }
        #[cfg(not(target_os = "linux"))]
        {
            self.last_lines = (String::new(), String::new());
            Ok(())
        }
    }

    pub fn write_line(&mut self, row: u8, content: &str) -> Result<()> {
        if row >= self.rows {
            return Err(Error::InvalidArgs(format!(
                "row {row} out of bounds for display with {} rows",
                self.rows
            )));
        }

        let trimmed = content.chars().take(self.cols as usize).collect::<String>();

        #[cfg(target_os = "linux")]
        {
            self.driver.write_line(row, &trimmed)
        }

        #[cfg(not(target_os = "linux"))]
        {
            if row == 0 {
                self.last_lines.0 = trimmed;
            } else if row == 1 {
                self.last_lines.1 = trimmed;
            }
            Ok(())
        }
    }

    #[cfg(not(target_os = "linux"))]
    pub fn last_lines(&self) -> (String, String) {
        self.last_lines.clone()
    }
}

impl TextDisplay for Lcd {
    fn show_lines(&mut self, line1: &str, line2: &str) -> Result<()> {
        self.clear()?;
        self.write_line(0, line1)?;
        if self.rows > 1 && !line2.is_empty() {
            self.write_line(1, line2)?;
        }
        Ok(())
    }

    fn cols(&self) -> u8 {
        self.cols
    }
}

#[cfg(all(test, not(target_os = "linux")))]
mod tests {
    use super::*;

    #[test]
    fn stub_records_shown_lines() {
        let mut lcd = Lcd::new(16, 2, Pcf8574Addr::Auto).unwrap();
        lcd.show_lines("Klipper Monitor", "Starting...").unwrap();
        assert_eq!(
            lcd.last_lines(),
            ("Klipper Monitor".to_string(), "Starting...".to_string())
        );

        lcd.show_lines("a line that is far too long", "").unwrap();
        assert_eq!(lcd.last_lines(), ("a line that is f".to_string(), String::new()));
        assert!(lcd.write_line(2, "x").is_err());
    }
}
