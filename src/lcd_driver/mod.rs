//! HD44780 character LCD behind a PCF8574 I2C backpack, driven in 4-bit mode.

use std::time::Duration;

use crate::Result;

pub mod pcf8574;

/// Minimal trait to allow swapping the I2C backend (for tests or rppal).
pub trait I2cBus {
    fn write_byte(&mut self, addr: u8, byte: u8) -> Result<()>;
}

/// HD44780 driver that targets a PCF8574 backpack in 4-bit mode.
pub struct Hd44780<B: I2cBus> {
    bus: B,
    addr: u8,
    cols: u8,
    rows: u8,
}

// PCF8574 pin mapping: P0=RS, P1=RW, P2=E, P3=backlight, P4..P7=D4..D7.
const MASK_RS: u8 = 0x01;
const MASK_E: u8 = 0x04;
const MASK_BACKLIGHT: u8 = 0x08;
const SHIFT_DATA: u8 = 4;

const LCD_CLR: u8 = 0x01;
const LCD_HOME: u8 = 0x02;
const LCD_ENTRY_MODE: u8 = 0x04;
const LCD_ENTRY_INC: u8 = 0x02;
const LCD_ON_CTRL: u8 = 0x08;
const LCD_ON_DISPLAY: u8 = 0x04;
const LCD_FUNCTION: u8 = 0x20;
const LCD_FUNCTION_2LINES: u8 = 0x08;
const LCD_FUNCTION_RESET: u8 = 0x30;
const LCD_DDRAM: u8 = 0x80;

/// Glyph written for characters outside the single-byte ROM range.
const UNMAPPED: u8 = b'?';

pub const DEFAULT_I2C_ADDR: u8 = 0x27;

impl<B: I2cBus> Hd44780<B> {
    /// Create and initialize the display. Backlight starts on.
    pub fn new(bus: B, addr: u8, cols: u8, rows: u8) -> Result<Self> {
        let mut driver = Hd44780 {
            bus,
            addr,
            cols: cols.min(40),
            rows: rows.clamp(1, 4),
        };

        driver.bus.write_byte(driver.addr, 0)?;
        sleep_ms(20);
        // Reset: three 8-bit function nibbles, then switch to 4-bit.
        driver.write_init_nibble(LCD_FUNCTION_RESET)?;
        sleep_ms(5);
        driver.write_init_nibble(LCD_FUNCTION_RESET)?;
        sleep_ms(1);
        driver.write_init_nibble(LCD_FUNCTION_RESET)?;
        sleep_ms(1);
        driver.write_init_nibble(LCD_FUNCTION)?;
        sleep_ms(1);

        let mut cmd = LCD_FUNCTION;
        if driver.rows > 1 {
            cmd |= LCD_FUNCTION_2LINES;
        }
        driver.write_command(cmd)?;
        driver.write_command(LCD_ON_CTRL)?;
        driver.clear()?;
        driver.write_command(LCD_ENTRY_MODE | LCD_ENTRY_INC)?;
        driver.write_command(LCD_ON_CTRL | LCD_ON_DISPLAY)?;
        Ok(driver)
    }

    /// Clear display and home cursor.
    pub fn clear(&mut self) -> Result<()> {
        self.write_command(LCD_CLR)?;
        self.write_command(LCD_HOME)
    }

    pub fn backlight_on(&mut self) -> Result<()> {
        self.bus.write_byte(self.addr, MASK_BACKLIGHT)
    }

    /// Write `text` at column 0 of `row`, clipped to the column count.
    pub fn write_line(&mut self, row: u8, text: &str) -> Result<()> {
        self.move_to(0, row)?;
        for ch in text.chars().take(self.cols as usize) {
            self.write_data(rom_byte(ch))?;
        }
        Ok(())
    }

    pub fn move_to(&mut self, col: u8, row: u8) -> Result<()> {
        let row = row % self.rows;
        let mut addr = col & 0x3f;
        if row & 1 == 1 {
            addr += 0x40;
        }
        if row & 2 == 2 {
            addr += self.cols;
        }
        self.write_command(LCD_DDRAM | addr)
    }

    fn write_init_nibble(&mut self, nibble: u8) -> Result<()> {
        let byte = ((nibble >> 4) & 0x0f) << SHIFT_DATA;
        self.bus.write_byte(self.addr, byte | MASK_E)?;
        self.bus.write_byte(self.addr, byte)
    }

    fn write_command(&mut self, cmd: u8) -> Result<()> {
        self.write_nibble(cmd, false)?;
        self.write_nibble(cmd << 4, false)?;
        if cmd <= 3 {
            // HOME/CLEAR need extra delay.
            sleep_ms(5);
        }
        Ok(())
    }

    fn write_data(&mut self, data: u8) -> Result<()> {
        self.write_nibble(data, true)?;
        self.write_nibble(data << 4, true)
    }

    fn write_nibble(&mut self, nibble: u8, is_data: bool) -> Result<()> {
        let mut byte = MASK_BACKLIGHT;
        if is_data {
            byte |= MASK_RS;
        }
        byte |= (nibble >> 4) << SHIFT_DATA;

        self.bus.write_byte(self.addr, byte | MASK_E)?;
        self.bus.write_byte(self.addr, byte)
    }
}

/// Map a char to the controller's single-byte character ROM.
fn rom_byte(ch: char) -> u8 {
    u8::try_from(u32::from(ch)).unwrap_or(UNMAPPED)
}

fn sleep_ms(ms: u64) {
    std::thread::sleep(Duration::from_millis(ms));
}
