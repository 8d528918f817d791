use crate::{lcd_driver::I2cBus, Error, Result};

/// Common PCF8574/PCF8574A backpack addresses, most likely first.
pub const CANDIDATE_ADDRS: [u8; 16] = [
    0x27, 0x3f, 0x26, 0x25, 0x24, 0x23, 0x22, 0x21, 0x20, 0x3e, 0x3d, 0x3c, 0x3b, 0x3a, 0x39,
    0x38,
];

#[cfg(target_os = "linux")]
fn map_i2c_err(err: rppal::i2c::Error) -> Error {
    Error::Io(std::io::Error::other(err.to_string()))
}

/// Linux implementation using rppal's I2C (bus 1, `/dev/i2c-1`).
#[cfg(target_os = "linux")]
pub struct RppalBus {
    inner: rppal::i2c::I2c,
}

#[cfg(target_os = "linux")]
impl RppalBus {
    pub fn new_default() -> Result<Self> {
        let inner = rppal::i2c::I2c::new().map_err(map_i2c_err)?;
        Ok(Self { inner })
    }

    /// Probe `candidates` in order; the first address that ACKs wins.
    pub fn detect_address(&mut self, candidates: &[u8], fallback: u8) -> u8 {
        for &addr in candidates {
            if self.inner.set_slave_address(u16::from(addr)).is_ok()
                && self.inner.write(&[0]).is_ok()
            {
                return addr;
            }
        }
        fallback
    }
}

#[cfg(target_os = "linux")]
impl I2cBus for RppalBus {
    fn write_byte(&mut self, addr: u8, byte: u8) -> Result<()> {
        self.inner
            .set_slave_address(u16::from(addr))
            .map_err(map_i2c_err)?;
        self.inner.write(&[byte]).map_err(map_i2c_err)?;
        Ok(())
    }
}

/// Non-Linux stub so the crate builds on dev hosts; fails at runtime.
#[cfg(not(target_os = "linux"))]
pub struct RppalBus;

#[cfg(not(target_os = "linux"))]
impl RppalBus {
    pub fn new_default() -> Result<Self> {
        Err(Error::InvalidArgs(
            "I2C LCD is only available on Linux targets".into(),
        ))
    }

    pub fn detect_address(&mut self, _candidates: &[u8], fallback: u8) -> u8 {
        fallback
    }
}

#[cfg(not(target_os = "linux"))]
impl I2cBus for RppalBus {
    fn write_byte(&mut self, _addr: u8, _byte: u8) -> Result<()> {
        Err(Error::InvalidArgs(
            "I2C LCD is only available on Linux targets".into(),
        ))
    }
}
