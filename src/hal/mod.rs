//! Hardware abstraction layer.
//!
//! Thin traits over the board peripherals. Core modules only ever see
//! these; the ESP-IDF implementations live in [`esp`] and the tests bring
//! their own fakes. Business logic stays out of here.

pub mod ina219;

#[cfg(target_os = "espidf")]
pub mod esp;

pub use ina219::{Ina219, SensorError};

use embedded_hal::i2c::ErrorKind;

/// Monotonic microsecond time source.
pub trait Clock {
    /// Current timestamp. Wraps around; compare with wrapping math only.
    fn now_us(&self) -> u32;

    /// Wait at least `us` microseconds.
    fn delay_us(&mut self, us: u32);
}

/// The operator-facing serial console.
pub trait ConsolePort {
    /// Fetch one pending input byte, if any. Never blocks.
    fn poll_byte(&mut self) -> Option<u8>;

    /// Emit one byte.
    fn put_byte(&mut self, byte: u8);
}

/// Discrete outputs and auxiliary ports of the control board.
pub trait Board {
    fn set_heartbeat_led(&mut self, on: bool);

    fn set_power(&mut self, ch: usize, on: bool);

    /// Raw pin level. Key outputs are wired active low; callers own the
    /// inversion.
    fn set_key(&mut self, ch: usize, level: bool);

    fn set_gpio(&mut self, ch: usize, on: bool);

    /// 24-bit color, 0xRRGGBB.
    fn set_rgb(&mut self, ch: usize, rgb: u32);

    fn write_aux_uart(&mut self, ch: usize, bytes: &[u8]);

    fn serial_number(&self) -> u32;
}

/// Shared I2C bus with 7-bit addressing.
pub trait I2cBus {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), ErrorKind>;

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), ErrorKind>;

    /// Write then read in one transaction with a repeated start.
    fn write_read(&mut self, addr: u8, bytes: &[u8], buf: &mut [u8]) -> Result<(), ErrorKind>;
}
