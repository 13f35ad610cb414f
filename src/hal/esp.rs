//! ESP-IDF implementations of the board traits.
//!
//! Pin and UART drivers are built by the binary at startup and handed
//! in; this module only adapts them to the trait surface the core runs
//! against.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyOutputPin, Level, Output, PinDriver};
use esp_idf_svc::hal::i2c::I2cDriver;
use esp_idf_svc::hal::uart::{UartDriver, UartTxDriver};
use esp_idf_svc::sys as esp_idf_sys;

use super::{Board, Clock, ConsolePort, I2cBus};
use crate::config::{NUM_GPIO_CH, NUM_KEY_CH, NUM_POWER_CH, NUM_RGB_CH, NUM_UART_CH};

type OutPin<'d> = PinDriver<'d, AnyOutputPin, Output>;

pub struct EspClock;

impl Clock for EspClock {
    fn now_us(&self) -> u32 {
        unsafe { esp_idf_sys::esp_timer_get_time() as u32 }
    }

    fn delay_us(&mut self, us: u32) {
        // Yield whole milliseconds to FreeRTOS, busy-wait the rest.
        if us >= 1000 {
            FreeRtos::delay_ms(us / 1000);
        }
        Ets::delay_us(us % 1000);
    }
}

/// Console on a bidirectional UART, polled without blocking.
pub struct EspConsolePort<'d> {
    uart: UartDriver<'d>,
}

impl<'d> EspConsolePort<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl ConsolePort for EspConsolePort<'_> {
    fn poll_byte(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.uart.read(&mut buf, 0) {
            Ok(1) => Some(buf[0]),
            _ => None,
        }
    }

    fn put_byte(&mut self, byte: u8) {
        let _ = self.uart.write(&[byte]);
    }
}

/// Serial number derived from the factory MAC address.
pub fn serial_from_mac() -> u32 {
    let mut mac = [0u8; 6];
    unsafe {
        esp_idf_sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    u32::from_be_bytes([mac[2], mac[3], mac[4], mac[5]])
}

pub struct EspBoard<'d> {
    heartbeat: OutPin<'d>,
    power: [OutPin<'d>; NUM_POWER_CH],
    key: [OutPin<'d>; NUM_KEY_CH],
    gpio: [OutPin<'d>; NUM_GPIO_CH],
    rgb: [OutPin<'d>; NUM_RGB_CH * 3],
    aux_uart: [UartTxDriver<'d>; NUM_UART_CH],
    serial: u32,
}

impl<'d> EspBoard<'d> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        heartbeat: OutPin<'d>,
        power: [OutPin<'d>; NUM_POWER_CH],
        key: [OutPin<'d>; NUM_KEY_CH],
        gpio: [OutPin<'d>; NUM_GPIO_CH],
        rgb: [OutPin<'d>; NUM_RGB_CH * 3],
        aux_uart: [UartTxDriver<'d>; NUM_UART_CH],
    ) -> Self {
        Self {
            heartbeat,
            power,
            key,
            gpio,
            rgb,
            aux_uart,
            serial: serial_from_mac(),
        }
    }
}

impl Board for EspBoard<'_> {
    fn set_heartbeat_led(&mut self, on: bool) {
        let _ = self.heartbeat.set_level(Level::from(on));
    }

    fn set_power(&mut self, ch: usize, on: bool) {
        if let Some(pin) = self.power.get_mut(ch) {
            let _ = pin.set_level(Level::from(on));
        }
    }

    fn set_key(&mut self, ch: usize, level: bool) {
        if let Some(pin) = self.key.get_mut(ch) {
            let _ = pin.set_level(Level::from(level));
        }
    }

    fn set_gpio(&mut self, ch: usize, on: bool) {
        if let Some(pin) = self.gpio.get_mut(ch) {
            let _ = pin.set_level(Level::from(on));
        }
    }

    fn set_rgb(&mut self, ch: usize, rgb: u32) {
        // On/off per component for now.
        // TODO drive the RGB pins through LEDC for real 8-bit intensity
        for i in 0..3 {
            let component = (rgb >> ((2 - i) * 8)) & 0xff;
            if let Some(pin) = self.rgb.get_mut(ch * 3 + i) {
                let _ = pin.set_level(Level::from(component >= 0x80));
            }
        }
    }

    fn write_aux_uart(&mut self, ch: usize, bytes: &[u8]) {
        if let Some(uart) = self.aux_uart.get_mut(ch) {
            let _ = uart.write(bytes);
        }
    }

    fn serial_number(&self) -> u32 {
        self.serial
    }
}

pub struct EspI2cBus<'d> {
    driver: I2cDriver<'d>,
}

impl<'d> EspI2cBus<'d> {
    pub fn new(driver: I2cDriver<'d>) -> Self {
        Self { driver }
    }
}

impl I2cBus for EspI2cBus<'_> {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), ErrorKind> {
        I2c::write(&mut self.driver, addr, bytes).map_err(|e| e.kind())
    }

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), ErrorKind> {
        I2c::read(&mut self.driver, addr, buf).map_err(|e| e.kind())
    }

    fn write_read(&mut self, addr: u8, bytes: &[u8], buf: &mut [u8]) -> Result<(), ErrorKind> {
        I2c::write_read(&mut self.driver, addr, bytes, buf).map_err(|e| e.kind())
    }
}
