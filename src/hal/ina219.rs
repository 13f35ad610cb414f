//! INA219 power monitor driver.
//!
//! One device per monitored rail, at consecutive addresses from 0x40.
//! All accessors take the bus by reference so the single I2C master can be
//! shared across devices.

use super::I2cBus;
use embedded_hal::i2c::ErrorKind;

/// Address of the channel 0 device; channel N lives at `0x40 + N`.
pub const BASE_ADDR: u8 = 0x40;

/// Calibration for a 0.1 ohm shunt: current LSB 0.1 mA, power LSB 2 mW.
const CALIBRATION_VALUE: u16 = 4096;

/// Bounded wait for the conversion-ready flag.
const CONVERSION_RETRIES: u32 = 100;

mod reg {
    pub const CONFIG: u8 = 0x00;
    pub const SHUNT_VOLTAGE: u8 = 0x01;
    pub const BUS_VOLTAGE: u8 = 0x02;
    pub const POWER: u8 = 0x03;
    pub const CURRENT: u8 = 0x04;
    pub const CALIBRATION: u8 = 0x05;
}

mod flags {
    /// Conversion ready, in the bus voltage register.
    pub const CNVR: u16 = 1 << 1;
    /// Math overflow, in the bus voltage register.
    pub const OVF: u16 = 1 << 0;
}

/// Failures talking to a monitor device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    Bus(ErrorKind),
    /// Conversion-ready flag never came up.
    Timeout,
    /// The device flagged its power/current math as overflowed.
    Overflow,
    /// Calibration readback did not match what was written.
    Verify,
}

impl core::fmt::Display for SensorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SensorError::Bus(kind) => write!(f, "bus error: {}", kind),
            SensorError::Timeout => f.write_str("conversion timeout"),
            SensorError::Overflow => f.write_str("math overflow"),
            SensorError::Verify => f.write_str("calibration readback mismatch"),
        }
    }
}

/// Decoded configuration register, for the probe dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config(pub u16);

impl Config {
    pub fn raw(&self) -> u16 {
        self.0
    }

    /// Full-scale bus range in volts.
    pub fn bus_range_v(&self) -> u32 {
        if self.0 & (1 << 13) != 0 { 32 } else { 16 }
    }

    /// Shunt PGA divider: 1, 2, 4 or 8.
    pub fn shunt_gain(&self) -> u32 {
        1 << ((self.0 >> 11) & 0x3)
    }

    /// Bus ADC resolution in bits, or 0 for the sample-averaging modes.
    pub fn bus_adc_bits(&self) -> u32 {
        adc_bits((self.0 >> 7) & 0xf)
    }

    /// Shunt ADC resolution in bits, or 0 for the sample-averaging modes.
    pub fn shunt_adc_bits(&self) -> u32 {
        adc_bits((self.0 >> 3) & 0xf)
    }

    pub fn mode_name(&self) -> &'static str {
        match self.0 & 0x7 {
            0 => "Power-Down",
            1 => "Shunt voltage, triggered",
            2 => "Bus voltage, triggered",
            3 => "Shunt and bus voltage, triggered",
            4 => "ADC off (disabled)",
            5 => "Shunt voltage, continuous",
            6 => "Bus voltage, continuous",
            _ => "Shunt and bus voltage, continuous",
        }
    }
}

fn adc_bits(field: u16) -> u32 {
    match field {
        0 => 9,
        1 => 10,
        2 => 11,
        3 => 12,
        _ => 0,
    }
}

/// One INA219 device.
pub struct Ina219 {
    addr: u8,
}

impl Ina219 {
    pub const fn new(channel: usize) -> Self {
        Self { addr: BASE_ADDR + channel as u8 }
    }

    pub fn address(&self) -> u8 {
        self.addr
    }

    fn read_reg(&self, bus: &mut dyn I2cBus, reg: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        bus.write_read(self.addr, &[reg], &mut buf)
            .map_err(SensorError::Bus)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn write_reg(&self, bus: &mut dyn I2cBus, reg: u8, val: u16) -> Result<(), SensorError> {
        let bytes = val.to_be_bytes();
        bus.write(self.addr, &[reg, bytes[0], bytes[1]])
            .map_err(SensorError::Bus)
    }

    /// Read the configuration register, typically once at probe time.
    pub fn read_config(&self, bus: &mut dyn I2cBus) -> Result<Config, SensorError> {
        self.read_reg(bus, reg::CONFIG).map(Config)
    }

    /// Program the current/power calibration and verify the readback.
    pub fn calibrate(&self, bus: &mut dyn I2cBus) -> Result<(), SensorError> {
        self.write_reg(bus, reg::CALIBRATION, CALIBRATION_VALUE)?;
        if self.read_reg(bus, reg::CALIBRATION)? != CALIBRATION_VALUE {
            return Err(SensorError::Verify);
        }
        Ok(())
    }

    /// Shunt voltage in microvolts.
    pub fn shunt_uv(&self, bus: &mut dyn I2cBus) -> Result<u32, SensorError> {
        Ok(10 * u32::from(self.read_reg(bus, reg::SHUNT_VOLTAGE)?))
    }

    /// Bus voltage in millivolts.
    ///
    /// Waits for the conversion-ready flag so one full sample set is
    /// coherent. The wait is bounded; a flag that never rises is an error
    /// instead of a hung firmware.
    pub fn bus_mv(&self, bus: &mut dyn I2cBus) -> Result<u32, SensorError> {
        for _ in 0..CONVERSION_RETRIES {
            let raw = self.read_reg(bus, reg::BUS_VOLTAGE)?;
            if raw & flags::CNVR != 0 {
                if raw & flags::OVF != 0 {
                    return Err(SensorError::Overflow);
                }
                return Ok(4 * u32::from(raw >> 3));
            }
        }
        Err(SensorError::Timeout)
    }

    /// Power in milliwatts.
    pub fn power_mw(&self, bus: &mut dyn I2cBus) -> Result<u32, SensorError> {
        Ok(2 * u32::from(self.read_reg(bus, reg::POWER)?))
    }

    /// Current in milliamps, rounded to closest.
    pub fn current_ma(&self, bus: &mut dyn I2cBus) -> Result<u32, SensorError> {
        let raw = u32::from(self.read_reg(bus, reg::CURRENT)?);
        Ok((raw + 5) / 10)
    }
}
