//! Power telemetry: periodic INA219 sampling with load-average style
//! exponential smoothing, reported while the console is in Monitor mode.

use core::fmt::Write;

use crate::channel::channel_letter;
use crate::config::NUM_MONITOR_CH;
use crate::context::{ConsoleMode, Context};
use crate::hal::ina219::Config;
use crate::hal::{I2cBus, Ina219, SensorError};
use crate::sched::{Task, TaskError};
use crate::{pr_debug, pr_err, pr_info};

const FSHIFT: u32 = 11; // fixed-point fraction bits
const FIXED_1: u32 = 1 << FSHIFT;
const EXP_1: u32 = 1884; // 1/exp(5s/1min) as fixed-point
const EXP_5: u32 = 2014; // 1/exp(5s/5min)
const EXP_15: u32 = 2037; // 1/exp(5s/15min)

/// Sampling rounds between repeated report headers.
const HEADER_EVERY: u32 = 20;

fn calc_load(avg: u32, exp: u32, val: u32) -> u32 {
    let wide = u64::from(avg) * u64::from(exp) + u64::from(val) * u64::from(FIXED_1 - exp);
    (wide >> FSHIFT) as u32
}

/// One measured quantity with its 1, 5 and 15 minute averages.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvgSet {
    pub current: Option<u32>,
    pub avg1: u32,
    pub avg5: u32,
    pub avg15: u32,
}

impl AvgSet {
    /// Fold in one sample. The first sample seeds all three averages so
    /// they do not have to climb up from zero.
    pub fn update(&mut self, val: u32) {
        if self.current.is_none() {
            self.current = Some(val);
            self.avg1 = val;
            self.avg5 = val;
            self.avg15 = val;
            return;
        }
        self.current = Some(val);
        self.avg1 = calc_load(self.avg1, EXP_1, val);
        self.avg5 = calc_load(self.avg5, EXP_5, val);
        self.avg15 = calc_load(self.avg15, EXP_15, val);
    }
}

struct MonitorChannel {
    sensor: Ina219,
    vbus: AvgSet,
    vshunt: AvgSet,
    power: AvgSet,
    current: AvgSet,
}

impl MonitorChannel {
    fn new(ch: usize) -> Self {
        Self {
            sensor: Ina219::new(ch),
            vbus: AvgSet::default(),
            vshunt: AvgSet::default(),
            power: AvgSet::default(),
            current: AvgSet::default(),
        }
    }

    fn init(&mut self, cx: &mut Context<'_>, ref_config: &mut Option<Config>) -> Result<(), SensorError> {
        let cfg = self.sensor.read_config(cx.i2c)?;
        match *ref_config {
            None => {
                *ref_config = Some(cfg);
                dump_config(cx, cfg);
            }
            Some(reference) if reference != cfg => {
                pr_err!(
                    cx,
                    "INA219_CFG mismatch: ch0 {:#x} ch1 {:#x}",
                    reference.raw(),
                    cfg.raw()
                );
                dump_config(cx, cfg);
            }
            Some(_) => {}
        }
        self.sensor.calibrate(cx.i2c)
    }

    /// One sampling round. A failed read skips the rest of the round so
    /// the averages stay aligned.
    fn sample(&mut self, i2c: &mut dyn I2cBus) -> Result<(), SensorError> {
        self.vbus.update(self.sensor.bus_mv(i2c)?);
        self.vshunt.update(self.sensor.shunt_uv(i2c)?);
        self.power.update(self.sensor.power_mw(i2c)?);
        self.current.update(self.sensor.current_ma(i2c)?);
        Ok(())
    }

    fn print_row(&self, cx: &mut Context<'_>, ch: usize) {
        let vbus = self.vbus.current.unwrap_or(0);
        let vshunt = self.vshunt.current.unwrap_or(0);
        let power = self.power.current.unwrap_or(0);
        let current = self.current.current.unwrap_or(0);
        let _ = writeln!(
            cx,
            "{}: {:5} mV  {:3}.{:02} mV  {:5} mW ({:5} {:5} {:5})  {:4} mA ({:4} {:4} {:4})",
            channel_letter(ch),
            vbus,
            vshunt / 1000,
            vshunt % 1000 / 10,
            power,
            self.power.avg1,
            self.power.avg5,
            self.power.avg15,
            current,
            self.current.avg1,
            self.current.avg5,
            self.current.avg15,
        );
    }
}

fn dump_config(cx: &mut Context<'_>, cfg: Config) {
    pr_info!(cx, "INA219_CFG           = {:#x}", cfg.raw());
    pr_info!(cx, "Bus Voltage Range    = {:2}", cfg.bus_range_v());
    pr_info!(cx, "Shunt Voltage Gain   = {:2}", cfg.shunt_gain());
    pr_info!(cx, "Bus ADC resolution   = {:2}", cfg.bus_adc_bits());
    pr_info!(cx, "Shunt ADC resolution = {:2}", cfg.shunt_adc_bits());
    pr_info!(cx, "Operating mode       = {}", cfg.mode_name());
}

/// Samples the power monitors once per period and prints the report
/// while in Monitor mode.
pub struct MonitorTask {
    channels: [MonitorChannel; NUM_MONITOR_CH],
    probed: u8,
    rounds: u32,
}

impl MonitorTask {
    pub fn new() -> Self {
        Self {
            channels: core::array::from_fn(MonitorChannel::new),
            probed: 0,
            rounds: 0,
        }
    }

    /// Probe and calibrate the sensors. The first channel that answers
    /// provides the reference configuration the others are checked
    /// against. Returns false when no sensor responded, in which case
    /// there is nothing worth scheduling.
    pub fn probe(&mut self, cx: &mut Context<'_>) -> bool {
        let mut ref_config: Option<Config> = None;
        for ch in 0..NUM_MONITOR_CH {
            match self.channels[ch].init(cx, &mut ref_config) {
                Ok(()) => self.probed |= 1 << ch,
                Err(e) => {
                    pr_err!(cx, "Initialization of INA219-{} failed: {}", ch, e);
                }
            }
        }
        self.probed != 0
    }

    pub fn probed(&self, ch: usize) -> bool {
        self.probed & (1 << ch) != 0
    }
}

impl Default for MonitorTask {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for MonitorTask {
    fn run(&mut self, cx: &mut Context<'_>) -> Result<(), TaskError> {
        for ch in 0..NUM_MONITOR_CH {
            if !self.probed(ch) {
                continue;
            }
            match self.channels[ch].sample(cx.i2c) {
                Ok(()) => {}
                Err(SensorError::Overflow) => pr_err!(cx, "INA219 Math Overflow!"),
                Err(e) => pr_debug!(cx, "INA219-{} sample failed: {}", ch, e),
            }
        }

        if cx.mode != ConsoleMode::Monitor {
            return Ok(());
        }

        if self.rounds % HEADER_EVERY == 0 {
            let _ = writeln!(cx, "     Vbus      Vshunt     Power                         Current");
            let _ = writeln!(
                cx,
                "   --------  ---------  ----------------------------  ------------------------"
            );
        }
        self.rounds = self.rounds.wrapping_add(1);

        for ch in 0..NUM_MONITOR_CH {
            if self.probed(ch) {
                self.channels[ch].print_row(cx, ch);
            }
        }
        Ok(())
    }
}
