//! Board configuration: channel counts and firmware tunables.
//!
//! Channel counts describe the control board this firmware drives. Commands
//! and the test cycle derive their ranges from these, so a board variant with
//! more channels only needs new numbers here.

/// Scheduler ticks per second. The tick is one microsecond.
pub const HZ: u32 = 1_000_000;

/// Device-under-test power switches.
pub const NUM_POWER_CH: usize = 2;

/// Open-drain key outputs (active low at the pin).
pub const NUM_KEY_CH: usize = 6;

/// General purpose outputs (active high).
pub const NUM_GPIO_CH: usize = 2;

/// RGB indicator LEDs.
pub const NUM_RGB_CH: usize = 2;

/// Auxiliary UARTs wired to devices under test.
pub const NUM_UART_CH: usize = 2;

/// Power rails monitored by an INA219 each.
pub const NUM_MONITOR_CH: usize = 2;

/// Upper bound on concurrently registered scheduler tasks.
pub const MAX_TASKS: usize = 8;

/// Console bytes drained per pump run before yielding.
pub const MAX_SERIAL_BURST: usize = 64;

/// Console pump period in microseconds.
pub const PUMP_PERIOD_US: u32 = 1_000;

/// Hold time for pulsed key and GPIO outputs, in microseconds.
pub const PULSE_HOLD_US: u32 = 200_000;

/// Baud rate used when the environment does not override it.
pub const DEFAULT_BAUD: u32 = 115_200;
