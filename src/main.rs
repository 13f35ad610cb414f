//! Firmware entry point: builds the board drivers, wires up the shared
//! context and hands control to the scheduler.

#![cfg_attr(target_os = "espidf", no_std)]
#![cfg_attr(target_os = "espidf", no_main)]

#[cfg(target_os = "espidf")]
mod firmware {
    use esp_idf_svc::hal::gpio::{AnyIOPin, OutputPin, PinDriver};
    use esp_idf_svc::hal::i2c::{config::Config as I2cConfig, I2cDriver};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{config::Config as UartConfig, UartDriver, UartTxDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::sys as esp_idf_sys;
    use esp_idf_svc::sys::EspError;

    use rust_farm_bcu::channel;
    use rust_farm_bcu::config::{DEFAULT_BAUD, HZ, PUMP_PERIOD_US};
    use rust_farm_bcu::console;
    use rust_farm_bcu::env::Env;
    use rust_farm_bcu::hal::esp::{EspBoard, EspClock, EspConsolePort, EspI2cBus};
    use rust_farm_bcu::{ConsoleTask, Context, HeartbeatTask, MonitorTask, SchedError, Scheduler};

    #[allow(dead_code)]
    enum InitError {
        Esp(EspError),
        Sched(SchedError),
    }

    impl From<EspError> for InitError {
        fn from(e: EspError) -> Self {
            Self::Esp(e)
        }
    }

    impl From<SchedError> for InitError {
        fn from(e: SchedError) -> Self {
            Self::Sched(e)
        }
    }

    #[no_mangle]
    fn main() {
        esp_idf_sys::link_patches();

        // Failures land here with no working console to report them to.
        let _ = run();
        loop {
            unsafe {
                esp_idf_sys::vTaskDelay(1000);
            }
        }
    }

    fn run() -> Result<(), InitError> {
        let p = Peripherals::take()?;

        let console_uart = UartDriver::new(
            p.uart0,
            p.pins.gpio43,
            p.pins.gpio44,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &UartConfig::default().baudrate(Hertz(DEFAULT_BAUD)),
        )?;

        // Downstream UART baud rates come from the environment defaults.
        let env = Env::new();
        let uart_a = UartTxDriver::new(
            p.uart1,
            p.pins.gpio17,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &UartConfig::default().baudrate(Hertz(env.baud("baudA"))),
        )?;
        let uart_b = UartTxDriver::new(
            p.uart2,
            p.pins.gpio18,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &UartConfig::default().baudrate(Hertz(env.baud("baudB"))),
        )?;

        let i2c = I2cDriver::new(
            p.i2c0,
            p.pins.gpio8,
            p.pins.gpio9,
            &I2cConfig::new().baudrate(Hertz(100_000)),
        )?;

        let heartbeat_pin = PinDriver::output(p.pins.gpio2.downgrade_output())?;
        let power = [
            PinDriver::output(p.pins.gpio4.downgrade_output())?,
            PinDriver::output(p.pins.gpio5.downgrade_output())?,
        ];
        let key = [
            PinDriver::output(p.pins.gpio6.downgrade_output())?,
            PinDriver::output(p.pins.gpio7.downgrade_output())?,
            PinDriver::output(p.pins.gpio10.downgrade_output())?,
            PinDriver::output(p.pins.gpio11.downgrade_output())?,
            PinDriver::output(p.pins.gpio12.downgrade_output())?,
            PinDriver::output(p.pins.gpio13.downgrade_output())?,
        ];
        let gpio = [
            PinDriver::output(p.pins.gpio14.downgrade_output())?,
            PinDriver::output(p.pins.gpio21.downgrade_output())?,
        ];
        let rgb = [
            PinDriver::output(p.pins.gpio35.downgrade_output())?,
            PinDriver::output(p.pins.gpio36.downgrade_output())?,
            PinDriver::output(p.pins.gpio37.downgrade_output())?,
            PinDriver::output(p.pins.gpio38.downgrade_output())?,
            PinDriver::output(p.pins.gpio39.downgrade_output())?,
            PinDriver::output(p.pins.gpio40.downgrade_output())?,
        ];

        let mut clock = EspClock;
        let mut port = EspConsolePort::new(console_uart);
        let mut board = EspBoard::new(heartbeat_pin, power, key, gpio, rgb, [uart_a, uart_b]);
        let mut i2c_bus = EspI2cBus::new(i2c);

        let mut cx = Context::new(&mut clock, &mut port, &mut board, &mut i2c_bus);
        channel::init_outputs(&mut cx);

        let mut heartbeat_task = HeartbeatTask::new();
        let mut monitor_task = MonitorTask::new();
        let mut console_task = ConsoleTask::new();
        let mut sched = Scheduler::new();

        sched.register(&mut cx, "heartbeat", HZ / 10, &mut heartbeat_task)?;
        if monitor_task.probe(&mut cx) {
            sched.register(&mut cx, "measure", HZ, &mut monitor_task)?;
        }

        console::print_banner(&mut cx);
        // Registered last, so the console runs first among equal deadlines.
        sched.register(&mut cx, "console", PUMP_PERIOD_US, &mut console_task)?;

        Err(sched.run(&mut cx).into())
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("bcu is firmware; build for an ESP-IDF target to run it on hardware");
}
