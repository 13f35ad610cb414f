//! Heartbeat LED blinker, which doubles as the driver for the board
//! feature test cycle while the console is in Test mode.

use core::fmt::Write;

use crate::channel::{channel_digit, channel_letter};
use crate::config::{NUM_GPIO_CH, NUM_KEY_CH, NUM_POWER_CH, NUM_RGB_CH, NUM_UART_CH};
use crate::context::{ConsoleMode, Context};
use crate::sched::{Task, TaskError};
use crate::util::FmtBuf;

/// Walks the board outputs one step per invocation: RGB components,
/// keys, power channels, GPIOs, then the downstream UARTs. Each step
/// asserts one output and deasserts whatever the previous step left on.
struct TestCycle {
    step: u32,
    hello_cnt: u32,
}

impl TestCycle {
    const fn new() -> Self {
        Self {
            step: 0,
            hello_cnt: 0,
        }
    }

    fn advance(&mut self, cx: &mut Context<'_>) {
        const COMPONENTS: [&str; 3] = ["red", "green", "blue"];

        let mut ch = self.step as usize;
        self.step += 1;

        if ch < NUM_RGB_CH * 3 {
            let i = ch % 3;
            ch /= 3;
            let _ = writeln!(cx, "RGB channel {}: {}", channel_letter(ch), COMPONENTS[i]);
            if ch > 0 {
                cx.board.set_rgb(ch - 1, 0);
            }
            cx.board.set_rgb(ch, 0xffu32 << ((2 - i) * 8));
            return;
        }

        ch -= NUM_RGB_CH * 3;
        if ch < NUM_KEY_CH {
            if ch == 0 {
                cx.board.set_rgb(NUM_RGB_CH - 1, 0);
            } else {
                cx.board.set_key(ch - 1, true);
            }
            let _ = writeln!(cx, "Pulsing key {}", channel_digit(ch));
            cx.board.set_key(ch, false);
            return;
        }

        ch -= NUM_KEY_CH;
        if ch < NUM_POWER_CH {
            if ch == 0 {
                cx.board.set_key(NUM_KEY_CH - 1, true);
            } else {
                cx.board.set_power(ch - 1, false);
            }
            let _ = writeln!(cx, "Powering channel {}", channel_letter(ch));
            cx.board.set_power(ch, true);
            return;
        }

        ch -= NUM_POWER_CH;
        if ch < NUM_GPIO_CH {
            if ch == 0 {
                cx.board.set_power(NUM_POWER_CH - 1, false);
            } else {
                cx.board.set_gpio(ch - 1, false);
            }
            let _ = writeln!(cx, "Pulsing GPIO {}", channel_digit(ch));
            cx.board.set_gpio(ch, true);
            return;
        }

        ch -= NUM_GPIO_CH;
        if ch < NUM_UART_CH {
            if ch == 0 {
                cx.board.set_gpio(NUM_GPIO_CH - 1, false);
            }
            let _ = writeln!(cx, "Saying hello to UART channel {}", channel_letter(ch));
            let mut msg = FmtBuf::<32>::new();
            let _ = writeln!(msg, "Hello {} {}", channel_letter(ch), self.hello_cnt);
            self.hello_cnt += 1;
            cx.board.write_aux_uart(ch, msg.as_bytes());
            return;
        }

        // One idle tick between cycles.
        self.step = 0;
    }
}

/// Ten invocations per second: a double blink on the heartbeat LED,
/// with the test cycle advancing on tick zero.
pub struct HeartbeatTask {
    phase: u32,
    cycle: TestCycle,
}

impl HeartbeatTask {
    pub const fn new() -> Self {
        Self {
            phase: 0,
            cycle: TestCycle::new(),
        }
    }
}

impl Default for HeartbeatTask {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for HeartbeatTask {
    fn run(&mut self, cx: &mut Context<'_>) -> Result<(), TaskError> {
        match self.phase % 10 {
            0 => {
                if cx.mode == ConsoleMode::Test {
                    self.cycle.advance(cx);
                }
            }
            1 | 4 => cx.board.set_heartbeat_led(true),
            2 | 6 => cx.board.set_heartbeat_led(false),
            _ => {}
        }
        self.phase = self.phase.wrapping_add(1);
        Ok(())
    }
}
