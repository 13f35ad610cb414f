//! Shared firmware state.
//!
//! One [`Context`] is built at boot and threaded through every task and
//! command handler. It owns the mutable firmware state (mode, environment,
//! command history, output caches) and borrows the hardware, so handlers
//! never reach for globals.
//!
//! `Context` is also the console output sink: its `core::fmt::Write`
//! implementation normalizes line endings for raw terminals, turning every
//! `\n` and `\r` into `\n\r` on the wire.

use crate::channel::ChannelCaches;
use crate::console::History;
use crate::env::Env;
use crate::hal::{Board, Clock, ConsolePort, I2cBus};

/// Who owns the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMode {
    /// Interactive prompt; commands are read and dispatched.
    Command,
    /// Telemetry reports own the console; only CTRL-C is honored.
    Monitor,
    /// The hardware test cycle owns the console; only CTRL-C is honored.
    Test,
}

pub struct Context<'a> {
    pub clock: &'a mut dyn Clock,
    pub port: &'a mut dyn ConsolePort,
    pub board: &'a mut dyn Board,
    pub i2c: &'a mut dyn I2cBus,
    pub mode: ConsoleMode,
    pub env: Env,
    pub history: History,
    pub cache: ChannelCaches,
}

impl<'a> Context<'a> {
    pub fn new(
        clock: &'a mut dyn Clock,
        port: &'a mut dyn ConsolePort,
        board: &'a mut dyn Board,
        i2c: &'a mut dyn I2cBus,
    ) -> Self {
        Self {
            clock,
            port,
            board,
            i2c,
            mode: ConsoleMode::Command,
            env: Env::new(),
            history: History::new(),
            cache: ChannelCaches::new(),
        }
    }

    fn put_normalized(&mut self, byte: u8) {
        if byte == b'\r' {
            self.port.put_byte(b'\n');
        }
        self.port.put_byte(byte);
        if byte == b'\n' {
            self.port.put_byte(b'\r');
        }
    }

    /// Print the command prompt from the `prompt` environment variable.
    pub fn print_prompt(&mut self) {
        if let Some(p) = self.env.get("prompt") {
            let _ = core::fmt::Write::write_str(self, p.as_str());
        }
    }
}

impl core::fmt::Write for Context<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for &b in s.as_bytes() {
            self.put_normalized(b);
        }
        Ok(())
    }
}
