//! # bcu
//!
//! Firmware core of a board farm control unit: a cooperative deadline
//! scheduler drives a VT100 line editor, command dispatch, channel
//! control and power telemetry over a single serial console.
//!
//! Everything runs on one logical thread. Shared state lives in a
//! [`Context`] handed to each task action, so there are no statics and
//! no locks; correctness rests on every action returning promptly.

#![cfg_attr(not(test), no_std)]

pub mod channel;
pub mod config;
pub mod console;
pub mod context;
pub mod env;
pub mod hal;
pub mod heartbeat;
pub mod logging;
pub mod sched;
pub mod telemetry;
pub mod util;

pub use channel::ChannelCaches;
pub use console::{ConsoleTask, LineEditor, VERSION};
pub use context::{ConsoleMode, Context};
pub use env::Env;
pub use heartbeat::HeartbeatTask;
pub use sched::{SchedError, Scheduler, Task, TaskError};
pub use telemetry::MonitorTask;
