//! Serial console: line editing, history and command dispatch.
//!
//! Zero heap allocation, all fixed buffers. A byte-pump task drains
//! pending input each period and feeds it to the line editor.

pub mod commands;
pub mod editor;
pub mod error;
pub mod history;
pub mod line_buffer;
pub mod parser;

pub use editor::LineEditor;
pub use error::CmdError;
pub use history::History;
pub use line_buffer::LineBuffer;

use core::fmt::Write;

use crate::config::MAX_SERIAL_BURST;
use crate::context::Context;
use crate::sched::{Task, TaskError};

/// Software version, baked in at build time.
pub const VERSION: &str = env!("VERSION_STRING");

/// Boot greeting plus the first prompt.
pub fn print_banner(cx: &mut Context<'_>) {
    let _ = writeln!(cx, "bcu {}", VERSION);
    let _ = writeln!(cx, "Type 'help' for commands.");
    cx.print_prompt();
}

/// Polls the console port and feeds the line editor, bounded per
/// invocation so the other tasks keep their deadlines.
pub struct ConsoleTask {
    editor: LineEditor,
}

impl ConsoleTask {
    pub const fn new() -> Self {
        Self {
            editor: LineEditor::new(),
        }
    }
}

impl Default for ConsoleTask {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for ConsoleTask {
    fn run(&mut self, cx: &mut Context<'_>) -> Result<(), TaskError> {
        for _ in 0..MAX_SERIAL_BURST {
            let Some(byte) = cx.port.poll_byte() else {
                break;
            };
            self.editor.feed(byte, cx);
        }
        Ok(())
    }
}
