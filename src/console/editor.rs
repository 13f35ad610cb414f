//! VT100 line editor.
//!
//! A byte-at-a-time state machine over the cursor-aware [`LineBuffer`].
//! Echo is minimal: only the part of the line right of an edit is
//! redrawn, and the terminal cursor is walked back with raw backspaces.
//! A full repaint exists only on CTRL-L.
//!
//! CTRL-C is handled ahead of the state machine and in every console
//! mode; everything else is ignored unless the console is in command
//! mode.

use core::fmt::Write;

use super::commands;
use super::LineBuffer;
use crate::context::{ConsoleMode, Context};
use crate::pr_warn;

/// Escape sequence progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorState {
    Normal,
    /// Got ESC.
    Esc,
    /// Got ESC [.
    Csi,
    /// Got a digit-coded CSI function; waiting for the `~` terminator.
    Term,
}

pub struct LineEditor {
    line: LineBuffer,
    state: EditorState,
}

impl LineEditor {
    pub const fn new() -> Self {
        Self {
            line: LineBuffer::new(),
            state: EditorState::Normal,
        }
    }

    /// Feed one input byte.
    pub fn feed(&mut self, byte: u8, cx: &mut Context<'_>) {
        // CTRL-C bypasses the state machine and always reclaims the
        // console for the command prompt.
        if byte == 0x03 {
            self.line.clear();
            self.state = EditorState::Normal;
            cx.history.cancel_browse();
            let _ = writeln!(cx, "^C");
            cx.mode = ConsoleMode::Command;
            cx.print_prompt();
            return;
        }
        // Monitor and test output own the console; their input is dropped.
        if cx.mode != ConsoleMode::Command {
            return;
        }
        match self.state {
            EditorState::Normal => self.on_normal(byte, cx),
            EditorState::Esc => {
                self.state = if byte == b'[' {
                    EditorState::Csi
                } else {
                    EditorState::Normal
                };
            }
            EditorState::Csi => self.on_csi(byte, cx),
            EditorState::Term => {
                if byte != b'~' {
                    pr_warn!(cx, "Unexpected CSI terminator {:#x}", byte);
                }
                self.state = EditorState::Normal;
            }
        }
    }

    fn on_normal(&mut self, byte: u8, cx: &mut Context<'_>) {
        match byte {
            b'\r' | b'\n' => self.submit(cx),
            0x7f | 0x08 => self.kill_left(1, cx),
            // CTRL-W: kill the word left of the cursor.
            0x17 => self.kill_left(self.line.word_span(), cx),
            // CTRL-A / CTRL-E / CTRL-D / CTRL-L.
            0x01 => self.cursor_home(cx),
            0x05 => self.cursor_end(cx),
            0x04 => self.delete_forward(cx),
            0x0c => self.repaint(cx),
            0x1b => self.state = EditorState::Esc,
            b'\t' => self.insert(b' ', cx),
            0x20..=0x7e => self.insert(byte, cx),
            _ => pr_warn!(cx, "Unhandled special character {:#x}", byte),
        }
    }

    fn on_csi(&mut self, byte: u8, cx: &mut Context<'_>) {
        match byte {
            b'0'..=b'9' => {
                match byte {
                    b'1' | b'7' => self.cursor_home(cx),
                    b'3' => self.delete_forward(cx),
                    b'4' | b'8' => self.cursor_end(cx),
                    // Insert, PgUp and PgDn do nothing yet.
                    _ => {}
                }
                self.state = EditorState::Term;
            }
            b'A' => {
                self.state = EditorState::Normal;
                self.history_prev(cx);
            }
            b'B' => {
                self.state = EditorState::Normal;
                self.history_next(cx);
            }
            b'C' => {
                self.state = EditorState::Normal;
                self.cursor_right(cx);
            }
            b'D' => {
                self.state = EditorState::Normal;
                self.cursor_left(cx);
            }
            _ => self.state = EditorState::Normal,
        }
    }

    fn submit(&mut self, cx: &mut Context<'_>) {
        let _ = writeln!(cx);
        cx.history.record(self.line.as_str());
        let _ = commands::run(cx, self.line.as_str());
        self.line.clear();
    }

    fn insert(&mut self, byte: u8, cx: &mut Context<'_>) {
        if !self.line.insert(byte) {
            bell(cx);
            return;
        }
        cx.history.cancel_browse();
        self.redraw_tail(self.line.cursor() - 1, 0, cx);
    }

    /// Backspace and CTRL-W share this path.
    fn kill_left(&mut self, n: usize, cx: &mut Context<'_>) {
        let removed = self.line.delete_left(n);
        if removed == 0 {
            bell(cx);
            return;
        }
        cx.history.cancel_browse();
        for _ in 0..removed {
            let _ = cx.write_str("\x08");
        }
        self.redraw_tail(self.line.cursor(), removed, cx);
    }

    fn delete_forward(&mut self, cx: &mut Context<'_>) {
        if !self.line.delete_at() {
            bell(cx);
            return;
        }
        cx.history.cancel_browse();
        self.redraw_tail(self.line.cursor(), 1, cx);
    }

    fn cursor_home(&mut self, cx: &mut Context<'_>) {
        for _ in 0..self.line.cursor() {
            let _ = cx.write_str("\x08");
        }
        self.line.home();
    }

    fn cursor_end(&mut self, cx: &mut Context<'_>) {
        // Re-echoing the tail walks the terminal cursor right.
        let _ = cx.write_str(&self.line.as_str()[self.line.cursor()..]);
        self.line.end();
    }

    fn cursor_left(&mut self, cx: &mut Context<'_>) {
        if self.line.move_left() {
            let _ = cx.write_str("\x08");
        } else {
            bell(cx);
        }
    }

    fn cursor_right(&mut self, cx: &mut Context<'_>) {
        match self.line.at_cursor() {
            Some(c) => {
                let _ = write!(cx, "{}", c as char);
                self.line.move_right();
            }
            None => bell(cx),
        }
    }

    /// CTRL-L: the one full repaint.
    fn repaint(&mut self, cx: &mut Context<'_>) {
        let _ = writeln!(cx);
        cx.print_prompt();
        let _ = cx.write_str(self.line.as_str());
        for _ in 0..(self.line.len() - self.line.cursor()) {
            let _ = cx.write_str("\x08");
        }
    }

    fn history_prev(&mut self, cx: &mut Context<'_>) {
        let old_len = self.line.len();
        let old_cursor = self.line.cursor();
        let found = match cx.history.browse_prev(self.line.as_str()) {
            Some(entry) => {
                self.line.set(entry);
                true
            }
            None => false,
        };
        if !found {
            bell(cx);
            return;
        }
        self.replace_screen(old_cursor, old_len, cx);
    }

    fn history_next(&mut self, cx: &mut Context<'_>) {
        let old_len = self.line.len();
        let old_cursor = self.line.cursor();
        let found = match cx.history.browse_next() {
            Some(entry) => {
                self.line.set(entry);
                true
            }
            None => false,
        };
        if !found {
            bell(cx);
            return;
        }
        self.replace_screen(old_cursor, old_len, cx);
    }

    /// Redraw after the whole line was replaced. `old_cursor` and
    /// `old_len` describe what is still on screen.
    fn replace_screen(&self, old_cursor: usize, old_len: usize, cx: &mut Context<'_>) {
        for _ in 0..old_cursor {
            let _ = cx.write_str("\x08");
        }
        let _ = cx.write_str(self.line.as_str());
        if old_len > self.line.len() {
            let extra = old_len - self.line.len();
            for _ in 0..extra {
                let _ = cx.write_str(" ");
            }
            for _ in 0..extra {
                let _ = cx.write_str("\x08");
            }
        }
    }

    /// Redraw from `start` to the end of the line, blank `erased` stale
    /// columns, then walk the terminal cursor back to the edit cursor.
    /// The terminal cursor must sit at column `start` on entry.
    fn redraw_tail(&self, start: usize, erased: usize, cx: &mut Context<'_>) {
        let _ = cx.write_str(&self.line.as_str()[start..]);
        for _ in 0..erased {
            let _ = cx.write_str(" ");
        }
        let back = self.line.len() - self.line.cursor() + erased;
        for _ in 0..back {
            let _ = cx.write_str("\x08");
        }
    }
}

fn bell(cx: &mut Context<'_>) {
    let _ = cx.write_str("\x07");
}
