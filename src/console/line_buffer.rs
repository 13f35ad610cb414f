//! Cursor-aware line buffer for console input.

use super::history::LINE_SIZE;

/// The line being edited, with an insertion cursor.
///
/// The cursor sits between characters: 0 is before the first character,
/// `len()` is past the last. All edits happen relative to it.
pub struct LineBuffer {
    buf: [u8; LINE_SIZE],
    len: usize,
    cursor: usize,
}

impl LineBuffer {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            buf: [0u8; LINE_SIZE],
            len: 0,
            cursor: 0,
        }
    }

    /// Insert a character at the cursor, shifting the tail right.
    /// Returns false when the buffer is full.
    pub fn insert(&mut self, c: u8) -> bool {
        if self.len == LINE_SIZE {
            return false;
        }
        let mut i = self.len;
        while i > self.cursor {
            self.buf[i] = self.buf[i - 1];
            i -= 1;
        }
        self.buf[self.cursor] = c;
        self.len += 1;
        self.cursor += 1;
        true
    }

    /// Delete up to `n` characters left of the cursor, shifting the tail
    /// down. Returns how many were actually removed.
    pub fn delete_left(&mut self, n: usize) -> usize {
        let n = n.min(self.cursor);
        if n == 0 {
            return 0;
        }
        let from = self.cursor;
        let to = self.cursor - n;
        for i in 0..(self.len - from) {
            self.buf[to + i] = self.buf[from + i];
        }
        self.cursor -= n;
        self.len -= n;
        n
    }

    /// Delete the character under the cursor. Returns false at end of line.
    pub fn delete_at(&mut self) -> bool {
        if self.cursor == self.len {
            return false;
        }
        for i in self.cursor..self.len - 1 {
            self.buf[i] = self.buf[i + 1];
        }
        self.len -= 1;
        true
    }

    /// Width of the word left of the cursor: trailing spaces plus the
    /// run of non-spaces before them. This is what CTRL-W kills.
    pub fn word_span(&self) -> usize {
        let mut i = self.cursor;
        while i > 0 && self.buf[i - 1] == b' ' {
            i -= 1;
        }
        while i > 0 && self.buf[i - 1] != b' ' {
            i -= 1;
        }
        self.cursor - i
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor == self.len {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.len;
    }

    /// Clear the buffer and park the cursor at the start.
    pub fn clear(&mut self) {
        self.len = 0;
        self.cursor = 0;
    }

    /// Replace the contents, truncating to capacity. The cursor lands at
    /// the end.
    pub fn set(&mut self, s: &str) {
        let bytes = s.as_bytes();
        let n = bytes.len().min(LINE_SIZE);
        self.buf[..n].copy_from_slice(&bytes[..n]);
        self.len = n;
        self.cursor = n;
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Character under the cursor, if the cursor is not at the end.
    pub fn at_cursor(&self) -> Option<u8> {
        if self.cursor < self.len {
            Some(self.buf[self.cursor])
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
