//! Command history ring.
//!
//! Static allocation, 20 entries of one line each. Browsing stashes the
//! in-progress line, so stepping back past the newest entry restores what
//! the operator was typing.

/// Maximum line length.
pub const LINE_SIZE: usize = 80;

/// Number of history entries.
pub const HISTORY_SIZE: usize = 20;

pub struct History {
    /// Ring buffer of submitted lines.
    entries: [[u8; LINE_SIZE]; HISTORY_SIZE],
    lengths: [usize; HISTORY_SIZE],
    /// Next slot to write.
    write_idx: usize,
    /// Number of valid entries.
    count: usize,
    /// Browse position, 0 = newest. None when not browsing.
    browse: Option<usize>,
    /// The unsubmitted line, saved when a browse starts.
    stash: [u8; LINE_SIZE],
    stash_len: usize,
}

impl History {
    pub const fn new() -> Self {
        Self {
            entries: [[0u8; LINE_SIZE]; HISTORY_SIZE],
            lengths: [0; HISTORY_SIZE],
            write_idx: 0,
            count: 0,
            browse: None,
            stash: [0u8; LINE_SIZE],
            stash_len: 0,
        }
    }

    /// Record a submitted line.
    ///
    /// Whitespace-only lines and immediate repeats of the newest entry
    /// are dropped. Recording always ends any active browse.
    pub fn record(&mut self, line: &str) {
        self.browse = None;
        if line.trim().is_empty() {
            return;
        }
        if self.entry_str(0) == Some(line) {
            return;
        }
        let bytes = line.as_bytes();
        let len = bytes.len().min(LINE_SIZE);
        self.entries[self.write_idx][..len].copy_from_slice(&bytes[..len]);
        self.lengths[self.write_idx] = len;
        self.write_idx = (self.write_idx + 1) % HISTORY_SIZE;
        self.count = (self.count + 1).min(HISTORY_SIZE);
    }

    /// Step to an older entry. `current` is the line on screen; it is
    /// stashed when the browse starts. Returns None past the oldest
    /// entry, leaving the position unchanged.
    pub fn browse_prev(&mut self, current: &str) -> Option<&str> {
        let pos = match self.browse {
            None => {
                if self.count == 0 {
                    return None;
                }
                let bytes = current.as_bytes();
                let len = bytes.len().min(LINE_SIZE);
                self.stash[..len].copy_from_slice(&bytes[..len]);
                self.stash_len = len;
                0
            }
            Some(p) if p + 1 < self.count => p + 1,
            Some(_) => return None,
        };
        self.browse = Some(pos);
        self.entry_str(pos)
    }

    /// Step back toward the present. Leaving the newest entry ends the
    /// browse and returns the stashed line. None when not browsing.
    pub fn browse_next(&mut self) -> Option<&str> {
        match self.browse {
            None => None,
            Some(0) => {
                self.browse = None;
                core::str::from_utf8(&self.stash[..self.stash_len]).ok()
            }
            Some(p) => {
                self.browse = Some(p - 1);
                self.entry_str(p - 1)
            }
        }
    }

    /// Forget any browse state without touching the stash.
    pub fn cancel_browse(&mut self) {
        self.browse = None;
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Copy entry `i`, counting from the oldest, into `out`. Returns the
    /// copied length, 0 when out of range. For the `history` listing.
    pub fn copy_entry(&self, i: usize, out: &mut [u8]) -> usize {
        if i >= self.count {
            return 0;
        }
        let pos = self.count - 1 - i;
        let idx = (self.write_idx + HISTORY_SIZE - 1 - pos) % HISTORY_SIZE;
        let len = self.lengths[idx].min(out.len());
        out[..len].copy_from_slice(&self.entries[idx][..len]);
        len
    }

    /// Entry at browse position `pos`, 0 = newest.
    fn entry_str(&self, pos: usize) -> Option<&str> {
        if pos >= self.count {
            return None;
        }
        let idx = (self.write_idx + HISTORY_SIZE - 1 - pos) % HISTORY_SIZE;
        core::str::from_utf8(&self.entries[idx][..self.lengths[idx]]).ok()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
