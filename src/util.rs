//! Small helpers shared across the firmware.

/// Case-insensitive abbreviation match.
///
/// `abbrev` matches `full` when it is a prefix of `full`, at least `min`
/// characters long. `min` is what keeps `g` from meaning either `getenv`
/// or `gpio`.
pub fn matches_abbrev(abbrev: &str, full: &str, min: usize) -> bool {
    let n = abbrev.len();
    n >= min && n <= full.len() && abbrev.eq_ignore_ascii_case(&full[..n])
}

/// Parse an unsigned number, accepting a `0x` prefix for hex.
pub fn parse_num(s: &str) -> Option<u32> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

/// Fixed-capacity formatting buffer for building byte payloads without
/// allocation. Content past the capacity is silently truncated.
pub struct FmtBuf<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> FmtBuf<N> {
    pub const fn new() -> Self {
        Self { buf: [0; N], len: 0 }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }
}

impl<const N: usize> Default for FmtBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Write for FmtBuf<N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let room = N - self.len;
        let n = bytes.len().min(room);
        self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        Ok(())
    }
}
