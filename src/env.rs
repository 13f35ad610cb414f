//! Environment variables.
//!
//! A fixed table of known keys with copy-out values. Values are returned
//! by value so callers can keep printing through the console while holding
//! one. Persistence is not wired up yet; `saveenv` says so.

use crate::config::DEFAULT_BAUD;

/// Longest value a variable can hold.
pub const VALUE_SIZE: usize = 24;

const KEYS: &[&str] = &["prompt", "baudA", "baudB"];
const DEFAULTS: &[&str] = &["bcu> ", "115200", "115200"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvError {
    UnknownKey,
    ValueTooLong,
}

impl core::fmt::Display for EnvError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EnvError::UnknownKey => f.write_str("unknown key"),
            EnvError::ValueTooLong => f.write_str("value too long"),
        }
    }
}

/// One variable value, owned and copyable.
#[derive(Clone, Copy)]
pub struct Value {
    buf: [u8; VALUE_SIZE],
    len: usize,
}

impl Value {
    const fn from_str(s: &str) -> Self {
        let bytes = s.as_bytes();
        assert!(bytes.len() <= VALUE_SIZE);
        let mut buf = [0u8; VALUE_SIZE];
        let mut i = 0;
        while i < bytes.len() {
            buf[i] = bytes[i];
            i += 1;
        }
        Self { buf, len: bytes.len() }
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }
}

pub struct Env {
    values: [Value; KEYS.len()],
}

impl Env {
    /// Number of defined variables.
    pub const COUNT: usize = KEYS.len();

    pub const fn new() -> Self {
        let mut values = [Value { buf: [0; VALUE_SIZE], len: 0 }; KEYS.len()];
        let mut i = 0;
        while i < KEYS.len() {
            values[i] = Value::from_str(DEFAULTS[i]);
            i += 1;
        }
        Self { values }
    }

    fn index(key: &str) -> Option<usize> {
        KEYS.iter().position(|k| *k == key)
    }

    /// Look a variable up. Returns a copy of the value.
    pub fn get(&self, key: &str) -> Option<Value> {
        Self::index(key).map(|i| self.values[i])
    }

    pub fn set(&mut self, key: &str, val: &str) -> Result<(), EnvError> {
        let i = Self::index(key).ok_or(EnvError::UnknownKey)?;
        if val.len() > VALUE_SIZE {
            return Err(EnvError::ValueTooLong);
        }
        self.values[i] = Value::from_str(val);
        Ok(())
    }

    /// Key and value at table position `i`, for listing.
    pub fn entry(&self, i: usize) -> (&'static str, Value) {
        (KEYS[i], self.values[i])
    }

    /// Baud rate for a port key, e.g. `"baudA"`.
    ///
    /// Falls back to the generic `"baud"` key, then to the compiled-in
    /// default. Unparseable or zero values also fall back.
    pub fn baud(&self, key: &str) -> u32 {
        let val = self.get(key).or_else(|| self.get("baud"));
        match val {
            Some(v) => match v.as_str().trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => DEFAULT_BAUD,
            },
            None => DEFAULT_BAUD,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
