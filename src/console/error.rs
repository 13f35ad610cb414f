//! Console error types.
//!
//! Handlers print their own user-facing diagnostics; the error value
//! classifies what went wrong for callers and tests.

/// Command failure with code and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmdError {
    /// E01: No command matched the first token
    UnknownCommand,
    /// E02: More tokens than the argument vector holds
    TooManyArgs,
    /// E03: Missing or malformed arguments, usage was printed
    Usage,
    /// E04: Channel token did not decode
    InvalidChannel,
    /// E05: State token did not decode
    InvalidState,
    /// E06: Color name not in the table
    UnknownColor,
    /// E07: Malformed #rgb / #rrggbb literal
    InvalidColor,
    /// E08: Numeric argument did not parse
    InvalidNumber,
    /// E09: I2C transfer failed
    BusError,
}

impl CmdError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::TooManyArgs => "E02",
            Self::Usage => "E03",
            Self::InvalidChannel => "E04",
            Self::InvalidState => "E05",
            Self::UnknownColor => "E06",
            Self::InvalidColor => "E07",
            Self::InvalidNumber => "E08",
            Self::BusError => "E09",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "unknown command",
            Self::TooManyArgs => "too many arguments",
            Self::Usage => "bad usage",
            Self::InvalidChannel => "invalid channel",
            Self::InvalidState => "invalid state",
            Self::UnknownColor => "unknown color",
            Self::InvalidColor => "invalid color",
            Self::InvalidNumber => "invalid number",
            Self::BusError => "bus error",
        }
    }
}

impl core::fmt::Display for CmdError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
