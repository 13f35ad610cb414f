//! Colored console logging.
//!
//! Log lines share the console stream with command output and are wrapped
//! in an ANSI color per severity, so they stand out on the operator's
//! terminal but need no second channel. All macros take the output sink as
//! their first argument; anything implementing `core::fmt::Write` works.
//!
//! `pr_debug!` compiles to nothing unless the `debug-log` feature is on.

/// Reset attributes.
pub const ESC_NORMAL: &str = "\x1b[0m";
pub const ESC_RED: &str = "\x1b[31m";
pub const ESC_GREEN: &str = "\x1b[32m";
pub const ESC_YELLOW: &str = "\x1b[33m";
pub const ESC_BLUE: &str = "\x1b[34m";

/// Base macro: one formatted line wrapped in a color.
#[macro_export]
macro_rules! pr_log {
    ($color:expr, $cx:expr, $($arg:tt)*) => {{
        use core::fmt::Write as _;
        let _ = write!(
            $cx,
            "{}{}{}\n",
            $color,
            format_args!($($arg)*),
            $crate::logging::ESC_NORMAL
        );
    }};
}

/// Informational message, green.
#[macro_export]
macro_rules! pr_info {
    ($cx:expr, $($arg:tt)*) => {
        $crate::pr_log!($crate::logging::ESC_GREEN, $cx, $($arg)*)
    };
}

/// Warning, yellow.
#[macro_export]
macro_rules! pr_warn {
    ($cx:expr, $($arg:tt)*) => {
        $crate::pr_log!($crate::logging::ESC_YELLOW, $cx, $($arg)*)
    };
}

/// Error, red.
#[macro_export]
macro_rules! pr_err {
    ($cx:expr, $($arg:tt)*) => {
        $crate::pr_log!($crate::logging::ESC_RED, $cx, $($arg)*)
    };
}

/// Debug trace, blue.
#[cfg(feature = "debug-log")]
#[macro_export]
macro_rules! pr_debug {
    ($cx:expr, $($arg:tt)*) => {
        $crate::pr_log!($crate::logging::ESC_BLUE, $cx, $($arg)*)
    };
}

/// Debug trace, compiled out. The dead branch keeps the arguments
/// type-checked either way.
#[cfg(not(feature = "debug-log"))]
#[macro_export]
macro_rules! pr_debug {
    ($cx:expr, $($arg:tt)*) => {{
        if false {
            use core::fmt::Write as _;
            let _ = write!($cx, $($arg)*);
        }
    }};
}
