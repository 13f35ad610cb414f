//! Command table and handlers.
//!
//! Commands match case-insensitively on any abbreviation of at least
//! `min_match` characters; the capitalized prefix of each `name` shows
//! the shortest accepted form in the help listing. A constant assertion
//! proves at build time that no two commands share an accepted
//! abbreviation, so table order never decides a match.

use core::fmt::Write;

use embedded_hal::i2c::ErrorKind;

use super::error::CmdError;
use super::history::LINE_SIZE;
use super::parser::{self, ARGV_MAX};
use crate::channel;
use crate::context::{ConsoleMode, Context};
use crate::env::{Env, EnvError};
use crate::util::{matches_abbrev, parse_num};
use crate::{pr_err, pr_warn};

pub struct CommandDescriptor {
    pub name: &'static str,
    /// Fewest leading characters that select this command.
    pub min_match: usize,
    pub brief: &'static str,
    pub handler: fn(&mut Context<'_>, &[&str]) -> Result<(), CmdError>,
}

/// All available commands.
pub const COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor { name: "GEtenv", min_match: 2, brief: "Get the value of an environment variable", handler: cmd_getenv },
    CommandDescriptor { name: "GPio", min_match: 2, brief: "Control GPIO", handler: channel::cmd_gpio },
    CommandDescriptor { name: "Help", min_match: 1, brief: "Display this help", handler: cmd_help },
    CommandDescriptor { name: "HIstory", min_match: 2, brief: "Show command history", handler: cmd_history },
    CommandDescriptor { name: "I2c", min_match: 1, brief: "I2C tools", handler: cmd_i2c },
    CommandDescriptor { name: "Key", min_match: 1, brief: "Control key", handler: channel::cmd_key },
    CommandDescriptor { name: "Monitor", min_match: 1, brief: "Monitor power consumption", handler: cmd_monitor },
    CommandDescriptor { name: "Power", min_match: 1, brief: "Control power", handler: channel::cmd_power },
    CommandDescriptor { name: "PRintenv", min_match: 2, brief: "Print all environment variables", handler: cmd_printenv },
    CommandDescriptor { name: "RGB", min_match: 1, brief: "Show a color", handler: channel::cmd_rgb },
    CommandDescriptor { name: "Saveenv", min_match: 1, brief: "Save all environment variables", handler: cmd_saveenv },
    CommandDescriptor { name: "SEtenv", min_match: 2, brief: "Set the value of an environment variable", handler: cmd_setenv },
    CommandDescriptor { name: "Test", min_match: 1, brief: "Test cycle through board features", handler: cmd_test },
    CommandDescriptor { name: "Version", min_match: 1, brief: "Display software version", handler: cmd_version },
];

/// True when some abbreviation is accepted by both commands.
const fn ambiguous(a: &CommandDescriptor, b: &CommandDescriptor) -> bool {
    let na = a.name.as_bytes();
    let nb = b.name.as_bytes();
    let min = if a.min_match > b.min_match { a.min_match } else { b.min_match };
    let shorter = if na.len() < nb.len() { na.len() } else { nb.len() };
    if min > shorter {
        return false;
    }
    let mut i = 0;
    while i < min {
        if na[i].to_ascii_lowercase() != nb[i].to_ascii_lowercase() {
            return false;
        }
        i += 1;
    }
    true
}

// Every abbreviation must resolve to exactly one command.
const _: () = {
    let mut i = 0;
    while i < COMMANDS.len() {
        assert!(COMMANDS[i].min_match >= 1 && COMMANDS[i].min_match <= COMMANDS[i].name.len());
        let mut j = i + 1;
        while j < COMMANDS.len() {
            assert!(!ambiguous(&COMMANDS[i], &COMMANDS[j]));
            j += 1;
        }
        i += 1;
    }
};

/// Run one submitted line: tokenize, dispatch, and reissue the prompt if
/// the console is still in command mode afterwards.
pub fn run(cx: &mut Context<'_>, line: &str) -> Result<(), CmdError> {
    let result = dispatch(cx, line);
    if cx.mode == ConsoleMode::Command {
        cx.print_prompt();
    }
    result
}

fn dispatch(cx: &mut Context<'_>, line: &str) -> Result<(), CmdError> {
    let args = match parser::tokenize(line) {
        Ok(args) => args,
        Err(_) => {
            let _ = writeln!(cx, "Too many arguments (max = {})", ARGV_MAX);
            return Err(CmdError::TooManyArgs);
        }
    };
    let argv = args.as_slice();
    let Some((&first, rest)) = argv.split_first() else {
        return Ok(());
    };
    // `?` is an alias for help; the rest of the line rides along.
    if first.starts_with('?') {
        return cmd_help(cx, rest);
    }
    for cmd in COMMANDS {
        if matches_abbrev(first, cmd.name, cmd.min_match) {
            return (cmd.handler)(cx, rest);
        }
    }
    let _ = writeln!(cx, "Unknown command");
    Err(CmdError::UnknownCommand)
}

// --- Command implementations ---

fn cmd_help(cx: &mut Context<'_>, _args: &[&str]) -> Result<(), CmdError> {
    let _ = writeln!(cx, "Welcome to bcu, the Board Farm Control Unit!");
    let _ = writeln!(cx);
    let _ = writeln!(cx, "Valid commands are:");
    for cmd in COMMANDS {
        let _ = writeln!(cx, "    {}: {}", cmd.name, cmd.brief);
    }
    Ok(())
}

fn cmd_version(cx: &mut Context<'_>, _args: &[&str]) -> Result<(), CmdError> {
    let serial = cx.board.serial_number();
    let _ = writeln!(cx, "bcu version {}, Device SerialNumber {:08x}", super::VERSION, serial);
    Ok(())
}

fn cmd_history(cx: &mut Context<'_>, _args: &[&str]) -> Result<(), CmdError> {
    for i in 0..cx.history.len() {
        let mut buf = [0u8; LINE_SIZE];
        let n = cx.history.copy_entry(i, &mut buf);
        if let Ok(entry) = core::str::from_utf8(&buf[..n]) {
            let _ = writeln!(cx, "{:2}: {}", i + 1, entry);
        }
    }
    Ok(())
}

fn cmd_getenv(cx: &mut Context<'_>, args: &[&str]) -> Result<(), CmdError> {
    if args.len() != 1 {
        let _ = writeln!(cx, "Usage: getenv <key>");
        return Err(CmdError::Usage);
    }
    let key = args[0];
    match cx.env.get(key) {
        Some(val) => {
            let _ = writeln!(cx, "{} = {}", key, val.as_str());
        }
        None => {
            let _ = writeln!(cx, "{} is not defined", key);
        }
    }
    Ok(())
}

fn cmd_setenv(cx: &mut Context<'_>, args: &[&str]) -> Result<(), CmdError> {
    if args.len() != 2 {
        let _ = writeln!(cx, "Usage: setenv <key> <val>");
        return Err(CmdError::Usage);
    }
    match cx.env.set(args[0], args[1]) {
        Ok(()) => Ok(()),
        Err(EnvError::UnknownKey) => {
            // New keys would need a persistent store underneath.
            pr_warn!(cx, "setenv: Not yet implemented");
            Ok(())
        }
        Err(EnvError::ValueTooLong) => {
            let _ = writeln!(cx, "Value too long (max = {})", crate::env::VALUE_SIZE);
            Err(CmdError::Usage)
        }
    }
}

fn cmd_printenv(cx: &mut Context<'_>, _args: &[&str]) -> Result<(), CmdError> {
    for i in 0..Env::COUNT {
        let (key, val) = cx.env.entry(i);
        let _ = writeln!(cx, "{} = {}", key, val.as_str());
    }
    Ok(())
}

fn cmd_saveenv(cx: &mut Context<'_>, _args: &[&str]) -> Result<(), CmdError> {
    pr_warn!(cx, "saveenv: Not yet implemented");
    Ok(())
}

fn cmd_monitor(cx: &mut Context<'_>, _args: &[&str]) -> Result<(), CmdError> {
    let _ = writeln!(cx, "Starting power monitor (CTRL-C to interrupt)");
    cx.mode = ConsoleMode::Monitor;
    Ok(())
}

fn cmd_test(cx: &mut Context<'_>, _args: &[&str]) -> Result<(), CmdError> {
    let _ = writeln!(cx, "Starting test (CTRL-C to interrupt)");
    cx.mode = ConsoleMode::Test;
    Ok(())
}

// --- I2C tools ---

fn parse_byte(tok: &str) -> Option<u8> {
    parse_num(tok).and_then(|v| u8::try_from(v).ok())
}

fn cmd_i2c(cx: &mut Context<'_>, args: &[&str]) -> Result<(), CmdError> {
    match args.split_first() {
        Some((&sub, rest)) if !matches_abbrev(sub, "help", 1) => {
            if matches_abbrev(sub, "scan", 1) {
                cmd_i2c_scan(cx, rest)
            } else if matches_abbrev(sub, "get", 1) {
                cmd_i2c_get(cx, rest)
            } else if matches_abbrev(sub, "set", 2) {
                cmd_i2c_set(cx, rest)
            } else {
                let _ = writeln!(cx, "Unknown I2C command {}", sub);
                Err(CmdError::UnknownCommand)
            }
        }
        _ => {
            let _ = writeln!(cx, "Usage: i2c <cmd> ...");
            let _ = writeln!(cx);
            let _ = writeln!(cx, "Valid commands are: Scan, Get, SEt");
            Err(CmdError::Usage)
        }
    }
}

fn cmd_i2c_scan(cx: &mut Context<'_>, _args: &[&str]) -> Result<(), CmdError> {
    let mut found = 0u32;
    for addr in 0x03..=0x77u8 {
        // A zero-length write probes for an address ACK.
        match cx.i2c.write(addr, &[]) {
            Ok(()) => {
                let _ = writeln!(cx, "Found I2C device at address {:#02x}", addr);
                found += 1;
            }
            Err(ErrorKind::NoAcknowledge(_)) => {}
            Err(e) => {
                pr_err!(cx, "I2C bus failure: {}", e);
                return Err(CmdError::BusError);
            }
        }
    }
    if found == 0 {
        let _ = writeln!(cx, "No I2C devices found");
    }
    Ok(())
}

fn cmd_i2c_get(cx: &mut Context<'_>, args: &[&str]) -> Result<(), CmdError> {
    if args.is_empty() || args.len() > 3 || matches_abbrev(args[0], "help", 1) {
        let _ = writeln!(cx, "Usage: i2c get <addr> [<reg> [b|w|l]]");
        return Err(CmdError::Usage);
    }
    let Some(addr) = parse_byte(args[0]) else {
        let _ = writeln!(cx, "Invalid number {}", args[0]);
        return Err(CmdError::InvalidNumber);
    };
    let reg = match args.get(1) {
        Some(tok) => match parse_byte(tok) {
            Some(r) => Some(r),
            None => {
                let _ = writeln!(cx, "Invalid number {}", tok);
                return Err(CmdError::InvalidNumber);
            }
        },
        None => None,
    };
    let width = match args.get(2) {
        None => 1,
        Some(&"b") => 1,
        Some(&"w") => 2,
        Some(&"l") => 4,
        Some(tok) => {
            let _ = writeln!(cx, "Invalid mode {}", tok);
            return Err(CmdError::Usage);
        }
    };
    let mut buf = [0u8; 4];
    let res = match reg {
        Some(r) => cx.i2c.write_read(addr, &[r], &mut buf[..width]),
        None => cx.i2c.read(addr, &mut buf[..width]),
    };
    if let Err(e) = res {
        pr_err!(cx, "I2C read failed: {}", e);
        return Err(CmdError::BusError);
    }
    let value = buf[..width]
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
    match width {
        1 => {
            let _ = writeln!(cx, "{:#02x}", value);
        }
        2 => {
            let _ = writeln!(cx, "{:#04x}", value);
        }
        _ => {
            let _ = writeln!(cx, "{:#08x}", value);
        }
    }
    Ok(())
}

fn cmd_i2c_set(cx: &mut Context<'_>, args: &[&str]) -> Result<(), CmdError> {
    if args.is_empty() || matches_abbrev(args[0], "help", 1) {
        let _ = writeln!(cx, "Usage: i2c set <addr> [<reg> [<data> ...]]");
        return Err(CmdError::Usage);
    }
    let Some(addr) = parse_byte(args[0]) else {
        let _ = writeln!(cx, "Invalid number {}", args[0]);
        return Err(CmdError::InvalidNumber);
    };
    // Register and data bytes go out as one write.
    let mut payload = [0u8; ARGV_MAX];
    let mut n = 0;
    for tok in &args[1..] {
        match parse_byte(tok) {
            Some(b) => {
                payload[n] = b;
                n += 1;
            }
            None => {
                let _ = writeln!(cx, "Invalid number {}", tok);
                return Err(CmdError::InvalidNumber);
            }
        }
    }
    if let Err(e) = cx.i2c.write(addr, &payload[..n]) {
        pr_err!(cx, "I2C write failed: {}", e);
        return Err(CmdError::BusError);
    }
    Ok(())
}
