//! Command line tokenizer.
//!
//! Splits on whitespace with quote support: a single or double quote
//! starts a token that runs to the matching quote (or end of line), so
//! `setenv prompt "lab7> "` keeps its embedded and trailing spaces.

/// Most tokens a line can carry, command word included.
pub const ARGV_MAX: usize = 10;

/// The line held more than [`ARGV_MAX`] tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooManyArgs;

/// Tokenized command line, borrowing the input.
#[derive(Debug, Clone)]
pub struct Args<'a> {
    argv: [&'a str; ARGV_MAX],
    argc: usize,
}

impl<'a> Args<'a> {
    pub fn as_slice(&self) -> &[&'a str] {
        &self.argv[..self.argc]
    }
}

/// Split a line into tokens.
///
/// An overfull line only errors on a real eleventh token; trailing
/// whitespace after a full argument vector is fine.
pub fn tokenize(line: &str) -> Result<Args<'_>, TooManyArgs> {
    let bytes = line.as_bytes();
    let mut argv = [""; ARGV_MAX];
    let mut argc = 0;
    let mut i = 0;
    loop {
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        if i == bytes.len() {
            break;
        }
        if argc == ARGV_MAX {
            return Err(TooManyArgs);
        }
        if bytes[i] == b'"' || bytes[i] == b'\'' {
            let quote = bytes[i];
            i += 1;
            let start = i;
            while i < bytes.len() && bytes[i] != quote {
                i += 1;
            }
            argv[argc] = &line[start..i];
            if i < bytes.len() {
                i += 1;
            }
        } else {
            let start = i;
            while i < bytes.len() && bytes[i] != b' ' && bytes[i] != b'\t' {
                i += 1;
            }
            argv[argc] = &line[start..i];
        }
        argc += 1;
    }
    Ok(Args { argv, argc })
}
