//! Channel command handlers: power, key, GPIO and RGB outputs.
//!
//! Each handler decodes a channel selector and an optional state token,
//! applies the action to every selected channel and records the new
//! logical state in the cache, so a query without a state argument can
//! read back the last commanded value.

use core::fmt::Write;

use crate::config::{NUM_GPIO_CH, NUM_KEY_CH, NUM_POWER_CH, NUM_RGB_CH, PULSE_HOLD_US};
use crate::console::error::CmdError;
use crate::context::Context;
use crate::util::matches_abbrev;

/// Last commanded logical state of every output channel.
pub struct ChannelCaches {
    pub power: [bool; NUM_POWER_CH],
    pub key: [bool; NUM_KEY_CH],
    pub gpio: [bool; NUM_GPIO_CH],
    pub rgb: [u32; NUM_RGB_CH],
}

impl ChannelCaches {
    pub const fn new() -> Self {
        Self {
            power: [false; NUM_POWER_CH],
            key: [false; NUM_KEY_CH],
            gpio: [false; NUM_GPIO_CH],
            rgb: [0; NUM_RGB_CH],
        }
    }
}

impl Default for ChannelCaches {
    fn default() -> Self {
        Self::new()
    }
}

/// Channel argument: a single channel or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    All,
    One(usize),
}

impl Selector {
    /// Indices selected out of `count` channels.
    pub fn range(self, count: usize) -> core::ops::Range<usize> {
        match self {
            Selector::All => 0..count,
            Selector::One(ch) => ch..ch + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    Off,
    On,
    Pulse,
}

pub(crate) const fn channel_letter(ch: usize) -> char {
    (b'A' + ch as u8) as char
}

pub(crate) const fn channel_digit(ch: usize) -> char {
    (b'0' + ch as u8) as char
}

/// Decode a channel token: "ALL" (two or more characters), or a single
/// letter or digit within `count`.
pub fn decode_channel(
    cx: &mut Context<'_>,
    kind: &str,
    tok: &str,
    count: usize,
) -> Result<Selector, CmdError> {
    if matches_abbrev(tok, "ALL", 2) {
        return Ok(Selector::All);
    }
    if let [c] = tok.as_bytes() {
        let ch = match c {
            b'0'..=b'9' => Some((c - b'0') as usize),
            b'A'..=b'Z' => Some((c - b'A') as usize),
            b'a'..=b'z' => Some((c - b'a') as usize),
            _ => None,
        };
        if let Some(ch) = ch {
            if ch < count {
                return Ok(Selector::One(ch));
            }
        }
    }
    let _ = writeln!(cx, "Invalid {} channel {}", kind, tok);
    Err(CmdError::InvalidChannel)
}

/// Decode a state token: ON/1, OFF/0, and PULSE if the channel class
/// supports it. ON and OFF need at least two characters, a lone "o"
/// would be ambiguous.
pub fn decode_state(
    cx: &mut Context<'_>,
    kind: &str,
    tok: &str,
    allow_pulse: bool,
) -> Result<SwitchState, CmdError> {
    if matches_abbrev(tok, "ON", 2) || tok == "1" {
        return Ok(SwitchState::On);
    }
    if matches_abbrev(tok, "OFF", 2) || tok == "0" {
        return Ok(SwitchState::Off);
    }
    if allow_pulse && matches_abbrev(tok, "PULSE", 1) {
        return Ok(SwitchState::Pulse);
    }
    let _ = writeln!(cx, "Invalid {} state {}", kind, tok);
    Err(CmdError::InvalidState)
}

fn print_channels_line(cx: &mut Context<'_>, count: usize) {
    let _ = writeln!(
        cx,
        "Valid channels are A..{}|0..{}|ALL",
        channel_letter(count - 1),
        count - 1
    );
}

pub fn cmd_power(cx: &mut Context<'_>, args: &[&str]) -> Result<(), CmdError> {
    if args.is_empty() || args.len() > 2 || matches_abbrev(args[0], "help", 1) {
        let _ = writeln!(cx, "Usage: power <channel> [<state>]");
        let _ = writeln!(cx);
        print_channels_line(cx, NUM_POWER_CH);
        let _ = writeln!(cx, "Valid states are ON|OFF|1|0");
        return Err(CmdError::Usage);
    }

    let sel = decode_channel(cx, "power", args[0], NUM_POWER_CH)?;

    let Some(&tok) = args.get(1) else {
        for ch in sel.range(NUM_POWER_CH) {
            let _ = writeln!(cx, "{}", u8::from(cx.cache.power[ch]));
        }
        return Ok(());
    };

    let state = decode_state(cx, "power", tok, false)?;
    let on = state == SwitchState::On;
    for ch in sel.range(NUM_POWER_CH) {
        let _ = writeln!(
            cx,
            "Powering channel {} {}",
            channel_letter(ch),
            if on { "on" } else { "off" }
        );
        cx.board.set_power(ch, on);
        cx.cache.power[ch] = on;
    }
    Ok(())
}

pub fn cmd_key(cx: &mut Context<'_>, args: &[&str]) -> Result<(), CmdError> {
    if args.is_empty() || args.len() > 2 || matches_abbrev(args[0], "help", 1) {
        let _ = writeln!(cx, "Usage: key <channel> [<state>]");
        let _ = writeln!(cx);
        print_channels_line(cx, NUM_KEY_CH);
        let _ = writeln!(cx, "Valid states are ON|OFF|PULSE|1|0");
        return Err(CmdError::Usage);
    }

    let sel = decode_channel(cx, "key", args[0], NUM_KEY_CH)?;

    let Some(&tok) = args.get(1) else {
        for ch in sel.range(NUM_KEY_CH) {
            let _ = writeln!(cx, "{}", u8::from(cx.cache.key[ch]));
        }
        return Ok(());
    };

    let state = decode_state(cx, "key", tok, true)?;
    for ch in sel.range(NUM_KEY_CH) {
        // Keys are active-low.
        match state {
            SwitchState::On => {
                let _ = writeln!(cx, "Switching key {} on", channel_digit(ch));
                cx.board.set_key(ch, false);
                cx.cache.key[ch] = true;
            }
            SwitchState::Off => {
                let _ = writeln!(cx, "Switching key {} off", channel_digit(ch));
                cx.board.set_key(ch, true);
                cx.cache.key[ch] = false;
            }
            SwitchState::Pulse => {
                let _ = writeln!(cx, "Pulsing key {}", channel_digit(ch));
                cx.board.set_key(ch, false);
                cx.clock.delay_us(PULSE_HOLD_US);
                cx.board.set_key(ch, true);
                cx.cache.key[ch] = false;
            }
        }
    }
    Ok(())
}

pub fn cmd_gpio(cx: &mut Context<'_>, args: &[&str]) -> Result<(), CmdError> {
    if args.is_empty() || args.len() > 2 || matches_abbrev(args[0], "help", 1) {
        let _ = writeln!(cx, "Usage: gpio <channel> <state>");
        let _ = writeln!(cx);
        print_channels_line(cx, NUM_GPIO_CH);
        let _ = writeln!(cx, "Valid states are ON|OFF|PULSE|1|0");
        return Err(CmdError::Usage);
    }

    let sel = decode_channel(cx, "gpio", args[0], NUM_GPIO_CH)?;

    let Some(&tok) = args.get(1) else {
        for ch in sel.range(NUM_GPIO_CH) {
            let _ = writeln!(cx, "{}", u8::from(cx.cache.gpio[ch]));
        }
        return Ok(());
    };

    let state = decode_state(cx, "gpio", tok, true)?;
    for ch in sel.range(NUM_GPIO_CH) {
        match state {
            SwitchState::On => {
                let _ = writeln!(cx, "Switching GPIO {} on", channel_digit(ch));
                cx.board.set_gpio(ch, true);
                cx.cache.gpio[ch] = true;
            }
            SwitchState::Off => {
                let _ = writeln!(cx, "Switching GPIO {} off", channel_digit(ch));
                cx.board.set_gpio(ch, false);
                cx.cache.gpio[ch] = false;
            }
            SwitchState::Pulse => {
                let _ = writeln!(cx, "Pulsing GPIO {}", channel_digit(ch));
                cx.board.set_gpio(ch, true);
                cx.clock.delay_us(PULSE_HOLD_US);
                cx.board.set_gpio(ch, false);
                cx.cache.gpio[ch] = false;
            }
        }
    }
    Ok(())
}

pub struct RgbColor {
    pub name: &'static str,
    pub rgb: u32,
}

/// Named colors, matched on the shortest unambiguous prefix. First
/// match wins, so table order settles prefix collisions.
pub const RGB_COLORS: &[RgbColor] = &[
    RgbColor { name: "White", rgb: 0xffffff },
    RgbColor { name: "Red", rgb: 0xff0000 },
    RgbColor { name: "Orange", rgb: 0xff7f00 },
    RgbColor { name: "Yellow", rgb: 0xffff00 },
    RgbColor { name: "Chartreuse", rgb: 0x7fff00 },
    RgbColor { name: "Green", rgb: 0x00ff00 },
    RgbColor { name: "Spring green", rgb: 0x00ff7f },
    RgbColor { name: "CYan", rgb: 0x00ffff },
    RgbColor { name: "Azure", rgb: 0x007fff },
    RgbColor { name: "Blue", rgb: 0x0000ff },
    RgbColor { name: "Violet", rgb: 0x7f00ff },
    RgbColor { name: "Magenta", rgb: 0xff00ff },
    RgbColor { name: "ROse", rgb: 0xff007f },
    RgbColor { name: "BLAck", rgb: 0x000000 },
];

pub fn cmd_rgb(cx: &mut Context<'_>, args: &[&str]) -> Result<(), CmdError> {
    if args.len() == 1 && matches_abbrev(args[0], "list", 1) {
        for color in RGB_COLORS {
            let _ = writeln!(cx, "#{:06x} {}", color.rgb, color.name);
        }
        return Ok(());
    }

    if args.is_empty() || args.len() > 2 || matches_abbrev(args[0], "help", 1) {
        let _ = writeln!(cx, "Usage: rgb <list> | <channel> [<colorname> | #rgb | #rrggbb]");
        let _ = writeln!(cx);
        print_channels_line(cx, NUM_RGB_CH);
        return Err(CmdError::Usage);
    }

    let sel = decode_channel(cx, "rgb", args[0], NUM_RGB_CH)?;

    let Some(&tok) = args.get(1) else {
        for ch in sel.range(NUM_RGB_CH) {
            let rgb = cx.cache.rgb[ch];
            let _ = writeln!(cx, "#{:06x}", rgb);
        }
        return Ok(());
    };

    let mut display = tok;
    let mut rgb = 0u32;
    if !tok.starts_with('#') {
        let mut found = false;
        for color in RGB_COLORS {
            if matches_abbrev(tok, color.name, 1) {
                display = color.name;
                rgb = color.rgb;
                found = true;
                break;
            }
        }
        if !found {
            let _ = writeln!(cx, "Unknown color {}", tok);
            return Err(CmdError::UnknownColor);
        }
    } else {
        let digits = &tok.as_bytes()[1..];
        if digits.len() != 3 && digits.len() != 6 {
            let _ = writeln!(cx, "Invalid RGB color {}", tok);
            return Err(CmdError::InvalidColor);
        }
        for &b in digits {
            let Some(x) = (b as char).to_digit(16) else {
                let _ = writeln!(cx, "Invalid hex number {}", tok);
                return Err(CmdError::InvalidColor);
            };
            rgb = (rgb << 4) | x;
            // #rgb duplicates each nibble to a full byte.
            if digits.len() == 3 {
                rgb = (rgb << 4) | x;
            }
        }
    }

    for ch in sel.range(NUM_RGB_CH) {
        let _ = writeln!(
            cx,
            "Showing color {} on channel {}",
            display,
            channel_letter(ch)
        );
        cx.board.set_rgb(ch, rgb);
        cx.cache.rgb[ch] = rgb;
    }
    Ok(())
}

/// Drive every output to its boot state. The caches start out matching
/// (everything off, keys released).
pub fn init_outputs(cx: &mut Context<'_>) {
    for ch in 0..NUM_POWER_CH {
        cx.board.set_power(ch, false);
    }
    for ch in 0..NUM_KEY_CH {
        cx.board.set_key(ch, true);
    }
    for ch in 0..NUM_GPIO_CH {
        cx.board.set_gpio(ch, false);
    }
    for ch in 0..NUM_RGB_CH {
        cx.board.set_rgb(ch, 0);
    }
}
