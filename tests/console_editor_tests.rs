//! Line editor tests: echo, editing keys, escape sequences, history
//! browsing and mode interrupts, all driven byte by byte.

mod common;

use common::{BoardOp, Fixture};
use rust_farm_bcu::console::LineEditor;
use rust_farm_bcu::{ConsoleMode, Context};

fn feed_str(ed: &mut LineEditor, cx: &mut Context<'_>, s: &str) {
    for &b in s.as_bytes() {
        ed.feed(b, cx);
    }
}

#[test]
fn test_typing_a_command_with_backspace_correction() {
    let mut f = Fixture::new();
    let out = f.output();
    let ops = f.ops();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "powet\x7fr a on\r");

    // Echo, erase sequence, the command's own output, then the prompt.
    assert_eq!(
        out.text(),
        "powet\u{8} \u{8}r a on\n\rPowering channel A on\n\rbcu> "
    );
    assert_eq!(ops.all(), vec![BoardOp::Power(0, true)]);
    assert!(cx.cache.power[0]);
}

#[test]
fn test_tab_acts_as_space() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "power\ta\ton\r");
    assert!(out.contains("power a on"));
    assert!(out.contains("Powering channel A on"));
}

#[test]
fn test_enter_on_blank_line_just_reissues_prompt() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "\r");
    assert_eq!(out.text(), "\n\rbcu> ");
    assert!(cx.history.is_empty());
}

#[test]
fn test_insert_mid_line_redraws_only_the_tail() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    // Type with a letter missing, go home, step right, insert it.
    feed_str(&mut ed, &mut cx, "elp");
    feed_str(&mut ed, &mut cx, "\x1b[1~");
    out.clear();
    feed_str(&mut ed, &mut cx, "h");
    // The whole tail is repainted and the cursor walked back.
    assert_eq!(out.text(), "help\u{8}\u{8}\u{8}");
    feed_str(&mut ed, &mut cx, "\x1b[4~\r");
    assert!(out.contains("Valid commands are:"));
}

#[test]
fn test_delete_forward_under_cursor() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    // Kill the stray leading character with Delete, the CSI 3 ~ form.
    feed_str(&mut ed, &mut cx, "xhelp");
    feed_str(&mut ed, &mut cx, "\x1b[1~");
    feed_str(&mut ed, &mut cx, "\x1b[3~");
    feed_str(&mut ed, &mut cx, "\r");
    assert!(out.contains("Valid commands are:"));
    assert!(!out.contains("Unknown command"));
}

#[test]
fn test_ctrl_d_deletes_under_cursor() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "xhelp");
    feed_str(&mut ed, &mut cx, "\x01\x04\r");
    assert!(out.contains("Valid commands are:"));
}

#[test]
fn test_ctrl_w_kills_the_word_left_of_the_cursor() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "rgb a redd");
    out.clear();
    feed_str(&mut ed, &mut cx, "\x17");
    // Four characters erased: walk back, blank, walk back again.
    assert_eq!(out.text(), "\u{8}\u{8}\u{8}\u{8}    \u{8}\u{8}\u{8}\u{8}");
    feed_str(&mut ed, &mut cx, "red\r");
    assert!(out.contains("Showing color Red on channel A"));
    assert_eq!(cx.cache.rgb[0], 0xff0000);
}

#[test]
fn test_backspace_on_empty_line_rings_the_bell() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "\x7f");
    assert_eq!(out.text(), "\u{7}");
}

#[test]
fn test_cursor_movement_echo_and_bounds() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "ab");
    // Two lefts land at the start; the third rings the bell.
    feed_str(&mut ed, &mut cx, "\x1b[D\x1b[D\x1b[D");
    // Walking right re-echoes the characters; past the end rings again.
    feed_str(&mut ed, &mut cx, "\x1b[C\x1b[C\x1b[C");
    assert_eq!(out.text(), "ab\u{8}\u{8}\u{7}ab\u{7}");
}

#[test]
fn test_ctrl_l_repaints_prompt_and_line() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "ab\x0c");
    assert!(out.text().ends_with("\n\rbcu> ab"));
}

#[test]
fn test_line_at_capacity_rings_the_bell() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    for _ in 0..80 {
        ed.feed(b'a', &mut cx);
    }
    assert_eq!(out.count("\u{7}"), 0);
    ed.feed(b'a', &mut cx);
    assert_eq!(out.count("\u{7}"), 1);
}

#[test]
fn test_history_recall_and_rerun() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "version\r");
    feed_str(&mut ed, &mut cx, "\x1b[A\r");
    assert_eq!(out.count("bcu version"), 2);
}

#[test]
fn test_history_browse_restores_the_unsent_line() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "help\r");
    out.clear();

    // Start a new line, browse up, then come back down: the half-typed
    // line must come back.
    feed_str(&mut ed, &mut cx, "ver");
    feed_str(&mut ed, &mut cx, "\x1b[A");
    assert!(out.text().ends_with("\u{8}\u{8}\u{8}help"));
    feed_str(&mut ed, &mut cx, "\x1b[B");
    feed_str(&mut ed, &mut cx, "sion\r");
    assert!(out.contains("bcu version"));
    assert!(!out.contains("Unknown command"));
}

#[test]
fn test_history_past_the_oldest_entry_rings_the_bell() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    // Nothing recorded yet: both directions just ring.
    feed_str(&mut ed, &mut cx, "\x1b[A");
    feed_str(&mut ed, &mut cx, "\x1b[B");
    assert_eq!(out.text(), "\u{7}\u{7}");

    feed_str(&mut ed, &mut cx, "help\r");
    out.clear();
    feed_str(&mut ed, &mut cx, "\x1b[A");
    feed_str(&mut ed, &mut cx, "\x1b[A");
    assert_eq!(out.count("\u{7}"), 1);
}

#[test]
fn test_history_command_lists_the_session() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "version\r");
    feed_str(&mut ed, &mut cx, "history\r");
    assert!(out.contains(" 1: version"));
    assert!(out.contains(" 2: history"));
}

#[test]
fn test_unknown_escape_sequences_are_dropped() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    // ESC x and ESC [ Z must vanish without touching the line.
    feed_str(&mut ed, &mut cx, "\x1bx");
    feed_str(&mut ed, &mut cx, "hel");
    feed_str(&mut ed, &mut cx, "\x1b[Z");
    feed_str(&mut ed, &mut cx, "p\r");
    assert!(out.contains("Valid commands are:"));
    assert!(!out.contains("Unknown command"));
}

#[test]
fn test_pgup_is_consumed_with_its_terminator() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    // CSI 5 ~ does nothing, but the ~ must not reach the line.
    feed_str(&mut ed, &mut cx, "\x1b[5~help\r");
    assert!(out.contains("Valid commands are:"));
    assert!(!out.contains("Unexpected CSI terminator"));
}

#[test]
fn test_stray_csi_terminator_byte_is_flagged() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "\x1b[5x");
    assert!(out.contains("Unexpected CSI terminator 0x78"));
}

#[test]
fn test_unhandled_control_byte_is_flagged() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    ed.feed(0x02, &mut cx);
    assert!(out.contains("Unhandled special character 0x2"));
}

#[test]
fn test_ctrl_c_interrupts_monitor_mode() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "monitor\r");
    assert_eq!(cx.mode, ConsoleMode::Monitor);
    out.clear();

    // Ordinary input is dropped while the monitor owns the console.
    feed_str(&mut ed, &mut cx, "xyz");
    assert_eq!(out.text(), "");

    ed.feed(0x03, &mut cx);
    assert_eq!(cx.mode, ConsoleMode::Command);
    assert_eq!(out.text(), "^C\n\rbcu> ");
}

#[test]
fn test_ctrl_c_discards_the_pending_line() {
    let mut f = Fixture::new();
    let out = f.output();
    let mut cx = f.context();
    let mut ed = LineEditor::new();

    feed_str(&mut ed, &mut cx, "pow\x03");
    feed_str(&mut ed, &mut cx, "help\r");
    assert!(out.contains("Valid commands are:"));
    assert!(!out.contains("Unknown command"));
}
