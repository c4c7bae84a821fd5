// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit; that's the `CellWriter`'s job. This module
// just knows the byte-level encoding of every terminal command we need.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
use std::io::{self, Write};

use crate::cell::Attr;
use crate::color::Color;

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR attributes to terminal defaults (SGR 0).
///
/// The stateful renderer must invalidate its tracked state after calling this.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Set the foreground color: SGR 30–37, or 39 for the terminal default.
pub fn fg(w: &mut impl Write, color: Option<Color>) -> io::Result<()> {
    match color {
        None => w.write_all(b"\x1b[39m"),
        Some(c) => write!(w, "\x1b[{}m", 30 + c.index()),
    }
}

/// Set the background color: SGR 40–47, or 49 for the terminal default.
pub fn bg(w: &mut impl Write, color: Option<Color>) -> io::Result<()> {
    match color {
        None => w.write_all(b"\x1b[49m"),
        Some(c) => write!(w, "\x1b[{}m", 40 + c.index()),
    }
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

/// Emit SGR codes for text attributes. Does nothing if none are set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    if attr.contains(Attr::BOLD) {
        w.write_all(b"\x1b[1m")?;
    }
    Ok(())
}

// ─── Synchronized Output ─────────────────────────────────────────────────────

/// Begin synchronized output (DEC Private Mode 2026).
///
/// Tells the terminal to buffer all subsequent output until [`end_sync`].
/// Terminals that don't know the mode ignore it.
#[inline]
pub fn begin_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026h")
}

/// End synchronized output. The terminal renders the buffered frame.
#[inline]
pub fn end_sync(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?2026l")
}

// ─── Alternate Screen ───────────────────────────────────────────────────────

/// Enter the alternate screen buffer (DEC Private Mode 1049).
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Exit the alternate screen buffer and restore original content.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Keypad ─────────────────────────────────────────────────────────────────

/// Application cursor keys (DECCKM) plus application keypad (DECKPAM).
///
/// This is what curses sends for `keypad(stdscr, TRUE)`: arrows arrive as
/// `ESC O A` style sequences, which the input parser decodes either way.
#[inline]
pub fn keypad_on(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1h\x1b=")
}

/// Back to normal cursor keys and numeric keypad.
#[inline]
pub fn keypad_off(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1l\x1b>")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
