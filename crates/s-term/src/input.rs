// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into curses-style key codes. Handles what a
// terminal in keypad mode sends:
//
// - Legacy CSI sequences (arrows, paging and editing keys, F-keys)
// - SS3 sequences (application-mode arrows and F1-F4)
// - Bytes of non-ASCII characters, one key per byte
// - Control bytes (CR is delivered as Enter, like curses with `nl()`)
//
// A multi-byte UTF-8 character arrives as its separate bytes, each a key
// code in 128..=255, the way curses `getch` delivers it. Typed input thus
// never reaches the special-key range at 257.
//
// Modifier variants (`ESC [ 1 ; 5 A` for Ctrl+Up) collapse onto the plain
// key; the reader never distinguishes them. ESC followed by an ordinary
// byte is delivered as Escape and then that byte, which is what curses
// does for Alt-prefixed keys.
//
// # Design
//
// The parser keeps a small byte buffer because escape sequences can span
// multiple `read()` calls. Feed bytes with [`Parser::advance`]. A lone
// ESC stays pending; after the escape delay with no further bytes, call
// [`Parser::flush`] to deliver it as the Escape key.

use crate::key::Key;

/// Incremental key parser.
pub struct Parser {
    /// Accumulated raw bytes waiting to be parsed.
    buf: Vec<u8>,
}

impl Parser {
    /// Create a new parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed raw bytes and return every key that can be decoded.
    ///
    /// Bytes that form an incomplete sequence stay buffered and are
    /// combined with the next call.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Key> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        if pos > 0 {
            self.buf.drain(..pos);
        }

        keys
    }

    /// Are there buffered bytes waiting for the rest of a sequence?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Give up on the pending sequence and deliver its bytes as keys.
    ///
    /// A lone ESC becomes [`Key::ESCAPE`]; other bytes become their own key
    /// codes.
    pub fn flush(&mut self) -> Vec<Key> {
        let keys = self.buf.iter().map(|&b| byte_key(b)).collect();
        self.buf.clear();
        keys
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────
//
// All parse functions read from the start of `buf` and return what they
// found plus how many bytes to consume.

/// Result of trying to parse one key.
enum Parsed {
    /// Decoded a key, consuming `usize` bytes.
    Key(Key, usize),
    /// Sequence is incomplete; need more bytes.
    Incomplete,
    /// Unrecognized byte(s), skip `usize` bytes.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    match buf[0] {
        0x1B => parse_escape(buf),
        b => Parsed::Key(byte_key(b), 1),
    }
}

/// Key for a single input byte.
const fn byte_key(b: u8) -> Key {
    match b {
        b'\r' => Key::ENTER,
        b => Key::from_byte(b),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    debug_assert_eq!(buf[0], 0x1B);

    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        // Anything else: Escape now, the next byte is its own key.
        _ => Parsed::Key(Key::ESCAPE, 1),
    }
}

// ── CSI (Control Sequence Introducer) ───────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'[');

    // Scan for the final byte (0x40..=0x7E).
    // CSI parameter bytes are in 0x30..=0x3F, intermediate in 0x20..=0x2F.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            // Invalid byte in CSI sequence: abort.
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let consumed = end + 1;

    // ── Tilde-terminated sequences (editing keys, function keys) ─────
    if final_byte == b'~' {
        let (first, _) = parse_u16_from(&buf[2..end]);
        let key = match first {
            1 | 7 => Key::HOME,
            2 => Key::INSERT_CHAR,
            3 => Key::DELETE_CHAR,
            4 | 8 => Key::END,
            5 => Key::PAGE_UP,
            6 => Key::PAGE_DOWN,
            11..=15 => Key::f(first_to_u8(first - 10)),
            17..=21 => Key::f(first_to_u8(first - 11)),
            23..=26 => Key::f(first_to_u8(first - 12)),
            28 | 29 => Key::f(first_to_u8(first - 13)),
            31..=34 => Key::f(first_to_u8(first - 14)),
            _ => return Parsed::Skip(consumed),
        };
        return Parsed::Key(key, consumed);
    }

    // ── Letter final bytes ───────────────────────────────────────────
    let key = match final_byte {
        b'A' => Key::UP,
        b'B' => Key::DOWN,
        b'C' => Key::RIGHT,
        b'D' => Key::LEFT,
        b'H' => Key::HOME,
        b'F' => Key::END,
        b'P' => Key::f(1),
        b'Q' => Key::f(2),
        b'R' => Key::f(3),
        b'S' => Key::f(4),
        b'Z' => Key::BACK_TAB,
        _ => return Parsed::Skip(consumed),
    };

    Parsed::Key(key, consumed)
}

/// Function-key numbers are at most 20, so the narrowing never truncates.
#[allow(clippy::cast_possible_truncation)]
const fn first_to_u8(n: u16) -> u8 {
    n as u8
}

// ── SS3 (Single Shift 3) ───────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    debug_assert!(buf.len() >= 2 && buf[0] == 0x1B && buf[1] == b'O');

    if buf.len() < 3 {
        return Parsed::Incomplete;
    }

    let key = match buf[2] {
        b'A' => Key::UP,
        b'B' => Key::DOWN,
        b'C' => Key::RIGHT,
        b'D' => Key::LEFT,
        b'H' => Key::HOME,
        b'F' => Key::END,
        b'M' => Key::ENTER,
        b'P' => Key::f(1),
        b'Q' => Key::f(2),
        b'R' => Key::f(3),
        b'S' => Key::f(4),
        _ => return Parsed::Skip(3),
    };

    Parsed::Key(key, 3)
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Parse a u16 from the start of a byte slice.
/// Returns `(value, remaining_bytes)`.
fn parse_u16_from(buf: &[u8]) -> (u16, &[u8]) {
    let mut val: u16 = 0;
    let mut pos = 0;
    while pos < buf.len() && buf[pos].is_ascii_digit() {
        val = val
            .saturating_mul(10)
            .saturating_add(u16::from(buf[pos] - b'0'));
        pos += 1;
    }
    (val, &buf[pos..])
}

// ─── Tests ──────────────────────────────────────────────────────────────────
