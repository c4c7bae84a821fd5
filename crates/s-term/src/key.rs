// SPDX-License-Identifier: MIT
//
// Key codes returned by `Screen::getch`.
//
// A key is a single integer, numbered the way curses `getch` numbers them:
// every typed byte is its own code in 0..=255 (a non-ASCII character
// arrives as its UTF-8 bytes), and special keys (arrows, paging, function
// keys, resize) live in the out-of-band range starting at 257. The two
// ranges never overlap. Code that was written against curses key
// constants keeps working unchanged.

use std::fmt;

/// A key press, as an integer key code.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(i32);

/// First code of the special-key range.
const SPECIAL_BASE: i32 = 0o401;

impl Key {
    pub const CTRL_A: Self = Self(1);
    pub const CTRL_B: Self = Self(2);
    pub const CTRL_C: Self = Self(3);
    pub const CTRL_D: Self = Self(4);
    pub const CTRL_E: Self = Self(5);
    pub const CTRL_F: Self = Self(6);
    pub const CTRL_G: Self = Self(7);
    pub const CTRL_H: Self = Self(8);
    pub const CTRL_I: Self = Self(9);
    pub const CTRL_J: Self = Self(10);
    pub const CTRL_K: Self = Self(11);
    pub const CTRL_L: Self = Self(12);
    pub const CTRL_M: Self = Self(13);
    pub const CTRL_N: Self = Self(14);
    pub const CTRL_O: Self = Self(15);
    pub const CTRL_P: Self = Self(16);
    pub const CTRL_Q: Self = Self(17);
    pub const CTRL_R: Self = Self(18);
    pub const CTRL_S: Self = Self(19);
    pub const CTRL_T: Self = Self(20);
    pub const CTRL_U: Self = Self(21);
    pub const CTRL_V: Self = Self(22);
    pub const CTRL_W: Self = Self(23);
    pub const CTRL_X: Self = Self(24);
    pub const CTRL_Y: Self = Self(25);
    pub const CTRL_Z: Self = Self(26);
    pub const TAB: Self = Self(9);
    pub const ENTER: Self = Self(10);
    pub const ESCAPE: Self = Self(27);
    /// The DEL byte most terminals send for the Backspace key.
    pub const DELETE: Self = Self(127);

    pub const DOWN: Self = Self(258);
    pub const UP: Self = Self(259);
    pub const LEFT: Self = Self(260);
    pub const RIGHT: Self = Self(261);
    pub const HOME: Self = Self(262);
    pub const BACKSPACE: Self = Self(263);
    /// Base of the function keys: `F(n)` is `F0 + n`.
    pub const F0: Self = Self(264);
    pub const DELETE_CHAR: Self = Self(330);
    pub const INSERT_CHAR: Self = Self(331);
    pub const PAGE_DOWN: Self = Self(338);
    pub const PAGE_UP: Self = Self(339);
    pub const BACK_TAB: Self = Self(353);
    pub const END: Self = Self(360);
    /// Delivered by `getch` after the terminal changed size.
    pub const RESIZE: Self = Self(410);

    /// Wrap a raw key code.
    #[inline]
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        Self(code)
    }

    /// The key for one typed byte.
    #[inline]
    #[must_use]
    pub const fn from_byte(b: u8) -> Self {
        Self(b as i32)
    }

    /// Function key `n` (F1 is `Key::f(1)`).
    #[inline]
    #[must_use]
    pub const fn f(n: u8) -> Self {
        Self(Self::F0.0 + n as i32)
    }

    /// The integer key code.
    #[inline]
    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Whether this is an out-of-band special key (arrows, F-keys, …).
    #[inline]
    #[must_use]
    pub const fn is_special(self) -> bool {
        self.0 >= SPECIAL_BASE && self.0 < SPECIAL_BASE + 256
    }

    /// The byte this key types, if it is not a special key.
    #[must_use]
    pub fn as_byte(self) -> Option<u8> {
        u8::try_from(self.0).ok()
    }

    /// Function key number, if this is one of F0–F63.
    #[must_use]
    pub fn function_number(self) -> Option<u8> {
        let n = self.0 - Self::F0.0;
        if (0..64).contains(&n) {
            u8::try_from(n).ok()
        } else {
            None
        }
    }

    fn special_name(self) -> Option<&'static str> {
        let name = match self {
            Self::DOWN => "Down",
            Self::UP => "Up",
            Self::LEFT => "Left",
            Self::RIGHT => "Right",
            Self::HOME => "Home",
            Self::BACKSPACE => "Backspace",
            Self::DELETE_CHAR => "Delete",
            Self::INSERT_CHAR => "Insert",
            Self::PAGE_DOWN => "PageDown",
            Self::PAGE_UP => "PageUp",
            Self::BACK_TAB => "BackTab",
            Self::END => "End",
            Self::RESIZE => "Resize",
            _ => return None,
        };
        Some(name)
    }
}

impl From<u8> for Key {
    fn from(b: u8) -> Self {
        Self::from_byte(b)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.special_name() {
            return f.write_str(name);
        }
        if let Some(n) = self.function_number() {
            return write!(f, "F{n}");
        }
        match *self {
            Self::TAB => f.write_str("Tab"),
            Self::ENTER => f.write_str("Enter"),
            Self::ESCAPE => f.write_str("Escape"),
            Self::DELETE => f.write_str("DEL"),
            Self(code @ 0) => write!(f, "^@ ({code})"),
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Self(code @ 1..=26) => write!(f, "Ctrl-{}", (b'A' + code as u8 - 1) as char),
            key => match key.as_byte() {
                Some(b) if b.is_ascii() => write!(f, "{:?}", char::from(b)),
                Some(b) => write!(f, "byte {b:#04x}"),
                None => write!(f, "key {}", key.0),
            },
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({} = {self})", self.0)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
