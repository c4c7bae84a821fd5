// SPDX-License-Identifier: MIT
//
// Alternate character set: line-drawing and symbol glyphs.
//
// Curses names its box-drawing glyphs after the VT100 "special graphics"
// character each one lives on: `l` is the upper-left corner, `q` the
// horizontal line, `,` the left arrow, and so on. Callers keep using those
// code bytes; this table turns them into something a modern terminal can
// draw. Unicode terminals get the real glyphs, everything else gets the
// same ASCII approximations curses falls back to.

use std::fmt;

/// Which rendering of the glyph table to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcsStyle {
    /// Unicode box-drawing and symbol characters.
    #[default]
    Unicode,
    /// Plain ASCII approximations.
    Ascii,
}

/// A named alternate-character-set glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Acs {
    Diamond,
    Checkerboard,
    Degree,
    PlusMinus,
    Board,
    Lantern,
    LowerRightCorner,
    UpperRightCorner,
    UpperLeftCorner,
    LowerLeftCorner,
    Plus,
    ScanLine1,
    ScanLine3,
    HorizontalLine,
    ScanLine7,
    ScanLine9,
    LeftTee,
    RightTee,
    BottomTee,
    TopTee,
    VerticalLine,
    LessEqual,
    GreaterEqual,
    Pi,
    NotEqual,
    Sterling,
    Bullet,
    LeftArrow,
    RightArrow,
    DownArrow,
    UpArrow,
    Block,
}

/// `(glyph, code byte, unicode, ascii)` for every glyph.
const TABLE: [(Acs, u8, char, char); 32] = [
    (Acs::Diamond, b'`', '◆', '*'),
    (Acs::Checkerboard, b'a', '▒', ':'),
    (Acs::Degree, b'f', '°', '\''),
    (Acs::PlusMinus, b'g', '±', '#'),
    (Acs::Board, b'h', '▒', '#'),
    (Acs::Lantern, b'i', '☃', '#'),
    (Acs::LowerRightCorner, b'j', '┘', '+'),
    (Acs::UpperRightCorner, b'k', '┐', '+'),
    (Acs::UpperLeftCorner, b'l', '┌', '+'),
    (Acs::LowerLeftCorner, b'm', '└', '+'),
    (Acs::Plus, b'n', '┼', '+'),
    (Acs::ScanLine1, b'o', '⎺', '~'),
    (Acs::ScanLine3, b'p', '⎻', '-'),
    (Acs::HorizontalLine, b'q', '─', '-'),
    (Acs::ScanLine7, b'r', '⎼', '-'),
    (Acs::ScanLine9, b's', '⎽', '_'),
    (Acs::LeftTee, b't', '├', '+'),
    (Acs::RightTee, b'u', '┤', '+'),
    (Acs::BottomTee, b'v', '┴', '+'),
    (Acs::TopTee, b'w', '┬', '+'),
    (Acs::VerticalLine, b'x', '│', '|'),
    (Acs::LessEqual, b'y', '≤', '<'),
    (Acs::GreaterEqual, b'z', '≥', '>'),
    (Acs::Pi, b'{', 'π', '*'),
    (Acs::NotEqual, b'|', '≠', '!'),
    (Acs::Sterling, b'}', '£', 'f'),
    (Acs::Bullet, b'~', '·', 'o'),
    (Acs::LeftArrow, b',', '←', '<'),
    (Acs::RightArrow, b'+', '→', '>'),
    (Acs::DownArrow, b'.', '↓', 'v'),
    (Acs::UpArrow, b'-', '↑', '^'),
    (Acs::Block, b'0', '▮', '#'),
];

impl Acs {
    /// Every glyph, in table order.
    pub fn all() -> impl Iterator<Item = Self> {
        TABLE.iter().map(|&(glyph, ..)| glyph)
    }

    /// Look up a glyph by its VT100 code byte (`'l'`, `'q'`, `','` …).
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        TABLE
            .iter()
            .find(|&&(_, byte, ..)| char::from(byte) == code)
            .map(|&(glyph, ..)| glyph)
    }

    /// The VT100 code byte for this glyph.
    #[must_use]
    pub fn code(self) -> char {
        char::from(self.entry().1)
    }

    /// The character to draw for this glyph in `style`.
    #[must_use]
    pub fn render(self, style: AcsStyle) -> char {
        let (_, _, unicode, ascii) = self.entry();
        match style {
            AcsStyle::Unicode => unicode,
            AcsStyle::Ascii => ascii,
        }
    }

    fn entry(self) -> (Self, u8, char, char) {
        // The table covers every variant, so this always finds one.
        TABLE
            .iter()
            .copied()
            .find(|&(glyph, ..)| glyph == self)
            .unwrap_or((self, b' ', ' ', ' '))
    }
}

impl fmt::Display for Acs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(AcsStyle::Unicode))
    }
}

/// Translate a raw ACS code byte. Codes outside the table pass through
/// unchanged, so a plain character can be handed to `add_acs` as well.
#[must_use]
pub fn translate(code: char, style: AcsStyle) -> char {
    Acs::from_code(code).map_or(code, |glyph| glyph.render(style))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
