// SPDX-License-Identifier: MIT
//
// Cell: one character position on the virtual screen.
//
// A cell holds a Unicode codepoint, the color pair it was drawn with, and
// its attribute bits. Colors are not resolved here: the pair index is
// looked up in the screen's palette when a frame is rendered, which is
// exactly how curses keeps `COLOR_PAIR(n)` in the character attributes.
//
// Wide characters (CJK, some emoji) occupy two columns. The first cell
// holds the codepoint; the second is a continuation cell (ch = 0). The
// renderer skips continuation cells when outputting characters but still
// applies their pair so the background fills correctly.

use crate::color::{PairIndex, Style};

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// ```
    /// use s_term::cell::Attr;
    ///
    /// let attrs = Attr::BOLD;
    /// assert!(attrs.contains(Attr::BOLD));
    /// assert!(!Attr::empty().contains(Attr::BOLD));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1, increased intensity.
        const BOLD = 1 << 0;
    }
}

impl Attr {
    /// The attribute bits a decoded style carries.
    #[inline]
    #[must_use]
    pub const fn of(style: Style) -> Self {
        if style.bold { Self::BOLD } else { Self::empty() }
    }
}

// ─── Pen ─────────────────────────────────────────────────────────────────────

/// The active drawing attribute: what new cells are stamped with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Pen {
    pub pair: PairIndex,
    pub attrs: Attr,
}

impl Pen {
    /// The pen for a decoded style.
    #[inline]
    #[must_use]
    pub const fn from_style(style: Style) -> Self {
        Self {
            pair: style.pair(),
            attrs: Attr::of(style),
        }
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell.
///
/// # Wide Characters
///
/// Characters that occupy two terminal columns use a **continuation
/// cell**: the first cell holds the codepoint, the second has `ch = 0`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Unicode codepoint to display.
    ///
    /// - `0` = continuation cell (second column of a wide character)
    /// - `b' '` (32) = empty / space (the default)
    pub ch: u32,

    /// Color pair, resolved through the palette at render time.
    pub pair: PairIndex,

    /// Text attributes.
    pub attrs: Attr,
}

/// Continuation marker: a cell whose `ch` is 0 belongs to the preceding
/// wide character and should not produce character output.
const CONTINUATION: u32 = 0;

/// Default character for empty cells.
const SPACE: u32 = b' ' as u32;

impl Cell {
    /// An empty cell: space character, default pair, no attributes.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        pair: PairIndex::DEFAULT,
        attrs: Attr::empty(),
    };

    /// A cell with a character and default styling.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: ch as u32,
            pair: PairIndex::DEFAULT,
            attrs: Attr::empty(),
        }
    }

    /// A cell drawn with `pen`.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, pen: Pen) -> Self {
        Self {
            ch: ch as u32,
            pair: pen.pair,
            attrs: pen.attrs,
        }
    }

    /// Continuation cell for the second column of a wide character.
    #[inline]
    #[must_use]
    pub const fn continuation(pen: Pen) -> Self {
        Self {
            ch: CONTINUATION,
            pair: pen.pair,
            attrs: pen.attrs,
        }
    }

    // ─── Queries ──────────────────────────────────────────────────────────

    /// Whether this is a continuation cell (second column of a wide char).
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// Whether this cell is visually empty (space, default pair, no attrs).
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.ch == SPACE && self.pair.is_default() && self.attrs.is_empty()
    }

    /// The Unicode codepoint as a `char`, if valid.
    ///
    /// Returns `None` for continuation cells.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == CONTINUATION {
            return None;
        }
        char::from_u32(self.ch)
    }

    /// The pen this cell was drawn with.
    #[inline]
    #[must_use]
    pub const fn pen(self) -> Pen {
        Pen {
            pair: self.pair,
            attrs: self.attrs,
        }
    }

    /// Reset this cell to empty.
    #[inline]
    pub const fn reset(&mut self) {
        *self = Self::EMPTY;
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            return write!(f, "Cell(continuation)");
        }
        let ch = char::from_u32(self.ch).unwrap_or('?');
        write!(f, "Cell({ch:?}")?;
        if !self.pair.is_default() {
            write!(f, ", pair={}", self.pair.get())?;
        }
        if !self.attrs.is_empty() {
            write!(f, ", {:?}", self.attrs)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorCode;
    use std::mem;

    #[test]
    fn cell_is_small() {
        assert_eq!(mem::size_of::<Cell>(), 8);
        assert_eq!(mem::size_of::<Attr>(), 1);
    }

    #[test]
    fn default_cell_is_empty() {
        let cell = Cell::default();
        assert!(cell.is_empty());
        assert_eq!(cell, Cell::EMPTY);
        assert_eq!(cell.character(), Some(' '));
    }

    #[test]
    fn pen_from_bold_style() {
        let pen = Pen::from_style(ColorCode::from(0x09).decode());
        assert_eq!(pen.pair.get(), 2);
        assert_eq!(pen.attrs, Attr::BOLD);
    }

    #[test]
    fn pen_from_plain_style() {
        let pen = Pen::from_style(ColorCode::from(0x23).decode());
        assert_eq!(pen.pair.get(), 20);
        assert!(pen.attrs.is_empty());
    }

    #[test]
    fn styled_cell_is_not_empty() {
        let pen = Pen::from_style(ColorCode::from(0x07).decode());
        let cell = Cell::styled(' ', pen);
        assert_eq!(cell.character(), Some(' '));
        assert!(!cell.is_empty());
        assert_eq!(cell.pen(), pen);
    }

    #[test]
    fn continuation_keeps_pen() {
        let pen = Pen::from_style(ColorCode::from(0x19).decode());
        let cell = Cell::continuation(pen);
        assert!(cell.is_continuation());
        assert_eq!(cell.character(), None);
        assert_eq!(cell.pen(), pen);
    }

    #[test]
    fn reset_clears_everything() {
        let mut cell = Cell::styled('X', Pen::from_style(ColorCode::from(0x4B).decode()));
        cell.reset();
        assert!(cell.is_empty());
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Cell::new('A')), "Cell('A')");
        let cell = Cell::styled('A', Pen::from_style(ColorCode::from(0x09).decode()));
        let dbg = format!("{cell:?}");
        assert!(dbg.contains("pair=2"));
        assert!(dbg.contains("BOLD"));
        assert_eq!(
            format!("{:?}", Cell::continuation(Pen::default())),
            "Cell(continuation)"
        );
    }
}
