// SPDX-License-Identifier: MIT
//
// FrameBuffer: the virtual screen every drawing call writes to.
//
// `add_char`, `add_string` and friends never touch the terminal. They
// stamp cells into this grid, and `refresh` hands the grid to the diff
// renderer, which compares it against the previous frame and emits only
// the changes.
//
// Design:
//
//   - Flat `Vec<Cell>` with row-major indexing. A row's cells are
//     contiguous in memory, so left-to-right iteration (which the renderer
//     does) is a linear scan.
//
//   - Wide characters (CJK, some emoji) occupy two columns. The first cell
//     holds the codepoint; the second is a continuation cell (ch = 0).
//     Writes that land on either half break the wide character so no
//     orphaned halves reach the terminal.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Cell, Pen};

// ─── FrameBuffer ────────────────────────────────────────────────────────────────

/// A 2D grid of terminal cells.
///
/// Coordinates are `(x, y)` = `(column, row)`, zero-based.
///
/// # Examples
///
/// ```
/// use s_term::buffer::FrameBuffer;
/// use s_term::cell::Cell;
///
/// let mut buf = FrameBuffer::new(80, 24);
/// assert_eq!(buf.width(), 80);
/// assert_eq!(buf.height(), 24);
///
/// buf.set(5, 3, Cell::new('X'));
/// assert_eq!(buf.get(5, 3).unwrap().character(), Some('X'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a buffer filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Buffer width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` is within the buffer.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Convert `(x, y)` to a flat index.
    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell reference, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// A single row as a slice. Returns `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    // ─── Clear, Resize, Copy ─────────────────────────────────────────────

    /// Blank every cell.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Resize the buffer, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    /// Make this buffer an exact copy of `other`, reusing the allocation.
    pub fn copy_from(&mut self, other: &Self) {
        self.width = other.width;
        self.height = other.height;
        self.cells.clone_from(&other.cells);
    }

    // ─── Writing ─────────────────────────────────────────────────────────

    /// Write a cell directly. No wide-char cleanup.
    ///
    /// Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Break any wide character that touches position `(x, y)`.
    ///
    /// - If `(x, y)` is a continuation cell, replaces the owner at `(x-1)`
    ///   with a space.
    /// - If the cell after `(x, y)` is a continuation, it was part of a
    ///   wide char starting here, so clear the orphaned continuation.
    fn break_wide_char_at(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);

        if self.cells[idx].is_continuation() && x > 0 {
            let prev = self.index(x - 1, y);
            self.cells[prev].ch = u32::from(b' ');
        }

        if x + 1 < self.width {
            let next = self.index(x + 1, y);
            if self.cells[next].is_continuation() {
                self.cells[next] = Cell::EMPTY;
            }
        }
    }

    /// Put one printable character at `(x, y)` with `pen`.
    ///
    /// Returns the number of columns used: 0 for zero-width characters
    /// and out-of-bounds positions, 1 for narrow characters, 2 for wide
    /// ones. A wide character that would straddle the right edge is
    /// replaced by a space and uses one column.
    pub fn put_char(&mut self, x: u16, y: u16, ch: char, pen: Pen) -> u16 {
        if !self.in_bounds(x, y) {
            return 0;
        }

        let char_w = char_width(ch);
        if char_w == 0 {
            return 0;
        }

        if char_w == 2 && x + 1 >= self.width {
            self.break_wide_char_at(x, y);
            let idx = self.index(x, y);
            self.cells[idx] = Cell::styled(' ', pen);
            return 1;
        }

        self.break_wide_char_at(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = Cell::styled(ch, pen);

        if char_w == 2 {
            self.break_wide_char_at(x + 1, y);
            self.cells[idx + 1] = Cell::continuation(pen);
            return 2;
        }
        1
    }

    /// Blank from `(x, y)` to the end of row `y`.
    pub fn clear_to_eol(&mut self, x: u16, y: u16) {
        if !self.in_bounds(x, y) {
            return;
        }
        self.break_wide_char_at(x, y);
        let start = self.index(x, y);
        let end = self.index(0, y) + usize::from(self.width);
        for cell in &mut self.cells[start..end] {
            cell.reset();
        }
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width Utilities ───────────────────────────────────────────────────────

/// Display width of a character in terminal columns.
///
/// Returns 0 for control and combining characters, 1 for most characters,
/// and 2 for wide characters (CJK, some emoji).
///
/// # Examples
///
/// ```
/// use s_term::buffer::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\u{0301}'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    if ch.is_control() {
        return 0;
    }
    ch.width().unwrap_or(0)
}

/// Display width of a string in terminal columns.
///
/// # Examples
///
/// ```
/// use s_term::buffer::string_width;
///
/// assert_eq!(string_width("hello"), 5);
/// assert_eq!(string_width("中文"), 4);
/// ```
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// ─── Tests ──────────────────────────────────────────────────────────────────────
