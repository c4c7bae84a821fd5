// SPDX-License-Identifier: MIT
//
// Output buffering and stateful cell rendering.
//
// Two components work together to minimize terminal I/O:
//
//   OutputBuffer accumulates all ANSI bytes in memory so the entire frame
//   can be written in a single write() call.
//
//   CellWriter tracks the terminal's current state (cursor position, color
//   pair, attributes) and skips redundant escape sequences. Cells store a
//   pair index, not colors; the writer resolves the pair through the palette
//   only when the pair actually changes.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell};
use crate::color::{Color, PairIndex, Palette};
use crate::config::ColorSupport;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()` call.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write a Unicode codepoint as UTF-8. Invalid codepoints produce `?`.
    pub fn write_codepoint(&mut self, cp: u32) {
        match char::from_u32(cp).filter(|&ch| ch != '\0') {
            Some(ch) => {
                let mut enc = [0u8; 4];
                let s = ch.encode_utf8(&mut enc);
                self.buf.extend_from_slice(s.as_bytes());
            }
            None => self.buf.push(b'?'),
        }
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to `w`, flush it, and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Stateful cell renderer that tracks terminal state to skip redundant escapes.
///
/// - **Cursor**: skipped when the next cell is at `(last_x + 1, last_y)`.
/// - **Attributes**: on change, reset (SGR 0) + re-emit, which also
///   invalidates the tracked pair. Going from no attributes to some skips
///   the reset.
/// - **Pair**: colors are re-emitted only when the pair changes.
/// - **Wide chars**: continuation cells skip output when preceded by their
///   wide char start.
#[allow(clippy::struct_field_names)]
pub struct CellWriter {
    palette: Palette,
    colors: ColorSupport,
    last_x: i32,
    last_y: i32,
    last_pair: Option<PairIndex>,
    last_attrs: Attr,
}

impl CellWriter {
    /// Create a writer with no tracked state.
    #[must_use]
    pub const fn new(palette: Palette, colors: ColorSupport) -> Self {
        Self {
            palette,
            colors,
            last_x: -1,
            last_y: -1,
            last_pair: None,
            last_attrs: Attr::empty(),
        }
    }

    /// The palette pairs are resolved through.
    #[inline]
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Forget everything about the terminal's state. Call after a reset or
    /// screen clear.
    pub const fn reset_state(&mut self) {
        self.last_x = -1;
        self.last_y = -1;
        self.last_pair = None;
        self.last_attrs = Attr::empty();
    }

    /// Concrete colors for `pair`. `None` means the terminal default.
    fn resolve(&self, pair: PairIndex) -> (Option<Color>, Option<Color>) {
        match self.colors {
            ColorSupport::Monochrome => (None, None),
            ColorSupport::Ansi => self
                .palette
                .get(pair)
                .map_or((None, None), |(fg, bg)| (Some(fg), Some(bg))),
        }
    }

    /// Render a single cell, emitting only the escape sequences needed.
    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        let xi = i32::from(x);
        let yi = i32::from(y);

        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y).ok();
        }

        if cell.is_continuation() {
            // The wide char start just drew this column too.
            if xi > 0 && self.last_x == xi - 1 && self.last_y == yi {
                self.last_x = xi;
                return;
            }
            self.apply_style(out, cell);
            out.buf.push(b' ');
            self.last_x = xi;
            self.last_y = yi;
            return;
        }

        self.apply_style(out, cell);
        out.write_codepoint(cell.ch);

        self.last_x = xi;
        self.last_y = yi;
    }

    /// Apply attribute and pair changes for a cell.
    fn apply_style(&mut self, out: &mut OutputBuffer, cell: &Cell) {
        if cell.attrs != self.last_attrs {
            if !self.last_attrs.is_empty() {
                // SGR 0 clears colors too.
                ansi::reset(out).ok();
                self.last_pair = None;
            }
            self.last_attrs = cell.attrs;
            ansi::attrs(out, cell.attrs).ok();
        }

        if self.last_pair != Some(cell.pair) {
            let (fg, bg) = self.resolve(cell.pair);
            ansi::fg(out, fg).ok();
            ansi::bg(out, bg).ok();
            self.last_pair = Some(cell.pair);
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
