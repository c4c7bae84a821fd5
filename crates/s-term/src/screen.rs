// SPDX-License-Identifier: MIT
//
// Screen: the handle every other part of the reader draws through.
//
// A curses program has one implicit screen and one "current attribute".
// Here both live in a `Screen` value: it owns the terminal mode (restored
// on `exit`, drop, or panic), the virtual screen drawing calls write to,
// the renderer that pushes changes out on `refresh`, and the input side
// that turns bytes into key codes for `getch`.
//
// Coordinates in this API are `(row, col)`, as in curses. The frame buffer
// underneath uses `(x, y)`.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::acs;
use crate::buffer::FrameBuffer;
use crate::cell::{Cell, Pen};
use crate::color::{ColorCode, Palette, Style};
use crate::config::ScreenConfig;
use crate::diff::DiffRenderer;
use crate::error::{Result, TermError};
use crate::input::Parser;
use crate::key::Key;
use crate::reader::{InputSource, ReadOutcome, StdinSource};
use crate::terminal::{self, Size, Terminal};

/// Tab stops every 8 columns.
const TAB_WIDTH: u16 = 8;

/// Set while a terminal-backed screen exists.
static SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);

/// A full-screen terminal session.
///
/// Drawing calls (`goto`, `set_color`, `add_*`, `erase`, `clear`) only touch
/// the virtual screen. [`refresh`](Self::refresh) sends the difference to
/// the terminal; [`getch`](Self::getch) refreshes first, then waits for a key.
///
/// ```
/// use s_term::{ColorCode, Key, Screen, ScreenConfig, Size};
/// use s_term::reader::ScriptedInput;
///
/// let input = ScriptedInput::new().bytes(b"\x1b[A");
/// let mut screen = Screen::headless(Size::new(24, 80), ScreenConfig::default(), input, Vec::new());
///
/// screen.set_color(ColorCode::YELLOW | ColorCode::BG_GREEN);
/// screen.goto(0, 0);
/// screen.add_string("Chapter 1");
/// assert_eq!(screen.getch().unwrap(), Key::UP);
/// assert_eq!(screen.cursor(), (0, 9));
/// ```
pub struct Screen {
    terminal: Option<Terminal>,
    output: Box<dyn Write>,
    input: Box<dyn InputSource>,
    frame: FrameBuffer,
    renderer: DiffRenderer,
    parser: Parser,
    keys: VecDeque<Key>,
    row: u16,
    col: u16,
    style: Option<Style>,
    pen: Pen,
    config: ScreenConfig,
    size: Size,
    requested_size: Option<Size>,
}

impl Screen {
    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Take over the controlling terminal.
    ///
    /// Enters cbreak/noecho/keypad mode, registers the 64 color pairs,
    /// ignores SIGINT (unless configured otherwise) and switches to the
    /// alternate screen (likewise).
    ///
    /// # Errors
    ///
    /// [`TermError::AlreadyActive`] if another terminal-backed screen is
    /// live, or [`TermError::Io`] if the terminal cannot be set up.
    pub fn init(config: ScreenConfig) -> Result<Self> {
        if SCREEN_ACTIVE.swap(true, Ordering::AcqRel) {
            return Err(TermError::AlreadyActive);
        }

        let mut term = Terminal::new();
        if let Err(e) = term.enter(&config) {
            drop(term);
            SCREEN_ACTIVE.store(false, Ordering::Release);
            return Err(e.into());
        }
        let size = term.size();

        let mut screen = Self::build(
            size,
            config,
            Box::new(StdinSource::new()),
            Box::new(io::stdout()),
        );
        screen.terminal = Some(term);
        tracing::debug!(
            rows = size.rows,
            cols = size.cols,
            pairs = screen.palette().registered(),
            ?config,
            "screen initialized"
        );
        Ok(screen)
    }

    /// A screen over caller-supplied input and output. The tty is untouched
    /// and any number of headless screens may coexist.
    #[must_use]
    pub fn headless(
        size: Size,
        config: ScreenConfig,
        input: impl InputSource + 'static,
        output: impl Write + 'static,
    ) -> Self {
        Self::build(size, config, Box::new(input), Box::new(output))
    }

    fn build(
        size: Size,
        config: ScreenConfig,
        input: Box<dyn InputSource>,
        output: Box<dyn Write>,
    ) -> Self {
        Self {
            terminal: None,
            output,
            input,
            frame: FrameBuffer::new(size.cols, size.rows),
            renderer: DiffRenderer::new(Palette::standard(), config.colors),
            parser: Parser::new(),
            keys: VecDeque::new(),
            row: 0,
            col: 0,
            style: None,
            pen: Pen::default(),
            config,
            size,
            requested_size: None,
        }
    }

    /// Restore the terminal and release the handle.
    ///
    /// # Errors
    ///
    /// Returns an error if restoring the terminal mode fails. The screen is
    /// released either way.
    pub fn exit(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        let Some(mut term) = self.terminal.take() else {
            return Ok(());
        };
        let flushed = self.output.flush();
        let left = term.leave();
        SCREEN_ACTIVE.store(false, Ordering::Release);
        tracing::debug!("screen released");
        flushed?;
        left?;
        Ok(())
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// Blank the virtual screen and home the cursor.
    pub fn erase(&mut self) {
        self.frame.clear();
        self.row = 0;
        self.col = 0;
    }

    /// Like [`erase`](Self::erase), and the next refresh clears the physical
    /// screen and repaints every cell.
    pub fn clear(&mut self) {
        self.erase();
        self.renderer.force_redraw();
    }

    /// Move the cursor. Positions outside the screen are ignored.
    pub fn goto(&mut self, row: i32, col: i32) {
        match (u16::try_from(row), u16::try_from(col)) {
            (Ok(r), Ok(c)) if r < self.size.rows && c < self.size.cols => {
                self.row = r;
                self.col = c;
            }
            _ => tracing::debug!(row, col, size = ?self.size, "goto outside screen ignored"),
        }
    }

    /// Set the attribute for everything drawn from now on.
    pub fn set_color(&mut self, code: impl Into<ColorCode>) {
        let style = code.into().decode();
        self.style = Some(style);
        self.pen = Pen::from_style(style);
    }

    /// Write `ch` `count` times. `count <= 0` does nothing.
    pub fn add_char(&mut self, ch: char, count: i32) {
        for _ in 0..count.max(0) {
            self.put(ch);
        }
    }

    /// Write the line-drawing glyph for VT100 code `code`, `count` times.
    /// Codes outside the table are written as themselves.
    pub fn add_acs(&mut self, code: char, count: i32) {
        self.add_char(acs::translate(code, self.config.acs), count);
    }

    /// Write `text` at the cursor.
    pub fn add_string(&mut self, text: &str) {
        for ch in text.chars() {
            self.put(ch);
        }
    }

    /// One character, with curses `waddch` semantics.
    fn put(&mut self, ch: char) {
        let (rows, cols) = (self.size.rows, self.size.cols);
        if rows == 0 || cols == 0 {
            return;
        }

        match ch {
            '\n' => {
                self.frame.clear_to_eol(self.col, self.row);
                self.col = 0;
                if self.row + 1 < rows {
                    self.row += 1;
                }
            }
            '\r' => self.col = 0,
            '\t' => {
                let spaces = TAB_WIDTH - self.col % TAB_WIDTH;
                for _ in 0..spaces {
                    self.put(' ');
                }
            }
            '\x08' => self.col = self.col.saturating_sub(1),
            '\x7f' => {
                self.put('^');
                self.put('?');
            }
            c if c.is_ascii_control() => {
                self.put('^');
                self.put(char::from_u32(u32::from(c) + 0x40).unwrap_or('?'));
            }
            c => {
                let used = self.frame.put_char(self.col, self.row, c, self.pen);
                if used > 0 {
                    self.advance(used);
                }
            }
        }
    }

    /// Move the cursor right, wrapping at the edge. The last row does not
    /// scroll: the cursor stays on its last column.
    fn advance(&mut self, cols: u16) {
        let next = self.col + cols;
        if next < self.size.cols {
            self.col = next;
        } else if self.row + 1 < self.size.rows {
            self.row += 1;
            self.col = 0;
        } else {
            self.col = self.size.cols - 1;
        }
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Send the changes since the last refresh to the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the terminal fails.
    pub fn refresh(&mut self) -> Result<()> {
        let stats = self.renderer.render(&self.frame, (self.col, self.row));
        self.renderer.flush_to(&mut self.output)?;
        tracing::trace!(
            rendered = stats.cells_rendered,
            skipped = stats.cells_skipped,
            bytes = stats.bytes_written,
            full = stats.full_redraw,
            "refresh"
        );
        Ok(())
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Refresh, then wait for the next key.
    ///
    /// A terminal resize is reported as [`Key::RESIZE`] after the screen has
    /// taken the new size. A lone ESC is delivered as [`Key::ESCAPE`] once
    /// the escape delay passes without a follow-up byte.
    ///
    /// # Errors
    ///
    /// [`TermError::InputClosed`] when input ends, or [`TermError::Io`] if
    /// the refresh or the read fails.
    pub fn getch(&mut self) -> Result<Key> {
        self.refresh()?;

        loop {
            if let Some(key) = self.keys.pop_front() {
                return Ok(key);
            }
            if self.apply_pending_resize() {
                return Ok(Key::RESIZE);
            }

            let waiting_for_sequence = self.parser.has_pending();
            let timeout = if waiting_for_sequence {
                self.config.escape_delay
            } else {
                self.config.resize_poll
            };

            match self.input.read(timeout)? {
                ReadOutcome::Bytes(bytes) => {
                    let keys = self.parser.advance(&bytes);
                    self.keys.extend(keys);
                }
                ReadOutcome::Timeout => {
                    if waiting_for_sequence {
                        let keys = self.parser.flush();
                        self.keys.extend(keys);
                    }
                }
                ReadOutcome::Interrupted => {}
                ReadOutcome::Closed => {
                    let keys = self.parser.flush();
                    if keys.is_empty() {
                        return Err(TermError::InputClosed);
                    }
                    self.keys.extend(keys);
                }
            }
        }
    }

    /// Adopt a new size as if the terminal had been resized: the next
    /// [`getch`](Self::getch) reports [`Key::RESIZE`].
    pub fn request_resize(&mut self, size: Size) {
        self.requested_size = Some(size);
    }

    fn apply_pending_resize(&mut self) -> bool {
        let size = match self.requested_size.take() {
            Some(size) => size,
            None => match self.terminal.as_mut() {
                Some(term) if terminal::take_resize() => term.refresh_size(),
                _ => return false,
            },
        };

        self.size = size;
        self.frame.resize(size.cols, size.rows);
        self.row = self.row.min(size.rows.saturating_sub(1));
        self.col = self.col.min(size.cols.saturating_sub(1));
        self.renderer.force_redraw();
        tracing::debug!(rows = size.rows, cols = size.cols, "screen resized");
        true
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Current size, as of the last resize.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Logical cursor `(row, col)`.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> (u16, u16) {
        (self.row, self.col)
    }

    /// The style set by the last [`set_color`](Self::set_color), or `None`
    /// if drawing still uses the terminal's default colors.
    #[inline]
    #[must_use]
    pub const fn style(&self) -> Option<Style> {
        self.style
    }

    /// The virtual-screen cell at `(row, col)`.
    #[must_use]
    pub fn cell(&self, row: u16, col: u16) -> Option<Cell> {
        self.frame.get(col, row).copied()
    }

    /// The registered color pairs.
    #[inline]
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        self.renderer.palette()
    }

    /// Effective configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &ScreenConfig {
        &self.config
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!(error = %e, "terminal restore failed");
        }
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("size", &self.size)
            .field("cursor", &(self.row, self.col))
            .field("style", &self.style)
            .field("tty", &self.terminal.is_some())
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Attr;
    use crate::color::Color;
    use crate::reader::ScriptedInput;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Output sink the test can read back after the screen wrote to it.
    #[derive(Clone, Default)]
    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Sink {
        fn take(&self) -> String {
            String::from_utf8(std::mem::take(&mut *self.0.borrow_mut())).unwrap()
        }
    }

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn screen(rows: u16, cols: u16) -> Screen {
        Screen::headless(
            Size::new(rows, cols),
            ScreenConfig::default(),
            ScriptedInput::new(),
            io::sink(),
        )
    }

    fn screen_with_input(input: ScriptedInput) -> Screen {
        Screen::headless(Size::new(24, 80), ScreenConfig::default(), input, io::sink())
    }

    fn row_text(screen: &Screen, row: u16) -> String {
        (0..screen.size().cols)
            .filter_map(|col| screen.cell(row, col).and_then(Cell::character))
            .collect::<String>()
            .trim_end()
            .to_owned()
    }

    // ── Cursor and text ─────────────────────────────────────────────────

    #[test]
    fn add_char_repeats_and_advances() {
        let mut s = screen(5, 20);
        s.goto(1, 2);
        s.add_char('-', 5);
        assert_eq!(s.cursor(), (1, 7));
        assert_eq!(row_text(&s, 1), "  -----");
    }

    #[test]
    fn add_char_non_positive_count_is_noop() {
        let mut s = screen(5, 20);
        s.goto(2, 3);
        s.add_char('x', 0);
        s.add_char('x', -1);
        assert_eq!(s.cursor(), (2, 3));
        assert_eq!(row_text(&s, 2), "");
    }

    #[test]
    fn add_string_writes_verbatim() {
        let mut s = screen(3, 20);
        s.add_string("Hello, world");
        assert_eq!(row_text(&s, 0), "Hello, world");
        assert_eq!(s.cursor(), (0, 12));
    }

    #[test]
    fn goto_out_of_bounds_is_ignored() {
        let mut s = screen(5, 10);
        s.goto(2, 4);
        s.goto(5, 0);
        s.goto(0, 10);
        s.goto(-1, 3);
        s.goto(1, -2);
        assert_eq!(s.cursor(), (2, 4));
    }

    #[test]
    fn text_wraps_at_right_edge() {
        let mut s = screen(3, 5);
        s.add_string("abcdefg");
        assert_eq!(row_text(&s, 0), "abcde");
        assert_eq!(row_text(&s, 1), "fg");
        assert_eq!(s.cursor(), (1, 2));
    }

    #[test]
    fn last_cell_does_not_scroll() {
        let mut s = screen(2, 3);
        s.goto(1, 1);
        s.add_string("xyz");
        assert_eq!(row_text(&s, 1), " xz");
        assert_eq!(s.cursor(), (1, 2));
    }

    #[test]
    fn newline_clears_rest_of_line() {
        let mut s = screen(3, 10);
        s.add_string("0123456789");
        s.goto(0, 4);
        s.add_string("\nnext");
        assert_eq!(row_text(&s, 0), "0123");
        assert_eq!(row_text(&s, 1), "next");
    }

    #[test]
    fn carriage_return_backspace_and_tab() {
        let mut s = screen(3, 20);
        s.add_string("abc\rX");
        assert_eq!(row_text(&s, 0), "Xbc");
        s.add_string("\x08Y");
        assert_eq!(row_text(&s, 0), "Ybc");
        s.goto(1, 3);
        s.add_string("\tT");
        assert_eq!(s.cursor(), (1, 9));
        assert_eq!(s.cell(1, 8).and_then(Cell::character), Some('T'));
    }

    #[test]
    fn control_characters_print_caret_notation() {
        let mut s = screen(2, 20);
        s.add_char('\x01', 1);
        s.add_char('\x7f', 1);
        assert_eq!(row_text(&s, 0), "^A^?");
    }

    #[test]
    fn wide_characters_take_two_columns() {
        let mut s = screen(2, 10);
        s.add_string("中a");
        assert_eq!(s.cursor(), (0, 3));
        assert!(s.cell(0, 1).is_some_and(Cell::is_continuation));
    }

    #[test]
    fn zero_width_characters_are_dropped() {
        let mut s = screen(2, 10);
        s.add_string("e\u{0301}");
        assert_eq!(s.cursor(), (0, 1));
    }

    #[test]
    fn zero_size_screen_ignores_drawing() {
        let mut s = screen(0, 0);
        s.add_string("nothing");
        s.goto(0, 0);
        assert_eq!(s.cursor(), (0, 0));
        assert!(s.refresh().is_ok());
    }

    // ── Color ───────────────────────────────────────────────────────────

    #[test]
    fn default_pen_until_set_color() {
        let mut s = screen(2, 10);
        assert_eq!(s.style(), None);
        s.add_char('a', 1);
        assert!(s.cell(0, 0).is_some_and(|c| c.pair.is_default()));
    }

    #[test]
    fn set_color_stamps_cells() {
        let mut s = screen(2, 10);
        s.set_color(0x09);
        s.add_char('a', 1);
        let style = s.style().unwrap();
        assert_eq!((style.fg, style.bg, style.bold), (Color::Red, Color::Black, true));
        let cell = s.cell(0, 0).unwrap();
        assert_eq!(cell.pair.get(), 2);
        assert_eq!(cell.attrs, Attr::BOLD);
    }

    #[test]
    fn high_bits_are_ignored() {
        let mut a = screen(1, 1);
        let mut b = screen(1, 1);
        a.set_color(0x23);
        b.set_color(0xA3);
        assert_eq!(a.style(), b.style());
    }

    #[test]
    fn refresh_emits_pair_colors() {
        let sink = Sink::default();
        let mut s = Screen::headless(
            Size::new(4, 10),
            ScreenConfig::default(),
            ScriptedInput::new(),
            sink.clone(),
        );
        s.set_color(0x23);
        s.add_string("hi");
        s.refresh().unwrap();
        let out = sink.take();
        assert!(out.contains("\x1b[33m"));
        assert!(out.contains("\x1b[42m"));
        assert!(out.contains("hi"));
    }

    #[test]
    fn add_acs_translates_glyphs() {
        let mut s = screen(1, 10);
        s.add_acs('l', 1);
        s.add_acs('q', 2);
        s.add_acs('k', 1);
        assert_eq!(row_text(&s, 0), "┌──┐");
    }

    #[test]
    fn add_acs_ascii_fallback() {
        let config = ScreenConfig {
            acs: acs::AcsStyle::Ascii,
            ..ScreenConfig::default()
        };
        let mut s = Screen::headless(Size::new(1, 10), config, ScriptedInput::new(), io::sink());
        s.add_acs('l', 1);
        s.add_acs('x', 1);
        assert_eq!(row_text(&s, 0), "+|");
    }

    // ── Erase / Clear ───────────────────────────────────────────────────

    #[test]
    fn erase_and_clear_blank_and_home() {
        let mut s = screen(3, 10);
        s.goto(2, 2);
        s.add_string("text");
        s.erase();
        assert_eq!(row_text(&s, 2), "");
        assert_eq!(s.cursor(), (0, 0));

        s.goto(1, 1);
        s.add_string("more");
        s.clear();
        assert_eq!(row_text(&s, 1), "");
        assert_eq!(s.cursor(), (0, 0));
    }

    #[test]
    fn only_clear_forces_full_repaint() {
        let sink = Sink::default();
        let mut s = Screen::headless(
            Size::new(3, 10),
            ScreenConfig::default(),
            ScriptedInput::new(),
            sink.clone(),
        );
        s.refresh().unwrap();
        sink.take();

        s.erase();
        s.refresh().unwrap();
        assert!(!sink.take().contains("\x1b[2J"));

        s.clear();
        s.refresh().unwrap();
        assert!(sink.take().contains("\x1b[2J"));
    }

    // ── getch ───────────────────────────────────────────────────────────

    #[test]
    fn getch_decodes_keys() {
        let input = ScriptedInput::new().bytes(b"\x1b[A\rq\x1b[6~");
        let mut s = screen_with_input(input);
        assert_eq!(s.getch().unwrap(), Key::UP);
        assert_eq!(s.getch().unwrap(), Key::ENTER);
        assert_eq!(s.getch().unwrap(), Key::from_byte(b'q'));
        assert_eq!(s.getch().unwrap().code(), 338);
    }

    #[test]
    fn getch_joins_split_sequences() {
        let input = ScriptedInput::new().bytes(b"\x1b").bytes(b"[B");
        let mut s = screen_with_input(input);
        assert_eq!(s.getch().unwrap(), Key::DOWN);
    }

    #[test]
    fn lone_escape_after_delay() {
        let input = ScriptedInput::new().bytes(b"\x1b").pause().bytes(b"j");
        let mut s = screen_with_input(input);
        assert_eq!(s.getch().unwrap(), Key::ESCAPE);
        assert_eq!(s.getch().unwrap(), Key::from_byte(b'j'));
    }

    #[test]
    fn escape_at_end_of_input_is_delivered() {
        let mut s = screen_with_input(ScriptedInput::new().bytes(b"\x1b"));
        assert_eq!(s.getch().unwrap().code(), 27);
        assert!(matches!(s.getch(), Err(TermError::InputClosed)));
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut s = screen_with_input(ScriptedInput::new());
        assert!(matches!(s.getch(), Err(TermError::InputClosed)));
    }

    #[test]
    fn getch_refreshes_first() {
        let sink = Sink::default();
        let mut s = Screen::headless(
            Size::new(2, 10),
            ScreenConfig::default(),
            ScriptedInput::new().bytes(b"x"),
            sink.clone(),
        );
        s.add_string("page");
        s.getch().unwrap();
        assert!(sink.take().contains("page"));
    }

    #[test]
    fn resize_is_reported_as_key() {
        let mut s = screen_with_input(ScriptedInput::new().bytes(b"a"));
        s.goto(20, 70);
        s.request_resize(Size::new(10, 40));
        assert_eq!(s.getch().unwrap(), Key::RESIZE);
        assert_eq!(s.size(), Size::new(10, 40));
        assert_eq!(s.cursor(), (9, 39));
        assert!(s.cell(9, 39).is_some());
        assert!(s.cell(10, 0).is_none());
        assert_eq!(s.getch().unwrap(), Key::from_byte(b'a'));
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    #[test]
    fn headless_exit_is_ok() {
        let s = screen(2, 2);
        assert!(s.exit().is_ok());
    }

    #[test]
    fn palette_is_fully_registered() {
        let s = screen(1, 1);
        assert_eq!(s.palette().registered(), 64);
    }

    #[test]
    fn debug_names_size_and_cursor() {
        let dbg = format!("{:?}", screen(3, 4));
        assert!(dbg.contains("Screen"));
        assert!(dbg.contains("rows: 3"));
    }
}
