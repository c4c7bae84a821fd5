// SPDX-License-Identifier: MIT
//
// Differential renderer: what `refresh` actually does.
//
// The virtual screen is compared against the frame the terminal is known to
// show, and escape sequences are emitted only for cells that differ. A
// reader turning a page changes most rows; moving the selection in the
// table of contents changes two.
//
// The pipeline per refresh:
//
//   1. Drawing calls stamp cells into the current FrameBuffer.
//   2. DiffRenderer::render() compares it against the stored previous frame.
//   3. Changed cells go through CellWriter, which resolves color pairs via
//      the palette and skips redundant cursor moves and SGR codes.
//   4. The frame ends by parking the hardware cursor at the logical cursor.
//   5. Everything lands in OutputBuffer and is written with one write().
//
// Unchanged rows are detected with a single slice comparison. The previous
// frame is reused via copy_from(), so steady state does not allocate.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::color::Palette;
use crate::config::ColorSupport;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass, for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the previous frame and were rendered.
    pub cells_rendered: usize,
    /// Cells that matched the previous frame and were skipped.
    pub cells_skipped: usize,
    /// Total bytes of ANSI output generated.
    pub bytes_written: usize,
    /// Whether the screen was cleared and repainted from scratch.
    pub full_redraw: bool,
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Differential renderer that emits ANSI only for changed cells.
///
/// ```
/// use s_term::buffer::FrameBuffer;
/// use s_term::color::Palette;
/// use s_term::config::ColorSupport;
/// use s_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new(Palette::standard(), ColorSupport::Ansi);
/// let frame = FrameBuffer::new(80, 24);
///
/// let stats = renderer.render(&frame, (0, 0));
/// assert!(stats.full_redraw);
///
/// let mut terminal = Vec::new();
/// renderer.flush_to(&mut terminal).unwrap();
/// assert!(!terminal.is_empty());
/// ```
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// Create a renderer with no previous frame (first render draws everything).
    #[must_use]
    pub fn new(palette: Palette, colors: ColorSupport) -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(palette, colors),
            previous: None,
        }
    }

    /// The palette color pairs are resolved through.
    #[inline]
    #[must_use]
    pub const fn palette(&self) -> &Palette {
        self.writer.palette()
    }

    /// Diff `current` against the previous frame and generate ANSI output.
    ///
    /// `cursor` is the logical `(x, y)` cursor; the hardware cursor is left
    /// there when the frame is done. The output stays buffered until
    /// [`flush_to`](Self::flush_to).
    pub fn render(&mut self, current: &FrameBuffer, cursor: (u16, u16)) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let width = current.width();
        let height = current.height();
        let mut stats = RenderStats::default();

        if width == 0 || height == 0 {
            self.store_frame(current);
            return stats;
        }

        ansi::begin_sync(&mut self.output).ok();

        let size_matches = self
            .previous
            .as_ref()
            .is_some_and(|prev| prev.width() == width && prev.height() == height);
        let full_redraw = !size_matches;
        stats.full_redraw = full_redraw;

        if full_redraw {
            ansi::reset(&mut self.output).ok();
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let Some(curr_row) = current.row(y) else {
                continue;
            };
            let prev_row = if full_redraw {
                None
            } else {
                self.previous.as_ref().and_then(|p| p.row(y))
            };

            if prev_row == Some(curr_row) {
                stats.cells_skipped += curr_row.len();
                continue;
            }

            for (x, cell) in (0..width).zip(curr_row) {
                let changed = prev_row.and_then(|row| row.get(usize::from(x))) != Some(cell);
                if changed {
                    self.writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                } else {
                    stats.cells_skipped += 1;
                }
            }
        }

        // Leave the terminal in default colors between frames.
        ansi::reset(&mut self.output).ok();

        let (cx, cy) = cursor;
        ansi::cursor_to(
            &mut self.output,
            cx.min(width - 1),
            cy.min(height - 1),
        )
        .ok();

        ansi::end_sync(&mut self.output).ok();

        stats.bytes_written = self.output.len();
        self.store_frame(current);
        stats
    }

    /// Write accumulated output to `w` and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Discard the previous frame so the next render clears and repaints.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    /// Store the current frame for the next render's comparison.
    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev)
                if prev.width() == current.width() && prev.height() == current.height() =>
            {
                prev.copy_from(current);
            }
            _ => {
                self.previous = Some(current.clone());
            }
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new(Palette::standard(), ColorSupport::Ansi)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Cell, Pen};
    use crate::color::ColorCode;
    use pretty_assertions::assert_eq;

    fn render_frame(renderer: &mut DiffRenderer, frame: &FrameBuffer) -> (RenderStats, String) {
        render_at(renderer, frame, (0, 0))
    }

    fn render_at(
        renderer: &mut DiffRenderer,
        frame: &FrameBuffer,
        cursor: (u16, u16),
    ) -> (RenderStats, String) {
        let stats = renderer.render(frame, cursor);
        let output = String::from_utf8(renderer.output.as_bytes().to_vec()).unwrap();
        (stats, output)
    }

    // ── First Render ────────────────────────────────────────────────────

    #[test]
    fn first_render_draws_all_cells() {
        let mut renderer = DiffRenderer::default();
        let frame = FrameBuffer::new(10, 5);

        let (stats, output) = render_frame(&mut renderer, &frame);

        assert_eq!(stats.cells_rendered, 50);
        assert_eq!(stats.cells_skipped, 0);
        assert!(stats.full_redraw);
        assert!(output.contains("\x1b[2J"));
    }

    #[test]
    fn frame_is_wrapped_in_sync_markers() {
        let mut renderer = DiffRenderer::default();
        let frame = FrameBuffer::new(10, 5);

        let (_, output) = render_frame(&mut renderer, &frame);

        assert!(output.starts_with("\x1b[?2026h"));
        assert!(output.ends_with("\x1b[?2026l"));
    }

    #[test]
    fn frame_ends_with_reset_and_cursor() {
        let mut renderer = DiffRenderer::default();
        let frame = FrameBuffer::new(10, 5);

        let (_, output) = render_at(&mut renderer, &frame, (3, 2));

        assert!(output.ends_with("\x1b[0m\x1b[3;4H\x1b[?2026l"));
    }

    #[test]
    fn cursor_is_clamped_to_frame() {
        let mut renderer = DiffRenderer::default();
        let frame = FrameBuffer::new(10, 5);

        let (_, output) = render_at(&mut renderer, &frame, (40, 40));

        assert!(output.ends_with("\x1b[5;10H\x1b[?2026l"));
    }

    // ── Identical Frames ────────────────────────────────────────────────

    #[test]
    fn identical_frames_skip_all_cells() {
        let mut renderer = DiffRenderer::default();
        let frame = FrameBuffer::new(10, 5);

        renderer.render(&frame, (0, 0));
        let (stats, output) = render_frame(&mut renderer, &frame);

        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 50);
        assert!(!stats.full_redraw);
        assert!(!output.contains("\x1b[2J"));
        assert_eq!(output, "\x1b[?2026h\x1b[0m\x1b[1;1H\x1b[?2026l");
    }

    // ── Changes ─────────────────────────────────────────────────────────

    #[test]
    fn single_cell_change_renders_one() {
        let mut renderer = DiffRenderer::default();
        let mut frame = FrameBuffer::new(10, 5);

        renderer.render(&frame, (0, 0));
        frame.set(7, 4, Cell::new('Z'));

        let (stats, output) = render_frame(&mut renderer, &frame);

        assert_eq!(stats.cells_rendered, 1);
        assert_eq!(stats.cells_skipped, 49);
        assert!(output.contains("\x1b[5;8H"));
        assert!(output.contains('Z'));
    }

    #[test]
    fn scattered_changes_render_only_changed() {
        let mut renderer = DiffRenderer::default();
        let mut frame = FrameBuffer::new(20, 10);

        renderer.render(&frame, (0, 0));
        frame.set(0, 0, Cell::new('A'));
        frame.set(10, 5, Cell::new('B'));
        frame.set(19, 9, Cell::new('C'));

        let (stats, output) = render_frame(&mut renderer, &frame);

        assert_eq!(stats.cells_rendered, 3);
        assert_eq!(stats.cells_skipped, 197);
        assert!(output.contains('A') && output.contains('B') && output.contains('C'));
    }

    #[test]
    fn unchanged_rows_skipped() {
        let mut renderer = DiffRenderer::default();
        let mut frame = FrameBuffer::new(100, 50);

        renderer.render(&frame, (0, 0));
        for x in 0..100 {
            frame.set(x, 25, Cell::new('#'));
        }

        let (stats, _) = render_frame(&mut renderer, &frame);

        assert_eq!(stats.cells_rendered, 100);
        assert_eq!(stats.cells_skipped, 4900);
    }

    #[test]
    fn colored_cell_uses_palette() {
        let mut renderer = DiffRenderer::default();
        let mut frame = FrameBuffer::new(10, 1);

        renderer.render(&frame, (0, 0));
        let pen = Pen::from_style(ColorCode::from(0x2B).decode());
        frame.set(0, 0, Cell::styled('E', pen));

        let (_, output) = render_frame(&mut renderer, &frame);

        assert!(output.contains("\x1b[1m"));
        assert!(output.contains("\x1b[33m"));
        assert!(output.contains("\x1b[42m"));
        assert!(output.contains('E'));
    }

    #[test]
    fn monochrome_renderer_drops_colors() {
        let mut renderer = DiffRenderer::new(Palette::standard(), ColorSupport::Monochrome);
        let mut frame = FrameBuffer::new(4, 1);
        frame.set(0, 0, Cell::styled('m', Pen::from_style(ColorCode::from(0x13).decode())));

        let (_, output) = render_frame(&mut renderer, &frame);

        assert!(!output.contains("\x1b[33m"));
        assert!(!output.contains("\x1b[41m"));
        assert!(output.contains('m'));
    }

    // ── Resize / Redraw ─────────────────────────────────────────────────

    #[test]
    fn resize_triggers_full_redraw() {
        let mut renderer = DiffRenderer::default();
        renderer.render(&FrameBuffer::new(10, 5), (0, 0));

        let (stats, output) = render_frame(&mut renderer, &FrameBuffer::new(20, 10));

        assert_eq!(stats.cells_rendered, 200);
        assert!(output.contains("\x1b[2J"));
    }

    #[test]
    fn force_redraw_renders_everything() {
        let mut renderer = DiffRenderer::default();
        let frame = FrameBuffer::new(10, 5);

        renderer.render(&frame, (0, 0));
        assert!(renderer.previous.is_some());

        renderer.force_redraw();
        assert!(renderer.previous.is_none());

        let (stats, output) = render_frame(&mut renderer, &frame);
        assert_eq!(stats.cells_rendered, 50);
        assert!(output.contains("\x1b[2J"));
    }

    #[test]
    fn zero_size_buffer_produces_no_output() {
        let mut renderer = DiffRenderer::default();
        let (stats, output) = render_frame(&mut renderer, &FrameBuffer::new(0, 0));

        assert_eq!(stats.cells_rendered + stats.cells_skipped, 0);
        assert_eq!(stats.bytes_written, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn consecutive_renders_track_previous_frame() {
        let mut renderer = DiffRenderer::default();
        let mut frame = FrameBuffer::new(10, 5);

        assert_eq!(render_frame(&mut renderer, &frame).0.cells_rendered, 50);
        assert_eq!(render_frame(&mut renderer, &frame).0.cells_rendered, 0);

        frame.set(0, 0, Cell::new('!'));
        assert_eq!(render_frame(&mut renderer, &frame).0.cells_rendered, 1);

        frame.set(0, 0, Cell::EMPTY);
        assert_eq!(render_frame(&mut renderer, &frame).0.cells_rendered, 1);
        assert_eq!(render_frame(&mut renderer, &frame).0.cells_rendered, 0);
    }

    #[test]
    fn flush_to_writes_and_clears() {
        let mut renderer = DiffRenderer::default();
        renderer.render(&FrameBuffer::new(2, 1), (0, 0));

        let mut sink = Vec::new();
        renderer.flush_to(&mut sink).unwrap();

        assert!(!sink.is_empty());
        assert!(renderer.output.as_bytes().is_empty());
    }
}
