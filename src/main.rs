// SPDX-License-Identifier: MIT
//
// saraswati: terminal check for the EPUB reader's display layer.
//
// Draws everything the reader's UI relies on and echoes key codes, so a
// terminal can be checked before reading a book in it:
//
//   ┌──────────────────────────────────────────┐
//   │ title                                    │
//   │ 8×8 color pair grid (plain, then bold)   │
//   │ line-drawing glyphs in a box             │
//   │ last key: name and code                  │
//   ├──────────────────────────────────────────┤
//   │ status line                              │  ← last row
//   └──────────────────────────────────────────┘
//
// `q` quits. Resizing redraws.

mod logging;

use std::process;

use s_term::{Acs, Color, ColorCode, Key, Screen, ScreenConfig};

/// Column where the bold half of the color grid starts.
const BOLD_GRID_COL: i32 = 36;

/// Rows used by the color grid (header + 8 backgrounds).
const GRID_ROWS: i32 = 9;

const STATUS: ColorCode = ColorCode::new(0x4F); // bold white on blue

fn main() {
    if let Err(e) = logging::init() {
        eprintln!("saraswati: cannot open log file: {e}");
        process::exit(1);
    }

    if let Err(e) = run() {
        eprintln!("saraswati: {e}");
        process::exit(1);
    }
}

fn run() -> s_term::Result<()> {
    let config = ScreenConfig::from_env()?;
    let mut screen = Screen::init(config)?;

    let mut last = None;
    loop {
        draw(&mut screen, last);
        let key = screen.getch()?;
        if key == Key::from_byte(b'q') {
            break;
        }
        tracing::debug!(%key, code = key.code(), "key");
        last = Some(key);
    }

    screen.exit()
}

/// Paint the whole check page.
fn draw(screen: &mut Screen, last: Option<Key>) {
    screen.erase();

    screen.set_color(ColorCode::WHITE | ColorCode::BOLD);
    screen.goto(0, 1);
    screen.add_string("saraswati terminal check");

    draw_color_grid(screen, 2);
    draw_acs_box(screen, 2 + GRID_ROWS + 1);
    draw_last_key(screen, 2 + GRID_ROWS + 6, last);
    draw_status(screen);

    screen.set_color(ColorCode::WHITE);
    screen.goto(0, 0);
}

/// Every pair: one row per background, one column per foreground, with a
/// bold copy to the right.
fn draw_color_grid(screen: &mut Screen, top: i32) {
    screen.set_color(ColorCode::WHITE);
    screen.goto(top, 1);
    screen.add_string("pairs");
    screen.goto(top, BOLD_GRID_COL);
    screen.add_string("bold");

    for bg in Color::ALL {
        let row = top + 1 + i32::from(bg.index());
        screen.set_color(ColorCode::WHITE);
        screen.goto(row, 1);
        screen.add_string(&format!("{:<7}", bg.name()));

        for (half, col0) in [(0, 9), (8, BOLD_GRID_COL)] {
            screen.goto(row, col0);
            for fg in Color::ALL {
                let code = ColorCode::new((bg.index() << 4) | half | fg.index());
                screen.set_color(code);
                screen.add_string(&format!("{:02x} ", code.bits()));
            }
        }
    }
}

/// A box drawn from the alternate character set, holding every glyph.
fn draw_acs_box(screen: &mut Screen, top: i32) {
    let glyphs: Vec<Acs> = Acs::all().collect();
    let inner = i32::try_from(glyphs.len() * 2).unwrap_or(i32::MAX);

    screen.set_color(ColorCode::CYAN);
    screen.goto(top, 1);
    screen.add_acs('l', 1);
    screen.add_acs('q', inner);
    screen.add_acs('k', 1);

    screen.goto(top + 1, 1);
    screen.add_acs('x', 1);
    screen.set_color(ColorCode::WHITE);
    for glyph in &glyphs {
        screen.add_acs(glyph.code(), 1);
        screen.add_char(' ', 1);
    }
    screen.set_color(ColorCode::CYAN);
    screen.add_acs('x', 1);

    screen.goto(top + 2, 1);
    screen.add_acs('m', 1);
    screen.add_acs('q', inner);
    screen.add_acs('j', 1);
}

fn draw_last_key(screen: &mut Screen, row: i32, last: Option<Key>) {
    screen.set_color(ColorCode::WHITE);
    screen.goto(row, 1);
    screen.add_string("last key: ");
    screen.set_color(ColorCode::YELLOW | ColorCode::BOLD);
    match last {
        Some(key) => screen.add_string(&format!("{key} ({})", key.code())),
        None => screen.add_string("none yet"),
    }
}

/// Status bar across the bottom row.
fn draw_status(screen: &mut Screen) {
    let size = screen.size();
    if size.rows == 0 {
        return;
    }
    let row = i32::from(size.rows) - 1;
    let text = format!(" {}x{}  press keys to see their codes, q to quit", size.cols, size.rows);

    screen.set_color(STATUS);
    screen.goto(row, 0);
    screen.add_string(&text);
    let used = i32::try_from(s_term::buffer::string_width(&text)).unwrap_or(i32::MAX);
    // Stop one short of the corner so the cursor does not wrap.
    screen.add_char(' ', i32::from(size.cols) - used - 1);
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use s_term::reader::ScriptedInput;
    use s_term::{AcsStyle, Size};
    use std::io;

    fn headless(rows: u16, cols: u16) -> Screen {
        Screen::headless(
            Size::new(rows, cols),
            ScreenConfig::default(),
            ScriptedInput::new(),
            io::sink(),
        )
    }

    fn text(screen: &Screen, row: u16) -> String {
        (0..screen.size().cols)
            .filter_map(|col| screen.cell(row, col)?.character())
            .collect::<String>()
            .trim_end()
            .to_owned()
    }

    #[test]
    fn title_and_status() {
        let mut s = headless(24, 80);
        draw(&mut s, None);
        assert_eq!(text(&s, 0), " saraswati terminal check");
        assert!(text(&s, 23).starts_with(" 80x24  press keys"));
        let status = s.cell(23, 70).unwrap();
        assert_eq!(status.pair, STATUS.pair());
    }

    #[test]
    fn grid_cells_use_their_own_pair() {
        let mut s = headless(24, 80);
        draw(&mut s, None);
        // Background green (row 2 + 1 + 2), foreground yellow (col 9 + 3*3).
        let cell = s.cell(5, 18).unwrap();
        assert_eq!(cell.character(), Some('2'));
        assert_eq!(cell.pair, ColorCode::new(0x23).pair());
        assert!(cell.attrs.is_empty());

        let bold = s.cell(5, 36 + 9).unwrap();
        assert_eq!(bold.pair, ColorCode::new(0x2B).pair());
        assert!(!bold.attrs.is_empty());
    }

    #[test]
    fn acs_box_corners() {
        let mut s = headless(24, 80);
        draw(&mut s, None);
        assert_eq!(s.cell(12, 1).unwrap().character(), Some('┌'));
        assert_eq!(s.cell(14, 1).unwrap().character(), Some('└'));
        assert_eq!(s.cell(13, 1).unwrap().character(), Some('│'));
    }

    #[test]
    fn acs_box_ascii() {
        let config = ScreenConfig {
            acs: AcsStyle::Ascii,
            ..ScreenConfig::default()
        };
        let mut s = Screen::headless(Size::new(24, 80), config, ScriptedInput::new(), io::sink());
        draw(&mut s, None);
        assert!(text(&s, 12).starts_with(" +----"));
    }

    #[test]
    fn last_key_is_named() {
        let mut s = headless(24, 80);
        draw(&mut s, Some(Key::UP));
        assert_eq!(text(&s, 17), " last key: Up (259)");
    }

    #[test]
    fn tiny_screen_does_not_panic() {
        let mut s = headless(3, 10);
        draw(&mut s, Some(Key::RESIZE));
        let mut z = headless(0, 0);
        draw(&mut z, None);
    }
}
