// SPDX-License-Identifier: MIT
//
// s-term: the terminal layer of the saraswati EPUB reader.
//
// The reader's user interface draws through a small curses-style surface:
// move the cursor, pick a color code, put characters, refresh, read a key.
// This crate provides that surface on top of direct ANSI output and
// termios, with no curses library underneath.
//
// Color codes are packed bytes (foreground in bits 0-2, bold in bit 3,
// background in bits 4-6) decoded into one of 64 pre-registered color
// pairs. Drawing goes to a virtual screen; `refresh` diffs it against what
// the terminal shows and emits only the changed cells. `getch` turns
// keypad escape sequences into curses key codes.

pub mod acs;
pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod color;
pub mod config;
pub mod diff;
pub mod error;
pub mod input;
pub mod key;
pub mod output;
pub mod reader;
pub mod screen;
pub mod terminal;

pub use acs::{Acs, AcsStyle};
pub use color::{Color, ColorCode, Palette, Style};
pub use config::{ColorSupport, ScreenConfig};
pub use error::{Result, TermError};
pub use key::Key;
pub use screen::Screen;
pub use terminal::Size;
