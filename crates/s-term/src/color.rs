// SPDX-License-Identifier: MIT
//
// Color codes, color pairs, and the palette.
//
// The reader speaks in packed 8-bit color codes:
//
//   bit   7   6 5 4   3   2 1 0
//        ┌───┬───────┬───┬───────┐
//        │ - │  bg   │ B │  fg   │
//        └───┴───────┴───┴───────┘
//
// `B` is bold, `fg`/`bg` are ANSI color numbers 0–7, bit 7 is ignored.
// A code is decoded exactly once, at the boundary, into a `Style`. The
// style names a color pair `((bg << 3) | fg) + 1`, and the screen's
// `Palette` maps that pair back to concrete colors when a frame is
// rendered. Pair 0 is reserved for the terminal's default colors.
//
// The palette registers all 64 (fg, bg) combinations up front, so a
// decoded code always lands on a registered pair. Nothing on the drawing
// path can fail or register lazily.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::error::{Result, TermError};

// ─── Color ───────────────────────────────────────────────────────────────────

/// One of the eight standard ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl Color {
    /// All eight colors in ANSI order.
    pub const ALL: [Self; 8] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::White,
    ];

    /// The color for the low three bits of `bits`. Higher bits are ignored.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 7) as usize]
    }

    /// ANSI color number (0–7).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Lowercase color name, as used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── PairIndex ───────────────────────────────────────────────────────────────

/// Index of a registered color pair.
///
/// `0` is the terminal default; `1..=64` are the registered combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PairIndex(u8);

impl PairIndex {
    /// The reserved "default colors" pair.
    pub const DEFAULT: Self = Self(0);

    /// Highest registered pair index.
    pub const MAX: u8 = 64;

    /// The pair that renders `fg` on `bg`.
    #[inline]
    #[must_use]
    pub const fn of(fg: Color, bg: Color) -> Self {
        Self(((bg.index() << 3) | fg.index()) + 1)
    }

    /// The raw index.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Whether this is the reserved default pair.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        self.0 == 0
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// A decoded color code: foreground, background, and boldness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
}

impl Style {
    /// The color pair this style draws with.
    #[inline]
    #[must_use]
    pub const fn pair(self) -> PairIndex {
        PairIndex::of(self.fg, self.bg)
    }

    /// Pack back into a color code.
    #[must_use]
    pub const fn encode(self) -> ColorCode {
        let bold = if self.bold { ColorCode::BOLD.0 } else { 0 };
        ColorCode((self.bg.index() << 4) | bold | self.fg.index())
    }
}

// ─── ColorCode ───────────────────────────────────────────────────────────────

/// A packed color + attribute code.
///
/// Constants combine with `|`:
///
/// ```
/// use s_term::color::{Color, ColorCode};
///
/// let status = ColorCode::YELLOW | ColorCode::BOLD | ColorCode::BG_BLUE;
/// let style = status.decode();
/// assert_eq!(style.fg, Color::Yellow);
/// assert_eq!(style.bg, Color::Blue);
/// assert!(style.bold);
/// ```
///
/// Any integer converts; only the low seven bits are kept.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const BLACK: Self = Self(0x00);
    pub const RED: Self = Self(0x01);
    pub const GREEN: Self = Self(0x02);
    pub const YELLOW: Self = Self(0x03);
    pub const BLUE: Self = Self(0x04);
    pub const MAGENTA: Self = Self(0x05);
    pub const CYAN: Self = Self(0x06);
    pub const WHITE: Self = Self(0x07);
    pub const BOLD: Self = Self(0x08);
    pub const BG_BLACK: Self = Self(0x00);
    pub const BG_RED: Self = Self(0x10);
    pub const BG_GREEN: Self = Self(0x20);
    pub const BG_YELLOW: Self = Self(0x30);
    pub const BG_BLUE: Self = Self(0x40);
    pub const BG_MAGENTA: Self = Self(0x50);
    pub const BG_CYAN: Self = Self(0x60);
    pub const BG_WHITE: Self = Self(0x70);

    const MEANINGFUL: u8 = 0x7F;

    /// Build a code from raw bits. Bit 7 is dropped.
    #[inline]
    #[must_use]
    pub const fn new(bits: u8) -> Self {
        Self(bits & Self::MEANINGFUL)
    }

    /// The seven meaningful bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Bit 3.
    #[inline]
    #[must_use]
    pub const fn is_bold(self) -> bool {
        self.0 & 8 != 0
    }

    /// Bits 0–2.
    #[inline]
    #[must_use]
    pub const fn foreground(self) -> Color {
        Color::from_bits(self.0)
    }

    /// Bits 4–6.
    #[inline]
    #[must_use]
    pub const fn background(self) -> Color {
        Color::from_bits(self.0 >> 4)
    }

    /// Decode into an explicit style record.
    #[must_use]
    pub const fn decode(self) -> Style {
        Style {
            fg: self.foreground(),
            bg: self.background(),
            bold: self.is_bold(),
        }
    }

    /// The color pair this code selects.
    #[inline]
    #[must_use]
    pub const fn pair(self) -> PairIndex {
        self.decode().pair()
    }
}

impl From<u8> for ColorCode {
    fn from(bits: u8) -> Self {
        Self::new(bits)
    }
}

impl From<i32> for ColorCode {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from(value: i32) -> Self {
        // Masked first, so the cast only ever sees 0..=127.
        Self::new((value & i32::from(Self::MEANINGFUL)) as u8)
    }
}

impl From<Style> for ColorCode {
    fn from(style: Style) -> Self {
        style.encode()
    }
}

impl BitOr for ColorCode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ColorCode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ColorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = self.decode();
        write!(f, "ColorCode({:#04x}: {} on {}", self.0, style.fg, style.bg)?;
        if style.bold {
            write!(f, ", bold")?;
        }
        write!(f, ")")
    }
}

// ─── Palette ─────────────────────────────────────────────────────────────────

/// Number of pair slots, including the reserved default slot 0.
pub const PAIR_SLOTS: usize = PairIndex::MAX as usize + 1;

/// Mapping from pair index to concrete colors.
///
/// Built once when the screen initializes and read-only afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Palette {
    pairs: [Option<(Color, Color)>; PAIR_SLOTS],
}

impl Palette {
    /// A palette with nothing registered.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            pairs: [None; PAIR_SLOTS],
        }
    }

    /// A palette with every (fg, bg) combination registered.
    ///
    /// Pair `i + 1` gets foreground `i & 7` and background `i >> 3`, the
    /// inverse of [`PairIndex::of`].
    #[must_use]
    pub fn standard() -> Self {
        let mut palette = Self::empty();
        for bg in Color::ALL {
            for fg in Color::ALL {
                // `PairIndex::of` stays within 1..=64.
                let registered = palette.register(u16::from(PairIndex::of(fg, bg).get()), fg, bg);
                debug_assert!(registered.is_ok());
            }
        }
        palette
    }

    /// Register `pair` as `fg` on `bg`.
    ///
    /// # Errors
    ///
    /// [`TermError::PairOutOfRange`] unless `1 <= pair <= 64`.
    pub fn register(&mut self, pair: u16, fg: Color, bg: Color) -> Result<()> {
        if pair == 0 || pair > u16::from(PairIndex::MAX) {
            return Err(TermError::PairOutOfRange { pair });
        }
        self.pairs[usize::from(pair)] = Some((fg, bg));
        Ok(())
    }

    /// Colors for `pair`, or `None` for the default pair or an empty slot.
    #[inline]
    #[must_use]
    pub fn get(&self, pair: PairIndex) -> Option<(Color, Color)> {
        self.pairs[usize::from(pair.get())]
    }

    /// Number of registered pairs.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.pairs.iter().filter(|slot| slot.is_some()).count()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Palette({} pairs)", self.registered())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
