//! Glyph blitting shared by every font kind.

use std::ops::RangeInclusive;

use crate::error::{FontError, Result};
use crate::surface::{AlphaMask, Rgba, Surface};
use crate::table::row_stride;

/// Pixel position on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `(x + dx, y + dy)`, saturating at the edge of the coordinate space.
    pub const fn shifted(self, dx: u32, dy: u32) -> (i32, i32) {
        (
            self.x.saturating_add_unsigned(dx),
            self.y.saturating_add_unsigned(dy),
        )
    }
}

/// Draws one packed glyph with its top-left corner at `at`.
///
/// Row `y` of the glyph occupies `row_stride(width)` bytes of `bits`, read
/// big-endian. Bit `x` of a row is drawn at column `width - 1 - x`, so the
/// most significant used bit is the leftmost pixel. Set bits are painted
/// `fg`, clear bits `bg`. Clipping is left to the surface.
pub fn draw_glyph_at<S: Surface + ?Sized>(
    dst: &mut S,
    at: Point,
    width: u32,
    height: u32,
    bits: &[u8],
    fg: Rgba,
    bg: Rgba,
) {
    let stride = row_stride(width);
    for y in 0..height {
        let row = bits
            .get(y as usize * stride..(y as usize + 1) * stride)
            .unwrap_or(&[]);
        for x in 0..width {
            let color = if row_bit(row, x) { fg } else { bg };
            let (px, py) = at.shifted(width - 1 - x, y);
            dst.set(px, py, color);
        }
    }
}

fn row_bit(row: &[u8], bit: u32) -> bool {
    let byte = (bit / 8) as usize;
    if byte >= row.len() {
        return false;
    }
    row[row.len() - 1 - byte] & (1 << (bit % 8)) != 0
}

/// Borrowed bitmap of a single character.
#[derive(Debug, Clone, Copy)]
pub enum Glyph<'a> {
    /// Packed 1-bit rows from a binary font.
    Packed {
        width: u32,
        height: u32,
        rows: &'a [u8],
    },
    /// A cell of a normalized sprite sheet. Zero coverage is transparent.
    Masked {
        mask: &'a AlphaMask,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

impl Glyph<'_> {
    pub fn width(&self) -> u32 {
        match *self {
            Glyph::Packed { width, .. } | Glyph::Masked { width, .. } => width,
        }
    }

    pub fn height(&self) -> u32 {
        match *self {
            Glyph::Packed { height, .. } | Glyph::Masked { height, .. } => height,
        }
    }

    /// Whether the pixel at column `x`, row `y` (left to right, top down)
    /// is foreground.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        if x >= self.width() || y >= self.height() {
            return false;
        }
        match *self {
            Glyph::Packed { width, rows, .. } => {
                let stride = row_stride(width);
                let start = y as usize * stride;
                rows.get(start..start + stride)
                    .is_some_and(|row| row_bit(row, width - 1 - x))
            }
            Glyph::Masked { mask, x: ox, y: oy, .. } => {
                mask.alpha((ox + x) as i32, (oy + y) as i32) != 0
            }
        }
    }

    /// Paints the whole glyph cell at `at`.
    pub fn draw<S: Surface + ?Sized>(&self, dst: &mut S, at: Point, fg: Rgba, bg: Rgba) {
        match *self {
            Glyph::Packed {
                width,
                height,
                rows,
            } => draw_glyph_at(dst, at, width, height, rows, fg, bg),
            Glyph::Masked { width, height, .. } => {
                let fg = dst.convert(fg);
                let bg = dst.convert(bg);
                for dy in 0..height {
                    for dx in 0..width {
                        let color = if self.is_set(dx, dy) { fg } else { bg };
                        let (px, py) = at.shifted(dx, dy);
                        dst.set(px, py, color);
                    }
                }
            }
        }
    }
}

/// Anything that maps byte code points to glyph bitmaps.
pub trait GlyphSource {
    /// Glyph for `code`, or `CharacterOutOfRange`.
    fn glyph(&self, code: u8) -> Result<Glyph<'_>>;

    /// Size of one character cell in pixels, padding included.
    fn cell_size(&self) -> (u32, u32);

    fn valid_range(&self) -> RangeInclusive<u8>;

    /// Narrows a code point to a byte this font can draw.
    fn check_code(&self, code: u32) -> Result<u8> {
        let range = self.valid_range();
        match u8::try_from(code) {
            Ok(b) if range.contains(&b) => Ok(b),
            _ => Err(FontError::CharacterOutOfRange {
                code,
                lo: *range.start(),
                hi: *range.end(),
            }),
        }
    }
}

impl<T: GlyphSource + ?Sized> GlyphSource for &T {
    fn glyph(&self, code: u8) -> Result<Glyph<'_>> {
        (**self).glyph(code)
    }

    fn cell_size(&self) -> (u32, u32) {
        (**self).cell_size()
    }

    fn valid_range(&self) -> RangeInclusive<u8> {
        (**self).valid_range()
    }
}
