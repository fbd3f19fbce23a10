//! Fonts drawn as a grid of glyphs in a PNG sprite sheet.
//!
//! Each cell is `grid_size` plus `grid_padding` pixels on every side, cells
//! run left to right then top to bottom, and the first cell holds
//! `char_start`. Sheets come in all sorts of shapes, so the image is reduced
//! to a coverage mask when loading (see [`MaskSource`]).

use std::array;
use std::io::{Read, Write};
use std::ops::RangeInclusive;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{FontError, Result};
use crate::pngio;
use crate::raster::{Glyph, GlyphSource, Point};
use crate::surface::{AlphaMask, Rgba, RgbaImage, Surface};
use crate::table::{CHARSET_SIZE, GlyphTable, row_stride};

/// Mask value treated as "no ink".
pub const TRANSPARENT: u8 = 0x00;

/// Geometry of a sprite-sheet font.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub name: String,
    /// Nominal glyph width in pixels, informational.
    #[serde(default)]
    pub width: u32,
    /// Cell content size, padding excluded.
    pub grid_size: [u32; 2],
    #[serde(default)]
    pub grid_padding: u32,
    pub char_start: u8,
    pub char_end: u8,
}

impl SheetLayout {
    /// Layout of MicroFont by mibi88: 4x4 glyphs, 1px padding, printable
    /// ASCII.
    pub fn microfont() -> Self {
        Self {
            name: "microfont".to_string(),
            width: 4,
            grid_size: [4, 4],
            grid_padding: 1,
            char_start: 32,
            char_end: 127,
        }
    }

    /// Padded cell size, saturating for layouts that fail [`validate`].
    ///
    /// [`validate`]: SheetLayout::validate
    pub fn cell_size(&self) -> (u32, u32) {
        self.padded_cell().unwrap_or((u32::MAX, u32::MAX))
    }

    fn padded_cell(&self) -> Option<(u32, u32)> {
        let pad = self.grid_padding.checked_mul(2)?;
        Some((
            self.grid_size[0].checked_add(pad)?,
            self.grid_size[1].checked_add(pad)?,
        ))
    }

    pub fn glyph_count(&self) -> usize {
        (self.char_end as usize + 1).saturating_sub(self.char_start as usize)
    }

    pub fn validate(&self) -> Result<()> {
        if self.char_start > self.char_end {
            return Err(FontError::InvalidLayout(format!(
                "{}: char_start {} is after char_end {}",
                self.name, self.char_start, self.char_end
            )));
        }
        if self.grid_size[0] == 0 || self.grid_size[1] == 0 {
            return Err(FontError::InvalidLayout(format!(
                "{}: empty grid size {}x{}",
                self.name, self.grid_size[0], self.grid_size[1]
            )));
        }
        if self.padded_cell().is_none() {
            return Err(FontError::InvalidLayout(format!(
                "{}: padding {} overflows a {}x{} cell",
                self.name, self.grid_padding, self.grid_size[0], self.grid_size[1]
            )));
        }
        Ok(())
    }
}

/// How the source image was turned into a mask. Checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskSource {
    /// The image had transparency; its alpha channel is the mask.
    Alpha,
    /// Opaque grayscale; `inverted` when the dominant shade was light.
    Gray { inverted: bool },
    /// Anything else; pixels differing from the top-left one are ink.
    Background(Rgba),
}

#[derive(Debug, Clone)]
pub struct SpriteSheetFont {
    layout: SheetLayout,
    mask: AlphaMask,
    source: MaskSource,
    /// Top-left corner of each glyph cell, `char_start` first.
    cells: Vec<(u32, u32)>,
}

impl SpriteSheetFont {
    /// Decodes a PNG sprite sheet.
    pub fn load<R: Read>(layout: SheetLayout, r: R) -> Result<Self> {
        layout.validate()?;
        let image = pngio::decode(r)?;
        Self::from_image(layout, &image)
    }

    /// Builds the font from an already decoded sheet.
    pub fn from_image(layout: SheetLayout, image: &RgbaImage) -> Result<Self> {
        layout.validate()?;
        let (mask, source) = normalize(image)?;

        let (cw, ch) = layout.cell_size();
        let (width, height) = (mask.width(), mask.height());
        let needed = layout.glyph_count();
        let mut cells = Vec::with_capacity(needed);

        let mut y = 0u32;
        while cells.len() < needed && y.saturating_add(ch) <= height {
            let mut x = 0u32;
            while cells.len() < needed && x.saturating_add(cw) <= width {
                cells.push((x, y));
                x += cw;
            }
            y += ch;
        }
        if cells.len() < needed {
            return Err(FontError::GlyphSliceOutOfBounds {
                width,
                height,
                sliced: cells.len(),
                needed,
            });
        }

        debug!(
            "loaded sprite font {}: {} glyphs from {}x{} sheet, mask from {:?}",
            layout.name, needed, width, height, source
        );
        Ok(Self {
            layout,
            mask,
            source,
            cells,
        })
    }

    pub fn name(&self) -> &str {
        &self.layout.name
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    pub fn mask_source(&self) -> MaskSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Draws the padded cell of `code` at `at`: ink in `fg`, the rest in
    /// `bg`, both converted to the destination's color model.
    pub fn draw_char<S: Surface + ?Sized>(
        &self,
        dst: &mut S,
        code: u8,
        at: Point,
        fg: Rgba,
        bg: Rgba,
    ) -> Result<()> {
        self.glyph(code)?.draw(dst, at, fg, bg);
        Ok(())
    }

    /// Draws `text` on one line, one cell per character. Stops at the first
    /// character outside the font; earlier characters stay drawn.
    pub fn write_string<S: Surface + ?Sized>(
        &self,
        dst: &mut S,
        text: &str,
        mut at: Point,
        fg: Rgba,
        bg: Rgba,
    ) -> Result<()> {
        let advance = self.layout.cell_size().0;
        for c in text.chars() {
            let code = self.check_code(c as u32)?;
            self.draw_char(dst, code, at, fg, bg)?;
            at.x = at.x.saturating_add_unsigned(advance);
        }
        Ok(())
    }

    /// Pixel width of `text` drawn with [`SpriteSheetFont::write_string`].
    pub fn x_width(&self, text: &str) -> u32 {
        let count = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        count.saturating_mul(self.layout.cell_size().0)
    }

    /// Packed rows for all 256 code points in the binary font layout.
    ///
    /// Padding is dropped, `y_padding` (0–7) blank rows are appended to each
    /// glyph, and code points outside the sheet come out blank.
    pub fn to_bitmap(&self, y_padding: u8) -> [Vec<u8>; CHARSET_SIZE] {
        let ypad = (y_padding & 0x07) as usize;
        let [gx, gy] = self.layout.grid_size;
        let pad = self.layout.grid_padding;
        let stride = row_stride(gx);

        array::from_fn(|ch| {
            let mut rows = vec![0u8; (gy as usize + ypad) * stride];
            let Ok(glyph) = self.glyph(ch as u8) else {
                return rows;
            };
            for dy in 0..gy {
                for dx in 0..gx {
                    if glyph.is_set(pad + dx, pad + dy) {
                        let bit = gx - 1 - dx;
                        let row = dy as usize * stride;
                        rows[row + stride - 1 - (bit / 8) as usize] |= 1 << (bit % 8);
                    }
                }
            }
            rows
        })
    }

    /// The sheet converted to a binary font.
    pub fn to_glyph_table(&self, y_padding: u8) -> Result<GlyphTable> {
        let data = self.to_bitmap(y_padding).concat();
        GlyphTable::decode(&data, self.layout.grid_size[0])
    }

    pub fn write_bitmap<W: Write>(&self, mut w: W, y_padding: u8) -> Result<()> {
        for rows in self.to_bitmap(y_padding) {
            w.write_all(&rows)?;
        }
        Ok(())
    }
}

impl GlyphSource for SpriteSheetFont {
    fn glyph(&self, code: u8) -> Result<Glyph<'_>> {
        let code = self.check_code(code as u32)?;
        let (x, y) = self.cells[(code - self.layout.char_start) as usize];
        let (width, height) = self.layout.cell_size();
        Ok(Glyph::Masked {
            mask: &self.mask,
            x,
            y,
            width,
            height,
        })
    }

    fn cell_size(&self) -> (u32, u32) {
        self.layout.cell_size()
    }

    fn valid_range(&self) -> RangeInclusive<u8> {
        self.layout.char_start..=self.layout.char_end
    }
}

/// Reduces a sheet to a coverage mask.
fn normalize(image: &RgbaImage) -> Result<(AlphaMask, MaskSource)> {
    let (width, height) = (image.width(), image.height());
    let pixels: Vec<Rgba> = image
        .as_raw()
        .chunks_exact(4)
        .map(|p| Rgba::new(p[0], p[1], p[2], p[3]))
        .collect();

    let (mask, source) = if pixels.iter().any(|p| p.a != 0xff) {
        (pixels.iter().map(|p| p.a).collect(), MaskSource::Alpha)
    } else if pixels.iter().all(|p| p.is_gray()) {
        let mut histogram = [0usize; 256];
        for p in &pixels {
            histogram[p.r as usize] += 1;
        }
        let mut dominant = 0;
        for (v, &n) in histogram.iter().enumerate() {
            if n > histogram[dominant] {
                dominant = v;
            }
        }
        let inverted = dominant >= 0x80;
        let mask = pixels
            .iter()
            .map(|p| {
                let v = if inverted { 0xff - p.r } else { p.r };
                if v >= 0x80 { 0xff } else { TRANSPARENT }
            })
            .collect();
        (mask, MaskSource::Gray { inverted })
    } else {
        let bg = pixels[0];
        let mask = pixels
            .iter()
            .map(|&p| if p != bg { 0xff } else { TRANSPARENT })
            .collect();
        (mask, MaskSource::Background(bg))
    };

    let mask = AlphaMask::from_raw(width, height, mask)
        .ok_or_else(|| FontError::ImageDecode("pixel count does not match dimensions".into()))?;
    Ok((mask, source))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use pretty_assertions::assert_eq;

    const COLUMNS: u32 = 16;

    /// MicroFont-shaped sheet. Glyph `i` has ink at content pixels
    /// `(i % 4, 0)` and `(3, 3)`.
    fn sheet(rows: u32, bg: Rgba, ink: Rgba) -> RgbaImage {
        let layout = SheetLayout::microfont();
        let (cw, ch) = layout.cell_size();
        let mut img = RgbaImage::new(COLUMNS * cw, rows * ch).unwrap();
        img.fill(bg);
        for i in 0..layout.glyph_count() as u32 {
            let ox = (i % COLUMNS * cw + 1) as i32;
            let oy = (i / COLUMNS * ch + 1) as i32;
            img.set(ox + (i % 4) as i32, oy, ink);
            img.set(ox + 3, oy + 3, ink);
        }
        img
    }

    fn microfont(bg: Rgba, ink: Rgba) -> SpriteSheetFont {
        SpriteSheetFont::from_image(SheetLayout::microfont(), &sheet(6, bg, ink)).unwrap()
    }

    #[test]
    fn test_slices_every_printable_character() {
        let font = microfont(Rgba::TRANSPARENT, Rgba::WHITE);
        assert_eq!(font.len(), 96);
        assert!(font.glyph(32).is_ok());
        assert!(font.glyph(127).is_ok());

        for code in [31u8, 128] {
            let err = font.glyph(code).unwrap_err();
            assert!(matches!(
                err,
                FontError::CharacterOutOfRange { lo: 32, hi: 127, .. }
            ));
        }
    }

    #[test]
    fn test_glyph_cells_are_row_major() {
        let font = microfont(Rgba::TRANSPARENT, Rgba::WHITE);
        // 'A' is glyph 33: second row, second column.
        match font.glyph(b'A').unwrap() {
            Glyph::Masked { x, y, width, height, .. } => {
                assert_eq!((x, y, width, height), (6, 12, 6, 6));
            }
            Glyph::Packed { .. } => panic!("sprite glyphs are masked"),
        }
    }

    #[test]
    fn test_alpha_sheet_uses_alpha_channel() {
        let font = microfont(Rgba::TRANSPARENT, Rgba::WHITE);
        assert_eq!(font.mask_source(), MaskSource::Alpha);
        let glyph = font.glyph(b'A').unwrap();
        assert!(glyph.is_set(2, 1));
        assert!(glyph.is_set(4, 4));
        assert!(!glyph.is_set(1, 1));
    }

    #[test]
    fn test_gray_sheet_polarity() {
        let dark_on_light = microfont(Rgba::WHITE, Rgba::BLACK);
        assert_eq!(
            dark_on_light.mask_source(),
            MaskSource::Gray { inverted: true }
        );
        let light_on_dark = microfont(Rgba::BLACK, Rgba::WHITE);
        assert_eq!(
            light_on_dark.mask_source(),
            MaskSource::Gray { inverted: false }
        );

        for font in [dark_on_light, light_on_dark] {
            let glyph = font.glyph(b'A').unwrap();
            assert!(glyph.is_set(2, 1));
            assert!(!glyph.is_set(0, 0));
        }
    }

    #[test]
    fn test_color_sheet_uses_top_left_as_background() {
        let blue = Rgba::new(0, 0, 0xff, 0xff);
        let red = Rgba::new(0xff, 0, 0, 0xff);
        let font = microfont(blue, red);
        assert_eq!(font.mask_source(), MaskSource::Background(blue));
        let glyph = font.glyph(b'A').unwrap();
        assert!(glyph.is_set(2, 1));
        assert!(!glyph.is_set(3, 1));
    }

    #[test]
    fn test_truncated_sheet_is_rejected() {
        let err = SpriteSheetFont::from_image(
            SheetLayout::microfont(),
            &sheet(5, Rgba::TRANSPARENT, Rgba::WHITE),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FontError::GlyphSliceOutOfBounds {
                sliced: 80,
                needed: 96,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_layout() {
        let mut layout = SheetLayout::microfont();
        layout.char_start = 128;
        let err = SpriteSheetFont::from_image(layout, &sheet(6, Rgba::BLACK, Rgba::WHITE))
            .unwrap_err();
        assert!(matches!(err, FontError::InvalidLayout(_)));
    }

    #[test]
    fn test_overflowing_padding_is_rejected() {
        let mut layout = SheetLayout::microfont();
        layout.grid_padding = u32::MAX / 2 + 1;
        assert_eq!(layout.cell_size(), (u32::MAX, u32::MAX));

        let err = SpriteSheetFont::load(layout, Cursor::new(Vec::new())).unwrap_err();
        assert!(matches!(err, FontError::InvalidLayout(_)));

        let mut layout = SheetLayout::microfont();
        layout.grid_size = [u32::MAX - 1, 4];
        assert!(matches!(layout.validate(), Err(FontError::InvalidLayout(_))));
    }

    #[test]
    fn test_load_rejects_non_png_input() {
        let garbage = b"GIF89a this is not a png".to_vec();
        let err =
            SpriteSheetFont::load(SheetLayout::microfont(), Cursor::new(garbage)).unwrap_err();
        assert!(matches!(err, FontError::ImageDecode(_)));
    }

    #[test]
    fn test_load_decodes_png_sheet() {
        let mut png = Vec::new();
        pngio::encode(&sheet(6, Rgba::TRANSPARENT, Rgba::WHITE), &mut png).unwrap();
        let font = SpriteSheetFont::load(SheetLayout::microfont(), Cursor::new(png)).unwrap();
        assert_eq!(font.len(), 96);
        assert_eq!(font.mask_source(), MaskSource::Alpha);
    }

    #[test]
    fn test_x_width() {
        let font = microfont(Rgba::TRANSPARENT, Rgba::WHITE);
        assert_eq!(font.x_width("Hello, World!"), 13 * 6);
        assert_eq!(font.x_width(""), 0);
    }

    #[test]
    fn test_draw_char_fills_the_cell() {
        let font = microfont(Rgba::TRANSPARENT, Rgba::WHITE);
        let mut dst = RgbaImage::new(8, 8).unwrap();
        font.draw_char(&mut dst, b'A', Point::new(1, 1), Rgba::BLACK, Rgba::WHITE)
            .unwrap();

        assert_eq!(dst.pixel(0, 0), Rgba::TRANSPARENT);
        assert_eq!(dst.pixel(1, 1), Rgba::WHITE);
        assert_eq!(dst.pixel(3, 2), Rgba::BLACK);
        assert_eq!(dst.pixel(5, 5), Rgba::BLACK);
        assert_eq!(dst.pixel(6, 6), Rgba::WHITE);
        assert_eq!(dst.pixel(7, 7), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_write_string_stops_at_first_bad_character() {
        let font = microfont(Rgba::TRANSPARENT, Rgba::WHITE);
        let mut dst = RgbaImage::new(18, 6).unwrap();
        let err = font
            .write_string(&mut dst, "A\u{80}A", Point::ORIGIN, Rgba::WHITE, Rgba::BLACK)
            .unwrap_err();
        assert!(matches!(err, FontError::CharacterOutOfRange { code: 0x80, .. }));

        assert_eq!(dst.pixel(2, 1), Rgba::WHITE);
        assert_eq!(dst.pixel(12 + 2, 1), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_to_bitmap() {
        let font = microfont(Rgba::TRANSPARENT, Rgba::WHITE);
        let bitmap = font.to_bitmap(1);

        assert_eq!(bitmap[b'A' as usize], vec![0x04, 0x00, 0x00, 0x01, 0x00]);
        // glyph 0 (' ') has ink at content x = 0
        assert_eq!(bitmap[b' ' as usize], vec![0x08, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(bitmap[0], vec![0u8; 5]);
        assert_eq!(bitmap[200], vec![0u8; 5]);

        assert_eq!(font.to_bitmap(9)[b'A' as usize].len(), 5);
        assert_eq!(font.to_bitmap(0)[b'A' as usize].len(), 4);
    }

    #[test]
    fn test_export_to_binary_font() {
        let font = microfont(Rgba::TRANSPARENT, Rgba::WHITE);
        let table = font.to_glyph_table(2).unwrap();
        assert_eq!((table.width(), table.height()), (4, 6));
        assert_eq!(table.glyph_bits(b'A'), &[0x04, 0, 0, 0x01, 0, 0]);

        let mut out = Vec::new();
        font.write_bitmap(&mut out, 2).unwrap();
        assert_eq!(out, table.encode());
    }

    #[test]
    fn test_layout_from_json() {
        let layout: SheetLayout = serde_json::from_str(
            r#"{"name": "microfont", "width": 4, "grid_size": [4, 4],
                "grid_padding": 1, "char_start": 32, "char_end": 127}"#,
        )
        .unwrap();
        assert_eq!(layout, SheetLayout::microfont());

        let minimal: SheetLayout = serde_json::from_str(
            r#"{"name": "x", "grid_size": [8, 8], "char_start": 48, "char_end": 57}"#,
        )
        .unwrap();
        assert_eq!(minimal.grid_padding, 0);
        assert_eq!(minimal.glyph_count(), 10);
    }
}
