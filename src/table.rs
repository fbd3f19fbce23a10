//! Binary bitmap fonts: 256 fixed-size glyphs in one flat buffer.
//!
//! The wire format has no header. Glyph 0 comes first, each glyph's rows
//! are consecutive and each row takes [`row_stride`] bytes, so the size of
//! an 8-pixel wide font gives away its height: 2048 bytes is 8x8, 3584 is
//! 8x14 and 4096 is 8x16.

use std::fs;
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::Path;

use log::{debug, warn};

use crate::canvas::Canvas;
use crate::error::{FontError, Result};
use crate::raster::{Glyph, GlyphSource};
use crate::surface::{Rgba, RgbaImage};

/// Number of glyphs in every binary font.
pub const CHARSET_SIZE: usize = 256;

/// Width assumed when none is given.
pub const DEFAULT_WIDTH: u32 = 8;

/// Bytes needed for one row of a glyph `width` bits wide. Zero means the
/// default 8-bit width.
pub fn row_stride(width: u32) -> usize {
    let width = if width == 0 { DEFAULT_WIDTH } else { width };
    width.div_ceil(8) as usize
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphTable {
    width: u32,
    height: u32,
    charset: Option<String>,
    data: Vec<u8>,
}

impl GlyphTable {
    /// Splits `buffer` into 256 glyphs of `width` bits, inferring the height
    /// from the buffer length.
    ///
    /// A buffer too short for even one row per glyph gives a table of height
    /// zero, which draws nothing.
    pub fn decode(buffer: &[u8], width: u32) -> Result<Self> {
        let width = if width == 0 { DEFAULT_WIDTH } else { width };
        let stride = row_stride(width);
        let block = CHARSET_SIZE * stride;
        let height = buffer.len() / block;

        if height == 0 {
            warn!(
                "font buffer of {} bytes is shorter than one row per glyph, height is 0",
                buffer.len()
            );
            return Ok(Self {
                width,
                height: 0,
                charset: None,
                data: Vec::new(),
            });
        }
        if buffer.len() != block * height {
            return Err(FontError::MalformedFontData {
                len: buffer.len(),
                stride,
            });
        }

        debug!("decoded {width}x{height} font ({} bytes)", buffer.len());
        Ok(Self {
            width,
            height: height as u32,
            charset: None,
            data: buffer.to_vec(),
        })
    }

    /// Reads and decodes a font file.
    pub fn load(path: impl AsRef<Path>, width: u32) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        Self::decode(&data, width)
    }

    /// Attaches a code page label such as `"866"`. Rendering ignores it.
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Bytes per glyph.
    pub fn glyph_size(&self) -> usize {
        row_stride(self.width) * self.height as usize
    }

    /// Packed rows of glyph `code`.
    pub fn glyph_bits(&self, code: u8) -> &[u8] {
        let size = self.glyph_size();
        let start = code as usize * size;
        &self.data[start..start + size]
    }

    /// The wire-format buffer, glyph 0 first.
    pub fn encode(&self) -> Vec<u8> {
        self.data.clone()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn write_to<W: Write>(&self, mut w: W) -> Result<()> {
        w.write_all(&self.data)?;
        Ok(())
    }

    /// Contact sheet of all 256 glyphs, gray on black.
    pub fn sample(&self, per_line: usize) -> Result<RgbaImage> {
        self.sample_color(per_line, Rgba::gray(0xa8), Rgba::BLACK)
    }

    /// Contact sheet of all 256 glyphs in `per_line` columns with one pixel
    /// between cells.
    pub fn sample_color(&self, per_line: usize, fg: Rgba, bg: Rgba) -> Result<RgbaImage> {
        let per_line = per_line.clamp(1, CHARSET_SIZE);
        let codes: Vec<u8> = (0..=u8::MAX).collect();
        let lines: Vec<&[u8]> = codes.chunks(per_line).collect();

        let mut canvas: Canvas<_, RgbaImage> = Canvas::new(self)
            .with_foreground(fg)
            .with_background(bg)
            .with_spacing(1, 1);
        canvas.render(&lines)?;
        canvas.into_image()
    }
}

impl GlyphSource for GlyphTable {
    fn glyph(&self, code: u8) -> Result<Glyph<'_>> {
        Ok(Glyph::Packed {
            width: self.width,
            height: self.height,
            rows: self.glyph_bits(code),
        })
    }

    fn cell_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn valid_range(&self) -> RangeInclusive<u8> {
        0..=u8::MAX
    }
}
