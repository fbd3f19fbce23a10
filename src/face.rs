//! Font faces with typographic metrics over an unpacked coverage mask,
//! for text systems that want ascent/descent rather than raw rows.

use crate::bits;
use crate::raster::Glyph;
use crate::surface::{AlphaMask, Surface};
use crate::table::{GlyphTable, row_stride};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// Horizontal distance between glyph origins.
    pub advance: u32,
    pub width: u32,
    pub height: u32,
    pub ascent: u32,
    pub descent: u32,
    pub left: i32,
}

/// Glyphs stacked vertically in one mask, `metrics.height` rows each.
#[derive(Debug, Clone)]
pub struct Face {
    metrics: Metrics,
    mask: AlphaMask,
    first: u32,
}

impl Face {
    /// Face over all 256 glyphs of a binary font. Fonts taller than eight
    /// rows get two rows of descent, others one.
    pub fn from_table(table: &GlyphTable) -> Self {
        let (width, height) = (table.width(), table.height());
        let descent = if height > 8 { 2 } else { 1 };
        let metrics = Metrics {
            advance: width,
            width: width.saturating_sub(1),
            height,
            ascent: height.saturating_sub(descent),
            descent,
            left: 0,
        };
        Self::from_rows(table.as_bytes(), row_stride(width) as u32 * 8, metrics, '\0')
    }

    /// Face over packed rows `stride` pixels wide, the first glyph being
    /// `first`.
    pub fn from_rows(rows: &[u8], stride: u32, metrics: Metrics, first: char) -> Self {
        let mask = AlphaMask::from_bits(stride, rows);
        Self {
            metrics,
            mask,
            first: first as u32,
        }
    }

    /// Face over 16-pixel rows stored as bit-reversed words, as some
    /// arcade-era font dumps are.
    pub fn from_reversed_words(words: &[u16], metrics: Metrics, first: char) -> Self {
        Self::from_rows(&bits::reverse_bits16_be(words), 16, metrics, first)
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn mask(&self) -> &AlphaMask {
        &self.mask
    }

    pub fn glyph_count(&self) -> u32 {
        match self.metrics.height {
            0 => 0,
            h => self.mask.height() / h,
        }
    }

    /// Mask region holding `c`, if the face has it.
    pub fn glyph(&self, c: char) -> Option<Glyph<'_>> {
        let index = (c as u32).checked_sub(self.first)?;
        if index >= self.glyph_count() {
            return None;
        }
        Some(Glyph::Masked {
            mask: &self.mask,
            x: 0,
            y: index * self.metrics.height,
            width: self.metrics.advance.min(self.mask.width()),
            height: self.metrics.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::GlyphSource;
    use crate::table::CHARSET_SIZE;

    #[test]
    fn test_metrics_from_table() {
        let table = GlyphTable::decode(&vec![0u8; CHARSET_SIZE * 16], 8).unwrap();
        let face = Face::from_table(&table);
        assert_eq!(
            *face.metrics(),
            Metrics {
                advance: 8,
                width: 7,
                height: 16,
                ascent: 14,
                descent: 2,
                left: 0,
            }
        );
        assert_eq!(face.glyph_count(), 256);

        let table = GlyphTable::decode(&vec![0u8; CHARSET_SIZE * 8], 8).unwrap();
        assert_eq!(Face::from_table(&table).metrics().descent, 1);
    }

    #[test]
    fn test_face_glyph_matches_table_glyph() {
        let data: Vec<u8> = (0..CHARSET_SIZE * 8).map(|n| (n * 37 % 251) as u8).collect();
        let table = GlyphTable::decode(&data, 8).unwrap();
        let face = Face::from_table(&table);

        for c in ['\0', 'A', 'z', 'ÿ'] {
            let from_face = face.glyph(c).unwrap();
            let from_table = table.glyph(c as u8).unwrap();
            for y in 0..8 {
                for x in 0..8 {
                    assert_eq!(from_face.is_set(x, y), from_table.is_set(x, y), "{c:?} ({x}, {y})");
                }
            }
        }
        assert!(face.glyph('Ā').is_none());
    }

    #[test]
    fn test_reversed_words() {
        let metrics = Metrics {
            advance: 10,
            width: 9,
            height: 1,
            ascent: 1,
            descent: 0,
            left: 0,
        };
        let face = Face::from_reversed_words(&[0x0001, 0x0003], metrics, ' ');
        assert_eq!(face.glyph_count(), 2);

        let space = face.glyph(' ').unwrap();
        assert!(space.is_set(0, 0));
        assert!(!space.is_set(1, 0));

        let bang = face.glyph('!').unwrap();
        assert!(bang.is_set(1, 0));
        assert!(face.glyph('\u{1f}').is_none());
        assert!(face.glyph('"').is_none());
    }
}
