//! Pixel surfaces that glyphs are drawn onto.

use crate::bits;
use crate::error::{FontError, Result};

/// A non-premultiplied 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 0xff);
    pub const WHITE: Rgba = Rgba::new(0xff, 0xff, 0xff, 0xff);
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque gray of intensity `v`.
    pub const fn gray(v: u8) -> Self {
        Self::new(v, v, v, 0xff)
    }

    pub fn is_gray(self) -> bool {
        self.r == self.g && self.g == self.b
    }

    /// ITU-R 601 luma, rounded.
    pub fn luma(self) -> u8 {
        let y = 299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32;
        ((y + 500) / 1000) as u8
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

/// A pixel-addressable destination.
///
/// `set` silently ignores coordinates outside the surface, so callers can
/// draw partially visible glyphs without checking bounds first.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn set(&mut self, x: i32, y: i32, color: Rgba);

    fn get(&self, x: i32, y: i32) -> Option<Rgba>;

    /// Maps a color into this surface's color model.
    fn convert(&self, color: Rgba) -> Rgba {
        color
    }

    fn fill(&mut self, color: Rgba) {
        for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                self.set(x, y, color);
            }
        }
    }

    /// Allocates a zeroed surface of the given size.
    fn blank(width: u32, height: u32) -> Result<Self>
    where
        Self: Sized;
}

fn alloc_pixels(width: u32, height: u32, channels: usize) -> Result<Vec<u8>> {
    let err = || FontError::SurfaceAllocation { width, height };
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(err)?;
    let mut pixels = Vec::new();
    pixels.try_reserve_exact(len).map_err(|_| err())?;
    pixels.resize(len, 0);
    Ok(pixels)
}

fn index(width: u32, height: u32, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 {
        return None;
    }
    let ux = x as usize;
    let uy = y as usize;
    if ux >= width as usize || uy >= height as usize {
        return None;
    }
    Some(uy * width as usize + ux)
}

/// Four bytes per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaImage {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            width,
            height,
            pixels: alloc_pixels(width, height, 4)?,
        })
    }

    /// Wraps an existing RGBA8 buffer. Returns `None` when the length does
    /// not match the dimensions.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize * 4).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.get(x as i32, y as i32).unwrap_or_default()
    }
}

impl Surface for RgbaImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = index(self.width, self.height, x, y) {
            self.pixels[i * 4..i * 4 + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        let i = index(self.width, self.height, x, y)? * 4;
        let p = &self.pixels[i..i + 4];
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }

    fn fill(&mut self, color: Rgba) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    fn blank(width: u32, height: u32) -> Result<Self> {
        Self::new(width, height)
    }
}

/// One opaque luma byte per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            width,
            height,
            pixels: alloc_pixels(width, height, 1)?,
        })
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }
}

impl Surface for GrayImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = index(self.width, self.height, x, y) {
            self.pixels[i] = color.luma();
        }
    }

    fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        index(self.width, self.height, x, y).map(|i| Rgba::gray(self.pixels[i]))
    }

    fn convert(&self, color: Rgba) -> Rgba {
        Rgba::gray(color.luma())
    }

    fn blank(width: u32, height: u32) -> Result<Self> {
        Self::new(width, height)
    }
}

/// One coverage byte per pixel; `0x00` is transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl AlphaMask {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            width,
            height,
            pixels: alloc_pixels(width, height, 1)?,
        })
    }

    /// Builds a mask from packed 1-bit rows, `stride` bits per row.
    pub fn from_bits(stride: u32, rows: &[u8]) -> Self {
        let pixels = bits::unpack_bits(rows);
        let height = if stride == 0 {
            0
        } else {
            (pixels.len() / stride as usize) as u32
        };
        Self {
            width: stride,
            height,
            pixels,
        }
    }

    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Coverage at `(x, y)`, zero outside the mask.
    pub fn alpha(&self, x: i32, y: i32) -> u8 {
        index(self.width, self.height, x, y).map_or(0, |i| self.pixels[i])
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    /// Packs the mask back into 1-bit rows, MSB first.
    pub fn to_packed_bytes(&self) -> Vec<u8> {
        bits::pack_bits(&self.pixels)
    }
}

impl Surface for AlphaMask {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = index(self.width, self.height, x, y) {
            self.pixels[i] = color.a;
        }
    }

    fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        index(self.width, self.height, x, y).map(|i| Rgba::new(0xff, 0xff, 0xff, self.pixels[i]))
    }

    fn convert(&self, color: Rgba) -> Rgba {
        Rgba::new(0xff, 0xff, 0xff, color.a)
    }

    fn blank(width: u32, height: u32) -> Result<Self> {
        Self::new(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clips_outside_bounds() {
        let mut img = RgbaImage::new(2, 2).unwrap();
        img.set(-1, 0, Rgba::WHITE);
        img.set(0, 2, Rgba::WHITE);
        img.set(2, 0, Rgba::WHITE);
        assert!(img.as_raw().iter().all(|&b| b == 0));

        img.set(1, 1, Rgba::WHITE);
        assert_eq!(img.pixel(1, 1), Rgba::WHITE);
        assert_eq!(img.get(5, 5), None);
    }

    #[test]
    fn test_fill() {
        let mut img = RgbaImage::new(3, 2).unwrap();
        img.fill(Rgba::gray(0xa8));
        assert!(img.as_raw().chunks_exact(4).all(|p| p == [0xa8, 0xa8, 0xa8, 0xff]));
    }

    #[test]
    fn test_gray_converts_to_luma() {
        let mut img = GrayImage::new(1, 1).unwrap();
        assert_eq!(img.convert(Rgba::WHITE), Rgba::WHITE);
        img.set(0, 0, Rgba::new(0xff, 0, 0, 0xff));
        assert_eq!(img.as_raw(), &[76]);
    }

    #[test]
    fn test_mask_from_bits() {
        let mask = AlphaMask::from_bits(8, &[0x81, 0x00]);
        assert_eq!((mask.width(), mask.height()), (8, 2));
        assert_eq!(mask.alpha(0, 0), 0xff);
        assert_eq!(mask.alpha(1, 0), 0x00);
        assert_eq!(mask.alpha(7, 0), 0xff);
        assert_eq!(mask.alpha(0, 1), 0x00);
        assert_eq!(mask.to_packed_bytes(), vec![0x81, 0x00]);
    }

    #[test]
    fn test_allocation_overflow_is_an_error() {
        let err = RgbaImage::new(u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(err, FontError::SurfaceAllocation { .. }));
    }
}
