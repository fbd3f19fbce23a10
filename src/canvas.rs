//! Text layout onto a lazily allocated surface.
//!
//! Method naming follows one convention:
//!
//! - `render*` draws onto the canvas. The `text` variants split on line
//!   feeds, drop trailing carriage returns and expand tabs; the others draw
//!   the given lines verbatim, so a `\t` or `\r` is drawn with whatever glyph
//!   the font has for it.
//! - `with_*` sets a property.
//!
//! A fresh canvas draws gray (0xA8) on black with no spacing.

use log::debug;

use crate::error::{FontError, Result};
use crate::raster::{GlyphSource, Point};
use crate::surface::{Rgba, RgbaImage, Surface};

/// Size used when there is no text to measure (4:3).
pub const DEFAULT_WIDTH: u32 = 720;
pub const DEFAULT_HEIGHT: u32 = 540;

/// Spaces substituted for a tab by the `text` renderers.
pub const TAB_WIDTH: usize = 8;

pub const DEFAULT_FOREGROUND: Rgba = Rgba::gray(0xa8);
pub const DEFAULT_BACKGROUND: Rgba = Rgba::BLACK;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    /// No size and no surface yet.
    Unconfigured,
    /// Size known, surface not allocated.
    Sized,
    /// Surface exists; its bounds are the canvas size from now on.
    Materialized,
}

#[derive(Debug)]
pub struct Canvas<F, S = RgbaImage> {
    width: u32,
    height: u32,
    background: Rgba,
    foreground: Rgba,
    font: F,
    spacing: Point,
    scale: Point,
    image: Option<S>,
}

impl<F: GlyphSource, S: Surface> Canvas<F, S> {
    pub fn new(font: F) -> Self {
        Self {
            width: 0,
            height: 0,
            background: DEFAULT_BACKGROUND,
            foreground: DEFAULT_FOREGROUND,
            font,
            spacing: Point::ORIGIN,
            scale: Point::new(1, 1),
            image: None,
        }
    }

    pub fn with_font(mut self, font: F) -> Self {
        self.font = font;
        self
    }

    /// Extra pixels between glyphs. Negative values count as zero.
    pub fn with_spacing(mut self, x: i32, y: i32) -> Self {
        self.spacing = Point::new(x, y);
        self
    }

    /// Multiplier for the default size. Values below one count as one.
    pub fn with_scale(mut self, x: i32, y: i32) -> Self {
        self.scale = Point::new(x, y);
        self
    }

    /// Fixes the surface size. Zero in either axis means "fit the text".
    /// Has no effect once the surface exists.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        if self.image.is_none() {
            self.width = width;
            self.height = height;
        }
        self
    }

    pub fn with_background(mut self, bg: Rgba) -> Self {
        self.background = bg;
        self
    }

    pub fn with_foreground(mut self, fg: Rgba) -> Self {
        self.foreground = fg;
        self
    }

    /// Draws onto `image` instead of allocating a surface. The canvas takes
    /// its size from the image; get it back with [`Canvas::into_image`].
    pub fn with_image(mut self, image: S) -> Self {
        self.width = image.width();
        self.height = image.height();
        self.image = Some(image);
        self
    }

    pub fn state(&self) -> CanvasState {
        if self.image.is_some() {
            CanvasState::Materialized
        } else if self.width > 0 && self.height > 0 {
            CanvasState::Sized
        } else {
            CanvasState::Unconfigured
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn font(&self) -> &F {
        &self.font
    }

    pub fn spacing(&self) -> Point {
        self.spacing
    }

    /// Clamps settings that would make layout meaningless.
    fn ensure(&mut self) {
        self.scale.x = self.scale.x.max(1);
        self.scale.y = self.scale.y.max(1);
        self.spacing.x = self.spacing.x.max(0);
        self.spacing.y = self.spacing.y.max(0);
    }

    /// Measures `lines` and adopts the result as the canvas size, unless the
    /// surface already exists. A size that does not fit in `u32` is a
    /// [`FontError::SurfaceAllocation`].
    pub fn calc_size<L: AsRef<[u8]>>(&mut self, lines: &[L]) -> Result<(u32, u32)> {
        self.ensure();
        let (width, height) = if lines.is_empty() {
            (
                DEFAULT_WIDTH.checked_mul(self.scale.x as u32),
                DEFAULT_HEIGHT.checked_mul(self.scale.y as u32),
            )
        } else {
            let (gw, gh) = self.font.cell_size();
            let max_len = lines.iter().map(|l| l.as_ref().len()).max().unwrap_or(0);
            (
                fit(max_len, gw, self.spacing.x as u32),
                fit(lines.len(), gh, self.spacing.y as u32),
            )
        };
        let (Some(width), Some(height)) = (width, height) else {
            return Err(FontError::SurfaceAllocation {
                width: width.unwrap_or(u32::MAX),
                height: height.unwrap_or(u32::MAX),
            });
        };
        if self.image.is_none() {
            (self.width, self.height) = (width, height);
        }
        Ok((width, height))
    }

    fn take_image<L: AsRef<[u8]>>(&mut self, lines: &[L]) -> Result<S> {
        self.ensure();
        if let Some(image) = self.image.take() {
            return Ok(image);
        }
        if self.width == 0 || self.height == 0 {
            self.calc_size(lines)?;
        }
        let mut image = S::blank(self.width, self.height)?;
        image.fill(self.background);
        debug!("allocated {}x{} canvas surface", self.width, self.height);
        Ok(image)
    }

    /// Draws `lines` verbatim with the top-left corner at the origin.
    pub fn render<L: AsRef<[u8]>>(&mut self, lines: &[L]) -> Result<&mut Self> {
        self.render_at(lines, Point::ORIGIN)
    }

    /// Draws `lines` verbatim with the top-left corner at `at`.
    ///
    /// Stops at the first character the font cannot draw; everything drawn
    /// before it stays on the surface.
    pub fn render_at<L: AsRef<[u8]>>(&mut self, lines: &[L], at: Point) -> Result<&mut Self> {
        let mut image = self.take_image(lines)?;
        let drawn = self.draw_lines(&mut image, lines, at);
        self.image = Some(image);
        drawn?;
        Ok(self)
    }

    pub fn render_text(&mut self, text: impl AsRef<[u8]>) -> Result<&mut Self> {
        self.render_text_at(text, Point::ORIGIN)
    }

    /// Splits `text` on `\n`, strips trailing `\r`/`\n` from each line and
    /// replaces tabs with [`TAB_WIDTH`] spaces before drawing.
    pub fn render_text_at(&mut self, text: impl AsRef<[u8]>, at: Point) -> Result<&mut Self> {
        let lines = split_text(text.as_ref());
        self.render_at(&lines, at)
    }

    /// Like [`Canvas::render_text_at`] for Unicode text. Every character is
    /// drawn with the glyph at its code point, so anything above U+00FF is
    /// rejected before drawing starts.
    pub fn render_str_at(&mut self, text: &str, at: Point) -> Result<&mut Self> {
        let range = self.font.valid_range();
        let bytes = text
            .chars()
            .map(|c| {
                u8::try_from(u32::from(c)).map_err(|_| FontError::CharacterOutOfRange {
                    code: c.into(),
                    lo: *range.start(),
                    hi: *range.end(),
                })
            })
            .collect::<Result<Vec<u8>>>()?;
        self.render_text_at(bytes, at)
    }

    fn draw_lines<L: AsRef<[u8]>>(&self, image: &mut S, lines: &[L], at: Point) -> Result<()> {
        let (gw, gh) = self.font.cell_size();
        let step_x = i32::try_from(gw).unwrap_or(i32::MAX).saturating_add(self.spacing.x);
        let step_y = i32::try_from(gh).unwrap_or(i32::MAX).saturating_add(self.spacing.y);

        for (y, line) in lines.iter().enumerate() {
            for (x, &ch) in line.as_ref().iter().enumerate() {
                let code = self.font.check_code(ch as u32)?;
                let glyph = self.font.glyph(code)?;
                let pos = Point::new(offset(at.x, x, step_x), offset(at.y, y, step_y));
                glyph.draw(image, pos, self.foreground, self.background);
            }
        }
        Ok(())
    }

    /// The surface, allocated at the computed size if nothing has been
    /// drawn yet.
    pub fn image(&mut self) -> Result<&S> {
        let image = self.take_image::<&[u8]>(&[])?;
        Ok(&*self.image.insert(image))
    }

    /// Consumes the canvas and returns its surface.
    pub fn into_image(mut self) -> Result<S> {
        self.take_image::<&[u8]>(&[])
    }
}

/// Position of cell `index`, saturating far outside any surface.
fn offset(origin: i32, index: usize, step: i32) -> i32 {
    let index = i32::try_from(index).unwrap_or(i32::MAX);
    origin.saturating_add(index.saturating_mul(step))
}

/// `count` cells of `cell + spacing` pixels, if that fits in `u32`.
fn fit(count: usize, cell: u32, spacing: u32) -> Option<u32> {
    let count = u32::try_from(count).ok()?;
    cell.checked_add(spacing)?.checked_mul(count)
}

fn split_text(text: &[u8]) -> Vec<Vec<u8>> {
    text.split(|&b| b == b'\n')
        .map(|line| {
            let end = line
                .iter()
                .rposition(|&b| b != b'\r' && b != b'\n')
                .map_or(0, |i| i + 1);
            let mut out = Vec::with_capacity(end);
            for &b in &line[..end] {
                if b == b'\t' {
                    out.extend_from_slice(&[b' '; TAB_WIDTH]);
                } else {
                    out.push(b);
                }
            }
            out
        })
        .collect()
}
