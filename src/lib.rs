//! Fixed-width bitmap font rendering.
//!
//! Fonts come from packed binary `.fnt` blobs ([`GlyphTable`]) or PNG sprite
//! sheets ([`SpriteSheetFont`]); both implement [`GlyphSource`], which the
//! [`Canvas`] lays text out with.
//!
//! ```no_run
//! use fontpic::{Canvas, GlyphTable, RgbaImage};
//!
//! let font = GlyphTable::load("fnt/08x16.fnt", 8)?;
//! let mut canvas: Canvas<_, RgbaImage> = Canvas::new(&font).with_spacing(1, 0);
//! canvas.render_text("Hello,\tworld\n")?;
//! let image = canvas.into_image()?;
//! fontpic::pngio::encode(&image, std::fs::File::create("hello.png")?)?;
//! # Ok::<(), fontpic::FontError>(())
//! ```

pub mod bits;
pub mod canvas;
pub mod charset;
pub mod error;
pub mod face;
pub mod pngio;
pub mod raster;
pub mod sheet;
pub mod surface;
pub mod table;

pub use canvas::{Canvas, CanvasState};
pub use charset::{CP866, Charset};
pub use error::{FontError, Result};
pub use face::{Face, Metrics};
pub use raster::{Glyph, GlyphSource, Point, draw_glyph_at};
pub use sheet::{MaskSource, SheetLayout, SpriteSheetFont};
pub use surface::{AlphaMask, GrayImage, Rgba, RgbaImage, Surface};
pub use table::{GlyphTable, row_stride};
