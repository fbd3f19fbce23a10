use thiserror::Error;

/// Errors produced while decoding fonts or rendering text.
#[derive(Debug, Error)]
pub enum FontError {
    /// Binary buffer size does not match 256 glyphs of the declared width.
    #[error("malformed font data: {len} bytes is not a whole number of {stride}-byte rows for 256 glyphs")]
    MalformedFontData { len: usize, stride: usize },

    /// The sprite-sheet stream is not a usable image.
    #[error("image decode error: {0}")]
    ImageDecode(String),

    /// The sprite-sheet grid ran out of image before every glyph was sliced.
    #[error("glyph grid exceeds {width}x{height} image after {sliced} of {needed} glyphs")]
    GlyphSliceOutOfBounds {
        width: u32,
        height: u32,
        sliced: usize,
        needed: usize,
    },

    /// The requested code point has no glyph in the font.
    #[error("character out of range: {code:#04x} (font covers {lo:#04x}..={hi:#04x})")]
    CharacterOutOfRange { code: u32, lo: u8, hi: u8 },

    /// Sprite-sheet layout parameters are unusable.
    #[error("invalid sheet layout: {0}")]
    InvalidLayout(String),

    /// The destination surface could not be allocated.
    #[error("cannot allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("PNG encoding error: {0}")]
    ImageEncode(#[from] png::EncodingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FontError>;
