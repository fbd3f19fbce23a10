//! PNG reading and writing for sprite sheets and rendered surfaces.
//!
//! Output uses fixed compression and filter settings so the same surface
//! always encodes to the same bytes.

use std::io::{Read, Write};

use png::{BitDepth, ColorType, Compression, Decoder, Encoder, FilterType, Transformations};

use crate::error::{FontError, Result};
use crate::surface::{RgbaImage, Surface};

fn decode_err(e: impl std::fmt::Display) -> FontError {
    FontError::ImageDecode(e.to_string())
}

/// Decodes a PNG stream into RGBA8. Palette, low bit depth and 16-bit
/// images are normalized to 8 bits per channel.
pub fn decode<R: Read>(r: R) -> Result<RgbaImage> {
    let mut decoder = Decoder::new(r);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(decode_err)?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(decode_err)?;

    if info.bit_depth != BitDepth::Eight {
        return Err(decode_err(format_args!(
            "unsupported bit depth {:?}",
            info.bit_depth
        )));
    }
    let channels = match info.color_type {
        ColorType::Grayscale => 1,
        ColorType::GrayscaleAlpha => 2,
        ColorType::Rgb => 3,
        ColorType::Rgba => 4,
        ColorType::Indexed => return Err(decode_err("palette was not expanded")),
    };

    let (width, height) = (info.width as usize, info.height as usize);
    let mut rgba = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let start = y * info.line_size;
        let line = buf
            .get(start..start + width * channels)
            .ok_or_else(|| decode_err("truncated image data"))?;
        for px in line.chunks_exact(channels) {
            let pixel = match *px {
                [v] => [v, v, v, 0xff],
                [v, a] => [v, v, v, a],
                [r, g, b] => [r, g, b, 0xff],
                [r, g, b, a] => [r, g, b, a],
                _ => unreachable!("chunks_exact yields {channels} bytes"),
            };
            rgba.extend_from_slice(&pixel);
        }
    }

    RgbaImage::from_raw(info.width, info.height, rgba)
        .ok_or_else(|| decode_err("pixel count does not match dimensions"))
}

/// Encodes any surface as an 8-bit RGBA PNG.
pub fn encode<S: Surface + ?Sized, W: Write>(surface: &S, w: W) -> Result<()> {
    let (width, height) = (surface.width(), surface.height());
    let mut encoder = Encoder::new(w, width, height);
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(Compression::Default);
    encoder.set_filter(FilterType::NoFilter);

    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let c = surface.get(x, y).unwrap_or_default();
            data.extend_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&data)?;
    writer.finish()?;
    Ok(())
}
