//! Conversions between packed 1-bit rows and one-byte-per-pixel buffers.

const BITS_PER_BYTE: usize = 8;

/// Expands every bit of `bytes` into a whole byte, most significant bit
/// first. Set bits become `0xFF`, clear bits `0x00`.
pub fn unpack_bits(bytes: &[u8]) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(bytes.len() * BITS_PER_BYTE);
    for &b in bytes {
        pixels.extend_from_slice(&bits_to_bytes(b));
    }
    pixels
}

fn bits_to_bytes(b: u8) -> [u8; 8] {
    let mut p = [0u8; 8];
    for (i, px) in p.iter_mut().enumerate() {
        *px = 0xff * ((b >> (7 - i)) & 1);
    }
    p
}

/// Packs one-byte-per-pixel data back into bits, MSB first. Any non-zero
/// pixel is a set bit; a trailing partial byte is zero-padded.
pub fn pack_bits(pixels: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; pixels.len().div_ceil(BITS_PER_BYTE)];

    let mut byte_index = 0;
    let mut bit_index = 0;
    let mut current = 0u8;

    for &px in pixels {
        if px > 0 {
            current |= 1 << (7 - bit_index);
        }

        bit_index += 1;
        if bit_index == BITS_PER_BYTE {
            out[byte_index] = current;
            byte_index += 1;
            bit_index = 0;
            current = 0;
        }
    }

    if bit_index > 0 {
        out[byte_index] = current;
    }

    out
}

/// Splits 16-bit words into big-endian byte pairs: `0xAABB` becomes
/// `0xAA, 0xBB`.
pub fn words_to_bytes_be(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

/// Reverses the bit order of every word before splitting it big-endian.
/// Some legacy font assets store their rows mirrored this way.
pub fn reverse_bits16_be(words: &[u16]) -> Vec<u8> {
    words
        .iter()
        .flat_map(|w| w.reverse_bits().to_be_bytes())
        .collect()
}
