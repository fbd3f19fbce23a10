//! Single-byte code pages for feeding Unicode text to binary fonts.

/// Byte used for characters the code page cannot represent.
pub const UNKNOWN: u8 = b'?';

/// Maps Unicode to one byte per character. ASCII passes through; the
/// table lists the characters for 0x80..=0xFF in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charset {
    name: &'static str,
    upper: &'static str,
}

/// DOS Cyrillic, the code page of the KeyRus fonts.
pub const CP866: Charset = Charset {
    name: "866",
    upper: concat!(
        "АБВГДЕЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯ",
        "абвгдежзийклмноп",
        "░▒▓│┤╡╢╖╕╣║╗╝╜╛┐",
        "└┴┬├─┼╞╟╚╔╩╦╠═╬╧",
        "╨╤╥╙╘╒╓╫╪┘┌█▄▌▐▀",
        "рстуфхцчшщъыьэюя",
        "ЁёЄєЇїЎў°∙·√№¤■\u{a0}",
    ),
};

impl Charset {
    /// Looks a code page up by the label fonts carry, e.g. `"866"`.
    pub fn by_name(name: &str) -> Option<Charset> {
        match name.to_ascii_lowercase().as_str() {
            "866" | "cp866" | "ibm866" => Some(CP866),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn translate_char(&self, c: char) -> u8 {
        if c.is_ascii() {
            return c as u8;
        }
        self.upper
            .chars()
            .position(|u| u == c)
            .map_or(UNKNOWN, |i| 0x80 + i as u8)
    }

    pub fn translate(&self, s: &str) -> Vec<u8> {
        s.chars().map(|c| self.translate_char(c)).collect()
    }
}
