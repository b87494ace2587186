//! WinAnsiEncoding (cp1252), the single-byte encoding every font resource
//! is written with. Measurement and drawing both go through these tables so
//! the width a run is fitted at is the width a viewer lays it out at.

/// First and last code a font resource describes in `/Widths`.
pub(crate) const FIRST_CODE: u8 = 0x20;
pub(crate) const LAST_CODE: u8 = 0xFF;

/// Code drawn for characters the encoding cannot represent.
pub(crate) const REPLACEMENT: u8 = b'?';

// Unicode for 0x80..=0x9F; `None` marks codes cp1252 leaves undefined.
const HIGH_CONTROL_RANGE: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Code for `ch`, if the encoding has one. Control characters have none.
pub(crate) fn encode(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    HIGH_CONTROL_RANGE
        .iter()
        .position(|mapped| *mapped == Some(ch))
        .map(|idx| 0x80 + idx as u8)
}

/// The code a viewer is handed for `ch`: its own code or the replacement.
pub(crate) fn drawn_code(ch: char) -> u8 {
    encode(ch).unwrap_or(REPLACEMENT)
}

/// Character a code stands for; `None` for controls and undefined codes.
pub(crate) fn decode(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as char),
        0x80..=0x9F => HIGH_CONTROL_RANGE[(code - 0x80) as usize],
        _ => None,
    }
}
