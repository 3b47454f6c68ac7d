/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Escaping for content embedded in the synthesized script.
//!
//! Two escaping domains exist: payload bytes dropped verbatim into the
//! `P=\`…\`` template literal, and decoder-table strings (Huffman charset
//! and canonical table) whose symbols are arbitrary `u32` code points,
//! including values Rust's `char` refuses (the surrogate gap). The latter
//! are therefore emitted straight from `u32`, with `\u{…}` escapes where a
//! scalar value does not exist.

use ztml_core::options::Charset;

/// Escape raw bytes for embedding inside a template literal.
///
/// Backslash, backtick and `${` are JS syntax; CR cannot survive an HTML
/// document (the parser folds it into LF). NUL stays raw: the decoders
/// normalize the parser's U+FFFD replacement with `%65533`.
pub fn escape_bytes(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 64);
    let mut at = 0;

    while at < data.len() {
        match data[at] {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'`' => out.extend_from_slice(b"\\`"),
            b'$' if data.get(at + 1) == Some(&b'{') => out.extend_from_slice(b"\\$"),
            byte => out.push(byte)
        }
        at += 1;
    }
    out
}

/// Render a code point sequence as the body of a JS template literal.
///
/// NUL becomes `\0` (or `\x00` when a digit follows, which would otherwise
/// read as a legacy octal escape), the template-literal metacharacters are
/// backslash escaped, and surrogate-gap values are spelled `\u{…}` since no
/// Rust `char` exists for them. Everything else is passed through as the
/// real character; charset narrowing happens later in [`safe_encode`].
pub fn escape_code_points(points: &[u32]) -> String {
    let mut out = String::with_capacity(points.len());

    for (at, &point) in points.iter().enumerate() {
        match point {
            0 => {
                let digit_next = points
                    .get(at + 1)
                    .is_some_and(|&next| (0x30..=0x39).contains(&next));
                out.push_str(if digit_next { "\\x00" } else { "\\0" });
            }
            0x0D => out.push_str("\\r"),
            0x5C => out.push_str("\\\\"),
            0x60 => out.push_str("\\`"),
            0x24 if points.get(at + 1) == Some(&0x7B) => out.push_str("\\$"),
            _ => match char::from_u32(point) {
                Some(ch) => out.push(ch),
                None => {
                    // surrogate-gap table value; JS strings hold these fine
                    out.push_str(&format!("\\u{{{point:x}}}"));
                }
            }
        }
    }
    out
}

/// Serialize script text into document bytes for the given charset.
///
/// Under cp1252 every unencodable code point becomes a `\u{…}` escape, which
/// is why this must only ever see JS (the HTML wrapper uses character
/// references instead). The five byte values HTML5 leaves undefined in
/// windows-1252 (0x81, 0x8D, 0x8F, 0x90, 0x9D) decode to themselves, so the
/// matching C1 controls pass through raw.
pub fn safe_encode(script: &str, charset: Charset) -> Vec<u8> {
    match charset {
        Charset::Utf8 => script.as_bytes().to_vec(),
        Charset::Cp1252 => {
            let mut out = Vec::with_capacity(script.len());
            for ch in script.chars() {
                match cp1252_byte(ch) {
                    Some(byte) => out.push(byte),
                    None => out.extend_from_slice(format!("\\u{{{:x}}}", u32::from(ch)).as_bytes())
                }
            }
            out
        }
    }
}

/// The byte serializing `ch` in a cp1252 document, if one exists.
pub fn cp1252_byte(ch: char) -> Option<u8> {
    let point = u32::from(ch);
    match point {
        0..=0x7F | 0xA0..=0xFF => Some(point as u8),
        // HTML leaves these five undefined, so the bytes decode unchanged
        0x81 | 0x8D | 0x8F | 0x90 | 0x9D => Some(point as u8),
        _ => CP1252_HIGH
            .iter()
            .position(|&mapped| u32::from(mapped) == point)
            .map(|index| 0x80 + index as u8)
    }
}

/// What a cp1252 decoder produces for bytes 0x80..=0x9F.
///
/// The undefined slots hold the C1 controls HTML5 maps them to.
pub const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}'
];

/// Decode one cp1252 byte to the code point HTML5 assigns it.
pub fn cp1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9F => CP1252_HIGH[byte as usize - 0x80],
        _ => char::from(byte)
    }
}
