/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! crEnc, in the spirit of yEnc: why encode?
//!
//! Under a cp1252 document every byte value can sit inside the template
//! literal except CR (hence the name) and the JS metacharacters, all of
//! which are backslash escaped. JS undoes the escapes for free, so the
//! decoder only reverses the HTML charref overrides for bytes 0x80-0x9F
//! and the global modular offset. Overhead ~ 4/256 ~ 1.6%.

use ztml_core::vars::JsVars;
use ztml_web::escape::cp1252_char;
use ztml_web::escape_bytes;

/// What a cp1252 browser hands `indexOf` for bytes 0x81..=0x9F, with
/// placeholder spaces at the five byte values HTML leaves undefined.
/// 0x80 (`€`) is resolved by `indexOf` returning -1: 129 + (-1) = 128.
const TRANSLATION: [u8; 31] = [
    0x20, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8A, 0x8B, 0x8C, 0x20, 0x8E, 0x20,
    0x20, 0x91, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9A, 0x9B, 0x9C, 0x20, 0x9E,
    0x9F
];

/// Offset every byte, then escape for the template literal.
pub fn encode(data: &[u8], offset: u8) -> Vec<u8> {
    if offset == 0 {
        return escape_bytes(data);
    }
    let shifted: Vec<u8> = data.iter().map(|&byte| byte.wrapping_add(offset)).collect();
    escape_bytes(&shifted)
}

/// Invert [`encode`], walking the same path the browser does: unescape,
/// decode cp1252 with the HTML overrides, translate back, subtract.
pub fn decode(data: &[u8], offset: u8) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut at = 0;

    while at < data.len() {
        let byte = match data[at] {
            b'\\' => {
                at += 1;
                match data.get(at) {
                    Some(b'r') => b'\r',
                    Some(b'\\') => b'\\',
                    Some(b'`') => b'`',
                    Some(b'$') => b'$',
                    _ => continue
                }
            }
            byte => byte
        };
        at += 1;
        out.push(recover_byte(byte).wrapping_sub(offset));
    }
    out
}

/// The decoder expression: what `charCodeAt` shows for this byte, mapped
/// back through the translation string when the charref override moved it
/// above 0xFF.
fn recover_byte(byte: u8) -> u8 {
    if u32::from(cp1252_char(byte)) > 255 {
        match TRANSLATION.iter().position(|&t| t == byte) {
            Some(at) => 129 + at as u8,
            None => 128
        }
    } else {
        byte
    }
}

/// Sweep all 256 offsets and keep the shortest encoding (smallest offset
/// wins ties). Returns `(encoded, offset, bytes_saved_vs_offset_0)`.
pub fn optimize_encode(data: &[u8]) -> (Vec<u8>, u8, usize) {
    crate::sweep(data, encode)
}

/// The decoder fragment, payload literal included. The returned bytes are
/// cp1252 document bytes, not UTF-8.
pub fn js_decoder(encoded: &[u8], offset: u8, vars: &JsVars) -> Vec<u8> {
    let payload = &vars.payload;
    let bytes = &vars.bytes;

    let mut expression =
        String::from("(i=c.charCodeAt()%65533)>>8?129+'\u{1}'.indexOf(c):i");
    if offset != 0 {
        expression = format!("({expression})-{offset}");
    }

    let mut out = format!("{payload}=`").into_bytes();
    out.extend_from_slice(encoded);
    out.extend_from_slice(format!("`\n{bytes}=Uint8Array.from({payload},c=>").as_bytes());
    // splice the raw translation bytes where the placeholder sits, since
    // they are not valid UTF-8 and cannot ride inside a Rust string
    let expression = expression.into_bytes();
    let marker = expression.iter().position(|&b| b == 1).unwrap();
    out.extend_from_slice(&expression[..marker]);
    out.extend_from_slice(&TRANSLATION);
    out.extend_from_slice(&expression[marker + 1..]);
    out.extend_from_slice(b")\n");
    out
}
