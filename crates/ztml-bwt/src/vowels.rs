/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Vowel reordering.
//!
//! Swapping the vowels with `VWXYZ` moves them next to each other in code
//! point order, which clusters the sorted rotations and helps the entropy
//! coder downstream. The permutation is an involution, so the same table
//! translates both ways.

use ztml_core::vars::JsVars;

const FROM: &[u8; 20] = b"AOUIEVWXYZaouievwxyz";
const TO: &[u8; 20] = b"VWXYZAOUIEvwxyzaouie";

/// Translate one code point through the permutation.
pub fn translate_symbol(symbol: u32) -> u32 {
    match FROM.iter().position(|&c| u32::from(c) == symbol) {
        Some(at) => u32::from(TO[at]),
        None => symbol
    }
}

/// Translate a whole sequence in place.
pub fn translate(data: &mut [u32]) {
    for symbol in data.iter_mut() {
        *symbol = translate_symbol(*symbol);
    }
}

/// The JS fragment mapping the transformed text back, restricted to the
/// permutation pairs whose translated side actually occurs in `translated`.
///
/// Returns an empty string when the permutation did not touch the text.
pub fn js_decoder(translated: &[u32], vars: &JsVars) -> String {
    let mut from = String::new();
    let mut to = String::new();

    for (&f, &t) in FROM.iter().zip(TO.iter()) {
        // decode maps the translated side back, so the class is built from
        // TO and the lookup table from FROM
        if translated.contains(&u32::from(t)) {
            from.push(char::from(t));
            to.push(char::from(f));
        }
    }
    if from.is_empty() {
        return String::new();
    }

    let text = &vars.text;
    format!("{text}={text}.replace(/[{from}]/g,c=>'{to}'['{from}'.indexOf(c)])\n")
}
