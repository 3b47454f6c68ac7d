/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The in-process round-trip oracle.
//!
//! The external browser validator is out of scope, so this stands in for
//! it: pull the payload literal back out of the finished artifact, run
//! every inverse stage in Rust, and compare against what the decoder is
//! supposed to render. Case-folding modes that lose information compare
//! case-insensitively, the way the browser validator compares with
//! `compare_caps` off.

use log::error;
use ztml_core::bits::BitVec;
use ztml_core::options::{Bin2Txt, EncodeOptions};
use ztml_core::vars::JsVars;

use crate::synth::TextStages;
use crate::ZtmlErrors;

/// The payload literal `P=\`…\`` inside the artifact, still escaped.
pub fn extract_payload<'a>(artifact: &'a [u8], payload_var: &str) -> Option<&'a [u8]> {
    let needle = format!("{payload_var}=`").into_bytes();
    let start = artifact
        .windows(needle.len())
        .position(|window| window == needle)?
        + needle.len();

    let mut at = start;
    while at < artifact.len() {
        match artifact[at] {
            b'\\' => at += 2,
            b'`' => return Some(&artifact[start..at]),
            _ => at += 1
        }
    }
    None
}

/// Decode the artifact's payload back to the PNG (or raw image) bytes.
pub fn decode_payload(
    artifact: &[u8], bin2txt: Bin2Txt, offset: u8, vars: &JsVars
) -> Result<Vec<u8>, ZtmlErrors> {
    let payload = extract_payload(artifact, &vars.payload)
        .ok_or("artifact is missing its payload literal")?;
    match bin2txt {
        Bin2Txt::Base64 => {
            let text = std::str::from_utf8(payload)
                .map_err(|_| "base64 payload is not ASCII")?;
            ztml_bin2txt::base64::decode(text)
                .map_err(|err| ZtmlErrors::GenericString(format!("bad base64 payload: {err:?}")))
        }
        Bin2Txt::Base125 => Ok(ztml_bin2txt::base125::decode(payload, offset)),
        Bin2Txt::CrEnc => Ok(ztml_bin2txt::crenc::decode(payload, offset))
    }
}

/// Run the full inverse text chain from the artifact bytes.
pub(crate) fn decode_text_artifact(
    artifact: &[u8], stages: &TextStages, bit_count: usize, options: &EncodeOptions,
    vars: &JsVars
) -> Result<String, ZtmlErrors> {
    let png = decode_payload(artifact, options.bin2txt(), stages.offset, vars)?;
    let bits = ztml_png::png_to_bits(&png, bit_count)?;

    let bit_symbols: Vec<u32> = bits.iter().map(u32::from).collect();
    let huffman_bits: BitVec = ztml_bwt::decode(&bit_symbols, stages.bits_index, None)
        .into_iter()
        .map(|bit| bit as u8)
        .collect();

    let symbols = ztml_huffman::decode(&huffman_bits, &stages.huffman.charset, &stages.huffman.table);
    let mut points = ztml_bwt::decode(&symbols, stages.sym_index, stages.mtf);
    if !stages.vowel_js.is_empty() {
        ztml_bwt::vowels::translate(&mut points);
    }

    let condensed: String = points
        .iter()
        .map(|&point| {
            char::from_u32(point).ok_or_else(|| {
                ZtmlErrors::GenericString(format!("decoded symbol {point:#x} is not a scalar"))
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(ztml_text::decode(&condensed, &stages.plan))
}

/// Compare a decoded render to the expected text, logging a first
/// difference report to standard error on mismatch.
pub fn compare_render(render: &str, expected: &str, compare_caps: bool) -> bool {
    let (render_cmp, expected_cmp) = if compare_caps {
        (render.to_string(), expected.to_string())
    } else {
        (render.to_lowercase(), expected.to_lowercase())
    };
    if render_cmp == expected_cmp {
        return true;
    }
    first_diff(&render_cmp, &expected_cmp);
    false
}

/// Dump the position and context of the first difference to stderr.
pub fn first_diff(render: &str, text: &str) -> usize {
    let render_chars: Vec<char> = render.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();
    let at = render_chars
        .iter()
        .zip(text_chars.iter())
        .position(|(a, b)| a != b)
        .unwrap_or_else(|| render_chars.len().min(text_chars.len()));

    let context = |chars: &[char]| -> (String, String) {
        let before: String = chars[at.saturating_sub(30)..at.min(chars.len())].iter().collect();
        let after: String = chars[at.min(chars.len())..(at + 50).min(chars.len())]
            .iter()
            .collect();
        (before, after)
    };
    let (orig_before, orig_after) = context(&text_chars);
    let (render_before, render_after) = context(&render_chars);

    error!("first difference found at {at} / {}", render_chars.len());
    eprintln!("First difference found at {at} / {}", render_chars.len());
    eprintln!("Original: {orig_before:?} -> {orig_after:?}");
    eprintln!("Rendered: {render_before:?} -> {render_after:?}");
    at
}
