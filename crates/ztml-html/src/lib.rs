/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! ZTML - extreme inline text compression for HTML / JS
//!
//! The pipeline crate: wires text preprocessing, the symbol BWT+MTF,
//! canonical Huffman, the bit-stream BWT, PNG/Zopfli and a binary-to-text
//! codec into one encode, synthesizes the matching JavaScript decoder, and
//! wraps everything into a self-extracting artifact.
//!
//! Text mode data flow:
//!
//! ```text
//! input -> text-prep -> bwt+mtf(symbols) -> huffman -> bwt(bits)
//!       -> png/zopfli -> bin2txt -> uglify -> html
//! ```
//!
//! Image mode feeds the payload bytes straight to the codec; raw mode runs
//! the text pipeline but renders with `document.write`.

use std::fmt::{Debug, Formatter};

use log::{info, warn};
use ztml_core::bits::BitVec;
use ztml_core::options::{Bin2Txt, CapsMode, EncodeOptions};
use ztml_core::vars::JsVars;
use ztml_png::PngErrors;
use ztml_web::{HtmlOptions, UglifyOptions};

mod synth;
pub mod validate;

use synth::TextStages;

/// The public boundary is a tagged payload: text goes through the full
/// transform chain, bytes are embedded as an opaque image.
pub enum Payload<'a> {
    Text(&'a str),
    Bytes(&'a [u8])
}

/// The finished artifact and what it took to get there.
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub stats: EncodeStats
}

#[derive(Debug, Clone, Default)]
pub struct EncodeStats {
    pub input_len:      usize,
    pub condensed_len:  usize,
    pub bit_count:      usize,
    pub png_len:        usize,
    pub payload_len:    usize,
    pub artifact_len:   usize,
    pub offset:         u8,
    /// `None` when `validate` was off, otherwise the oracle's verdict.
    pub validated:      Option<bool>
}

pub enum ZtmlErrors {
    Png(PngErrors),
    GenericStatic(&'static str),
    GenericString(String)
}

impl Debug for ZtmlErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png(err) => writeln!(f, "png stage: {err:?}"),
            Self::GenericStatic(err) => writeln!(f, "{err}"),
            Self::GenericString(err) => writeln!(f, "{err}")
        }
    }
}

impl From<PngErrors> for ZtmlErrors {
    fn from(err: PngErrors) -> Self {
        Self::Png(err)
    }
}

impl From<&'static str> for ZtmlErrors {
    fn from(err: &'static str) -> Self {
        Self::GenericStatic(err)
    }
}

impl From<String> for ZtmlErrors {
    fn from(err: String) -> Self {
        Self::GenericString(err)
    }
}

/// Encode `payload` into a self-extracting artifact.
pub fn encode(payload: Payload, options: &EncodeOptions) -> Result<Artifact, ZtmlErrors> {
    let vars = JsVars::default();
    match payload {
        Payload::Bytes(data) if options.image() => encode_image(data, options, &vars),
        Payload::Bytes(_) => Err("byte payloads require image mode".into()),
        Payload::Text(_) if options.image() => Err("image mode requires a byte payload".into()),
        Payload::Text(text) => encode_text(text, options, &vars)
    }
}

fn encode_text(text: &str, options: &EncodeOptions, vars: &JsVars) -> Result<Artifact, ZtmlErrors> {
    let normalized = ztml_text::normalize(
        text,
        options.reduce_whitespace(),
        options.unix_newline(),
        options.fix_punct()
    );
    let (condensed, plan) = ztml_text::encode_and_plan(&normalized, options.caps());

    let mut points: Vec<u32> = condensed.chars().map(u32::from).collect();
    let vowel_js = if options.vowel_reorder() {
        ztml_bwt::vowels::translate(&mut points);
        ztml_bwt::vowels::js_decoder(&points, vars)
    } else {
        String::new()
    };

    let (symbols, sym_index) = ztml_bwt::encode(&points, options.mtf());
    let max_rank = symbols.iter().copied().max().unwrap_or(0);
    let huffman = ztml_huffman::encode(&symbols);

    let bit_symbols: Vec<u32> = huffman.bits.iter().map(u32::from).collect();
    let (bits_trans, bits_index) = ztml_bwt::encode(&bit_symbols, None);
    let bit_count = bits_trans.len();

    let mut png_bits: BitVec = bits_trans.iter().map(|&bit| bit as u8).collect();
    if png_bits.is_empty() {
        // the PNG stage refuses empty input; one zero bit never reaches the
        // decoder because the recorded bit count stays zero
        png_bits.push(0);
    }
    let png = ztml_png::to_png(&png_bits, &png_options(options))?;

    let mut stages = TextStages {
        bits_index,
        huffman,
        sym_index,
        mtf: options.mtf(),
        max_rank,
        vowel_js,
        plan,
        offset: 0
    };
    let render = synth::render_script(&stages, options, vars);
    let charset = options.charset();

    let image_js =
        ztml_png::js::image_from_bytes(vars) + &ztml_png::js::image_data(bit_count, &render, vars);
    let (script, offset, payload_len) = match options.bin2txt() {
        Bin2Txt::Base64 => {
            let encoded = ztml_bin2txt::base64::encode(&png.data);
            let mut script = format!("{}=`{encoded}`\n", vars.payload).into_bytes();
            let tail = ztml_png::js::image_from_base64(vars)
                + &ztml_png::js::image_data(bit_count, &render, vars);
            script.extend_from_slice(&ztml_web::safe_encode(&tail, charset));
            (script, 0, encoded.len())
        }
        Bin2Txt::Base125 => {
            let (encoded, offset) = ztml_bin2txt::resolve_offset(
                &png.data,
                options.offset(),
                ztml_bin2txt::base125::encode,
                ztml_bin2txt::base125::optimize_encode
            );
            let payload_len = encoded.len();
            let mut script = ztml_bin2txt::base125::js_decoder(&encoded, offset, vars);
            script.extend_from_slice(&ztml_web::safe_encode(&image_js, charset));
            (script, offset, payload_len)
        }
        Bin2Txt::CrEnc => {
            let (encoded, offset) = ztml_bin2txt::resolve_offset(
                &png.data,
                options.offset(),
                ztml_bin2txt::crenc::encode,
                ztml_bin2txt::crenc::optimize_encode
            );
            let payload_len = encoded.len();
            let mut script = ztml_bin2txt::crenc::js_decoder(&encoded, offset, vars);
            script.extend_from_slice(&ztml_web::safe_encode(&image_js, charset));
            (script, offset, payload_len)
        }
    };
    stages.offset = offset;

    let bytes = finish_script(script, options, vars);

    let mut stats = EncodeStats {
        input_len:     normalized.chars().count(),
        condensed_len: condensed.chars().count(),
        bit_count,
        png_len:       png.data.len(),
        payload_len,
        artifact_len:  bytes.len(),
        offset,
        validated:     None
    };
    info!(
        "encoded {} chars -> {} bits -> {} B png -> {} B artifact",
        stats.input_len, stats.bit_count, stats.png_len, stats.artifact_len
    );

    if options.validate() {
        let render = validate::decode_text_artifact(&bytes, &stages, bit_count, options, vars)?;
        // lossy folds compare caseless, like the browser oracle with
        // compare_caps off
        let compare_caps = matches!(options.caps(), CapsMode::Auto | CapsMode::Raw);
        let ok = validate::compare_render(&render, &normalized, compare_caps);
        if !ok {
            warn!("round-trip validation failed");
        }
        stats.validated = Some(ok);
    }

    Ok(Artifact {
        bytes,
        stats
    })
}

fn encode_image(data: &[u8], options: &EncodeOptions, vars: &JsVars) -> Result<Artifact, ZtmlErrors> {
    let charset = options.charset();
    let (script, offset, payload_len) = match options.bin2txt() {
        Bin2Txt::Base64 => {
            let encoded = ztml_bin2txt::base64::encode(data);
            let mut script = format!("{}=`{encoded}`\n", vars.payload).into_bytes();
            let url = format!("'data:;base64,'+{}", vars.payload);
            let renderer = synth::image_renderer(options, &url);
            script.extend_from_slice(&ztml_web::safe_encode(&renderer, charset));
            (script, 0, encoded.len())
        }
        Bin2Txt::Base125 => {
            let (encoded, offset) = ztml_bin2txt::resolve_offset(
                data,
                options.offset(),
                ztml_bin2txt::base125::encode,
                ztml_bin2txt::base125::optimize_encode
            );
            let payload_len = encoded.len();
            let mut script = ztml_bin2txt::base125::js_decoder(&encoded, offset, vars);
            let url = format!("URL.createObjectURL(new Blob([{}]))", vars.bytes);
            script.extend_from_slice(
                &ztml_web::safe_encode(&synth::image_renderer(options, &url), charset)
            );
            (script, offset, payload_len)
        }
        Bin2Txt::CrEnc => {
            let (encoded, offset) = ztml_bin2txt::resolve_offset(
                data,
                options.offset(),
                ztml_bin2txt::crenc::encode,
                ztml_bin2txt::crenc::optimize_encode
            );
            let payload_len = encoded.len();
            let mut script = ztml_bin2txt::crenc::js_decoder(&encoded, offset, vars);
            let url = format!("URL.createObjectURL(new Blob([{}]))", vars.bytes);
            script.extend_from_slice(
                &ztml_web::safe_encode(&synth::image_renderer(options, &url), charset)
            );
            (script, offset, payload_len)
        }
    };

    let bytes = finish_script(script, options, vars);
    let mut stats = EncodeStats {
        input_len:    data.len(),
        payload_len,
        artifact_len: bytes.len(),
        offset,
        ..EncodeStats::default()
    };

    if options.validate() {
        let decoded = validate::decode_payload(&bytes, options.bin2txt(), offset, vars)?;
        let ok = decoded == data;
        if !ok {
            warn!("image payload round-trip failed");
        }
        stats.validated = Some(ok);
    }

    Ok(Artifact {
        bytes,
        stats
    })
}

/// Uglify (unless disabled) and frame (unless a bare script was asked for).
fn finish_script(script: Vec<u8>, options: &EncodeOptions, vars: &JsVars) -> Vec<u8> {
    let script = if options.uglify() {
        let uglify_options = UglifyOptions {
            replace_quoted: options.replace_quoted(),
            prevent_grow: options.prevent_grow(),
            ..UglifyOptions::default()
        };
        ztml_web::uglify(script, ztml_web::DEFAULT_ALIASES, &vars.payload, &uglify_options)
    } else {
        script
    };
    if options.js() {
        return script;
    }
    ztml_web::html_wrap(
        &script,
        &HtmlOptions {
            lang:    options.lang().to_string(),
            charset: options.charset(),
            mobile:  options.mobile(),
            title:   options.title().to_string(),
            target:  synth::target_element(options)
        }
    )
}

fn png_options(options: &EncodeOptions) -> ztml_png::PngOptions {
    ztml_png::PngOptions::new()
        .set_iterations(options.iterations())
        .set_iterations_large(options.iterations_large())
        .set_strip_iend(options.strip_iend())
}
