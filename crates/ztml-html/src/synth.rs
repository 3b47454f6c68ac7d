/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoder synthesis: the stage plan and its one-shot rendering.
//!
//! Every fragment is a top-level statement sequence over the shared
//! single-letter globals; the only closure is the image `decode().then`
//! continuation and the tiny arrows inside fragments, none of which shadow
//! the payload variable. Stage order is fixed: bit-stream BWT, Huffman,
//! symbol BWT+MTF, vowels, text recovery, renderer.

use ztml_core::options::{EncodeOptions, MtfPolicy};
use ztml_core::vars::JsVars;
use ztml_text::TextPlan;

/// Everything the text pipeline produced that the decoder must undo.
pub(crate) struct TextStages {
    pub bits_index: usize,
    pub huffman:    ztml_huffman::Encoded,
    pub sym_index:  usize,
    pub mtf:        Option<MtfPolicy>,
    pub max_rank:   u32,
    pub vowel_js:   String,
    pub plan:       TextPlan,
    /// The codec's global byte offset, for the oracle.
    pub offset:     u8
}

/// The statement sequence that runs once the bit array exists.
pub(crate) fn render_script(stages: &TextStages, options: &EncodeOptions, vars: &JsVars) -> String {
    let mut out = String::new();
    out.push_str(&ztml_bwt::js_bits_decoder(stages.bits_index, vars));
    out.push_str(&ztml_huffman::js_decoder(&stages.huffman, vars));
    out.push_str(&ztml_bwt::js_text_decoder(
        stages.sym_index,
        stages.mtf,
        stages.max_rank,
        vars
    ));
    out.push_str(&stages.vowel_js);
    out.push_str(&ztml_text::js_decoder(&stages.plan, vars));
    out.push_str(&text_renderer(options, vars));
    out
}

/// Where the reconstructed text goes.
pub(crate) fn text_renderer(options: &EncodeOptions, vars: &JsVars) -> String {
    let text = &vars.text;
    if options.raw() {
        return format!("document.write({text})");
    }
    let id = options.element_id();
    if !id.is_empty() {
        return format!("document.getElementById('{id}').textContent={text}");
    }
    format!("document.body.style.whiteSpace='pre';document.body.textContent={text}")
}

/// Where the decoded image goes; `url` is the expression producing its
/// source.
pub(crate) fn image_renderer(options: &EncodeOptions, url: &str) -> String {
    let id = options.element_id();
    if !id.is_empty() {
        return format!("document.getElementById('{id}').src={url}");
    }
    format!("document.body.style.background='url('+{url}+')'")
}

/// The target element injected into the HTML frame, when one is named.
pub(crate) fn target_element(options: &EncodeOptions) -> String {
    let id = options.element_id();
    if id.is_empty() {
        return String::new();
    }
    if options.image() {
        format!("<img id={id}>")
    } else {
        format!("<pre id={id}></pre>")
    }
}

#[cfg(test)]
mod tests {
    use ztml_core::options::CapsMode;

    use super::*;

    #[test]
    fn stage_order_is_fixed() {
        let stages = TextStages {
            bits_index: 3,
            huffman:    ztml_huffman::encode(&[65, 65, 66]),
            sym_index:  1,
            mtf:        Some(MtfPolicy::MoveToFront),
            max_rank:   2,
            vowel_js:   String::new(),
            plan:       TextPlan {
                caps: CapsMode::Raw,
                the:  false,
                quq:  false
            },
            offset:     0
        };
        let options = EncodeOptions::default();
        let vars = JsVars::default();
        let script = render_script(&stages, &options, &vars);

        let bwt_at = script.find("B=(d,k)=>").unwrap();
        let huffman_at = script.find("'0b0'").unwrap();
        let mtf_at = script.find("d.unshift").unwrap();
        let render_at = script.find("textContent").unwrap();
        assert!(bwt_at < huffman_at && huffman_at < mtf_at && mtf_at < render_at);
    }

    #[test]
    fn renderers_respect_mode() {
        let vars = JsVars::default();
        let raw = EncodeOptions::default().set_raw(true);
        assert_eq!(text_renderer(&raw, &vars), "document.write(t)");

        let target = EncodeOptions::default().set_element_id("out");
        assert!(text_renderer(&target, &vars).contains("getElementById('out')"));
        assert_eq!(target_element(&target), "<pre id=out></pre>");

        let image = EncodeOptions::default().set_element_id("im").set_image(true);
        assert_eq!(target_element(&image), "<img id=im>");
        assert!(image_renderer(&image, "U").contains(".src=U"));

        let body = EncodeOptions::default().set_image(true);
        assert_eq!(
            image_renderer(&body, "U"),
            "document.body.style.background='url('+U+')'"
        );
    }
}
