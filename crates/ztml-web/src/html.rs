/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The HTML frame around the synthesized script.
//!
//! The artifact is byte-counted, so the frame is the shortest conforming
//! HTML5 prefix: doctype, `lang`, charset, the optional viewport/title, an
//! optional render target, then one `<script>` that is never closed by a
//! matching `</html>` (the parser does not need it and the bytes do).

use ztml_core::options::Charset;

#[derive(Debug, Clone, Default)]
pub struct HtmlOptions {
    pub lang:    String,
    pub charset: Charset,
    pub mobile:  bool,
    pub title:   String,
    /// Pre-rendered target element (`<pre id=…></pre>` or `<img id=…>`)
    /// injected right after `<body>`.
    pub target:  String
}

/// Wrap the script bytes into the final HTML artifact.
pub fn html_wrap(script: &[u8], options: &HtmlOptions) -> Vec<u8> {
    let mut out = Vec::with_capacity(script.len() + 128);

    out.extend_from_slice(b"<!DOCTYPE html><html lang=");
    out.extend_from_slice(&text_encode(&options.lang, options.charset));
    out.extend_from_slice(b"><meta charset=");
    out.extend_from_slice(options.charset.label().as_bytes());
    out.push(b'>');
    if options.mobile {
        out.extend_from_slice(
            b"<meta name=viewport content=\"width=device-width,initial-scale=1\">"
        );
    }
    if !options.title.is_empty() {
        out.extend_from_slice(b"<title>");
        out.extend_from_slice(&text_encode(&options.title, options.charset));
        out.extend_from_slice(b"</title>");
    }
    out.extend_from_slice(b"<body>");
    out.extend_from_slice(options.target.as_bytes());
    out.extend_from_slice(b"<script>");

    let body_start = script
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(script.len());
    let body_end = script.len()
        - script
            .iter()
            .rev()
            .position(|byte| !byte.is_ascii_whitespace())
            .unwrap_or(script.len());
    out.push(b'\n');
    if body_start < body_end {
        out.extend_from_slice(&script[body_start..body_end]);
    }
    out.extend_from_slice(b"\n</script>");
    out
}

/// Serialize HTML text content, using character references where the
/// document charset cannot express a code point (JS style `\u{…}` escapes
/// mean nothing to the markup parser).
fn text_encode(text: &str, charset: Charset) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.extend_from_slice(b"&lt;"),
            '&' => out.extend_from_slice(b"&amp;"),
            _ => match charset {
                Charset::Utf8 => {
                    let mut buffer = [0u8; 4];
                    out.extend_from_slice(ch.encode_utf8(&mut buffer).as_bytes());
                }
                Charset::Cp1252 => match crate::escape::cp1252_byte(ch) {
                    Some(byte) => out.push(byte),
                    None => out.extend_from_slice(format!("&#x{:X};", u32::from(ch)).as_bytes())
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_shape() {
        let options = HtmlOptions {
            lang: String::from("en"),
            charset: Charset::Cp1252,
            ..HtmlOptions::default()
        };
        let out = html_wrap(b"P=`x`\n", &options);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<!DOCTYPE html><html lang=en><meta charset=cp1252><body><script>"));
        assert!(text.ends_with("P=`x`\n</script>"));
    }

    #[test]
    fn viewport_title_and_target() {
        let options = HtmlOptions {
            lang:    String::from("en"),
            charset: Charset::Utf8,
            mobile:  true,
            title:   String::from("a < b"),
            target:  String::from("<pre id=out></pre>")
        };
        let text = String::from_utf8(html_wrap(b"1", &options)).unwrap();
        assert!(text.contains("<meta name=viewport"));
        assert!(text.contains("<title>a &lt; b</title>"));
        assert!(text.contains("<body><pre id=out></pre><script>"));
    }

    #[test]
    fn cp1252_title_uses_character_references() {
        let options = HtmlOptions {
            lang: String::from("en"),
            charset: Charset::Cp1252,
            title: String::from("бук€"),
            ..HtmlOptions::default()
        };
        let out = html_wrap(b"1", &options);
        let as_text: Vec<u8> = out;
        assert!(contains(&as_text, b"&#x431;"));
        assert!(contains(&as_text, &[0x80]));
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle)
    }
}
