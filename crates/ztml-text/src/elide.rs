/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The two word-level elisions: `the ` to a double space, and the `u`
//! every English `q` drags along.
//!
//! Both are exact inverses by regex, so each has a skip rule guarding the
//! cases where inversion would be ambiguous (a pre-existing double space) or
//! simply not worth the decoder bytes.

use std::sync::OnceLock;

use fancy_regex::Regex as FancyRegex;
use regex::Regex;
use ztml_core::options::CapsMode;

fn the_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("(?m)(^| )the ").unwrap())
}

fn the_inverse_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("(?m)(^| ) ").unwrap())
}

/// `(^| )the ` -> `$1 `, per line.
pub fn remove_the(text: &str) -> String {
    the_pattern().replace_all(text, "$1 ").into_owned()
}

/// Invert [`remove_the`].
pub fn restore_the(text: &str) -> String {
    the_inverse_pattern().replace_all(text, "${1}the ").into_owned()
}

/// True when `text` already contains a match of the inverse pattern, which
/// would make the elision ambiguous to undo.
pub fn the_is_ambiguous(text: &str) -> bool {
    the_inverse_pattern().is_match(text)
}

pub const THE_JS_DECODER: &str = ".replace(/(^| ) /gm,'$1the ')";

// The qu lookaheads: an optional apostrophe, then a letter of the given
// case that is not `u`. Spelled with `\P` so the emitted form needs no
// lookbehind.
const QU_LOWER: &str = "['’]?[^u\\P{Ll}]";
const QU_UPPER: &str = "['’]?[^U\\P{Lu}]";
const QU_ANY: &str = "['’]?[^u\\P{L}]";

fn quq_encode_lower() -> &'static FancyRegex {
    static PATTERN: OnceLock<FancyRegex> = OnceLock::new();
    PATTERN.get_or_init(|| FancyRegex::new(&format!("([Qq])u(?={QU_LOWER})")).unwrap())
}

fn quq_encode_upper() -> &'static FancyRegex {
    static PATTERN: OnceLock<FancyRegex> = OnceLock::new();
    PATTERN.get_or_init(|| FancyRegex::new(&format!("QU(?={QU_UPPER})")).unwrap())
}

fn quq_decode_lower() -> &'static FancyRegex {
    static PATTERN: OnceLock<FancyRegex> = OnceLock::new();
    PATTERN.get_or_init(|| FancyRegex::new(&format!("[Qq](?={QU_LOWER})")).unwrap())
}

fn quq_decode_upper() -> &'static FancyRegex {
    static PATTERN: OnceLock<FancyRegex> = OnceLock::new();
    PATTERN.get_or_init(|| FancyRegex::new(&format!("Q(?={QU_UPPER})")).unwrap())
}

fn quq_decode_any() -> &'static FancyRegex {
    static PATTERN: OnceLock<FancyRegex> = OnceLock::new();
    PATTERN.get_or_init(|| FancyRegex::new(&format!("q(?={QU_ANY})")).unwrap())
}

/// Drop the `u` after `q`/`Q` wherever the inverse regex can put it back.
pub fn encode_quq(text: &str) -> String {
    let lowered = quq_encode_lower().replace_all(text, "$1");
    quq_encode_upper().replace_all(&lowered, "Q").into_owned()
}

/// Invert [`encode_quq`] for text folded per `caps`.
pub fn decode_quq(text: &str, caps: CapsMode) -> String {
    if caps == CapsMode::Raw {
        let lowered = quq_decode_lower().replace_all(text, "${0}u");
        quq_decode_upper().replace_all(&lowered, "QU").into_owned()
    } else {
        quq_decode_any().replace_all(text, "qu").into_owned()
    }
}

/// The replace chain the decoder runs, matching [`decode_quq`].
pub fn quq_js_decoder(caps: CapsMode) -> String {
    if caps == CapsMode::Raw {
        format!(".replace(/[Qq](?={QU_LOWER})/gu,'$&u').replace(/Q(?={QU_UPPER})/gu,'QU')")
    } else {
        format!(".replace(/q(?={QU_ANY})/gu,'qu')")
    }
}

/// True when dropping and restoring the `u`s does not reproduce `text`
/// (which is already folded per `caps`).
pub fn quq_is_lossy(text: &str, caps: CapsMode) -> bool {
    decode_quq(&encode_quq(text), caps) != text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_roundtrip() {
        let text = "the cat saw the dog\nthe end";
        let encoded = remove_the(text);
        assert_eq!(encoded, " cat saw  dog\n end");
        assert_eq!(restore_the(&encoded), text);
    }

    #[test]
    fn pre_existing_double_space_is_ambiguous() {
        assert!(the_is_ambiguous("a  b"));
        assert!(the_is_ambiguous("a\n b"));
        assert!(!the_is_ambiguous("a b\nc"));
    }

    #[test]
    fn quq_roundtrip_lower() {
        let text = "a queen quietly quit, aquaق";
        let encoded = encode_quq(text);
        assert_eq!(encoded, "a qeen qietly qit, aqa\u{642}");
        assert!(!quq_is_lossy(text, CapsMode::Simple));
    }

    #[test]
    fn quq_raw_keeps_cases_apart() {
        let text = "Quick QUIET quarrel";
        let encoded = encode_quq(text);
        assert_eq!(encoded, "Qick QIET qarrel");
        assert_eq!(decode_quq(&encoded, CapsMode::Raw), text);
    }

    #[test]
    fn quq_apostrophe_context() {
        let encoded = encode_quq("qu’est-ce");
        assert_eq!(encoded, "q’est-ce");
        assert_eq!(decode_quq(&encoded, CapsMode::Simple), "qu’est-ce");
    }

    #[test]
    fn q_without_u_is_lossy() {
        // the inverse regex would invent a u after these
        assert!(quq_is_lossy("ql", CapsMode::Simple));
        assert!(quq_is_lossy("qatar is", CapsMode::Simple));
        assert!(!quq_is_lossy("quiet", CapsMode::Simple));
        // a terminal qu is never elided, so it survives untouched
        assert!(!quq_is_lossy("qu", CapsMode::Simple));
    }
}
