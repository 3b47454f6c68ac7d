/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Case folding and its recovery regex.
//!
//! The decoder-side pattern is fixed: it re-uppercases the first letter
//! after a sentence end or a paragraph break, the start of text, and a
//! standalone `i`. It must stay lookbehind-free (Safari) — paragraph starts
//! are found with a lookahead-plus-backreference trick instead. The Rust
//! mirror exists so `auto` mode can verify the recovery before committing
//! to it.

use std::sync::OnceLock;

use fancy_regex::Regex;

/// The newline class as it is spelled inside the emitted JS regex.
pub const JS_NEWLINE_CLASS: &str = "\\n\\v\\f\\r\\x85\\u2028\\u2029";

/// The capitalization recovery pattern, exactly as emitted
/// (`.replace(/…/gu,s=>s.toUpperCase())`).
pub fn js_caps_regex() -> String {
    format!(
        "(((?=(\\r\\n|[{JS_NEWLINE_CLASS}]))\\3){{2,}}|^|[!.?])\\P{{L}}*.|(^|[^\\p{{L}}\\p{{M}}\\p{{N}}])i(?![\\p{{L}}\\p{{M}}\\p{{N}}])"
    )
}

/// The same pattern for the Rust engine. The lone difference is `.`:
/// a JS `.` skips all four line terminators, so it is widened into an
/// explicit class here.
fn rust_caps_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let newline = "\\n\\v\\f\\r\\x{85}\\x{2028}\\x{2029}";
        let dot = "[^\\n\\r\\x{2028}\\x{2029}]";
        Regex::new(&format!(
            "(((?=(\\r\\n|[{newline}]))\\3){{2,}}|^|[!.?])\\P{{L}}*{dot}|(^|[^\\p{{L}}\\p{{M}}\\p{{N}}])i(?![\\p{{L}}\\p{{M}}\\p{{N}}])"
        ))
        .unwrap()
    })
}

/// Apply the recovery: uppercase every match in full, the way the emitted
/// `s=>s.toUpperCase()` does.
pub fn auto_upper(text: &str) -> String {
    rust_caps_regex()
        .replace_all(text, |captures: &fancy_regex::Captures| {
            captures[0].to_uppercase()
        })
        .into_owned()
}

/// How many characters auto-capitalization fails to recover for `text`.
pub fn count_bad_auto_caps(text: &str) -> usize {
    let recovered = auto_upper(&text.to_lowercase());
    let mismatches = recovered
        .chars()
        .zip(text.chars())
        .filter(|(a, b)| a != b)
        .count();
    mismatches + recovered.chars().count().abs_diff(text.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentences_and_paragraphs_recover() {
        let text = "Hello there. Second sentence! Third?\n\nNew paragraph, and I said so.";
        assert_eq!(auto_upper(&text.to_lowercase()), text);
        assert_eq!(count_bad_auto_caps(text), 0);
    }

    #[test]
    fn standalone_i_recovers() {
        let text = "Yes, I think I will.";
        assert_eq!(auto_upper(&text.to_lowercase()), text);
    }

    #[test]
    fn unconventional_capitals_do_not_recover() {
        assert!(count_bad_auto_caps("a McIntosh") > 0);
        // lowercase sentence start: recovery would invent a capital
        assert!(count_bad_auto_caps("plain start") > 0);
        assert_eq!(count_bad_auto_caps("Conventional prose, nothing odd."), 0);
    }

    #[test]
    fn single_newline_is_not_a_paragraph() {
        // one newline does not trigger an uppercase, two do
        assert_eq!(auto_upper("a\nb"), "A\nb");
        assert_eq!(auto_upper("a\n\nb"), "A\n\nB");
        assert_eq!(auto_upper("a\r\n\r\nb"), "A\r\n\r\nB");
    }

    #[test]
    fn the_emitted_pattern_has_no_lookbehind() {
        assert!(!js_caps_regex().contains("(?<"));
    }
}
