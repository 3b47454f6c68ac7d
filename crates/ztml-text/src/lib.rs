/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Text preprocessing
//!
//! Condenses text so later stages see a smaller alphabet and more
//! redundancy: whitespace and punctuation normalization (one way), case
//! folding with regex recovery, `the`-elision and `qu`-elision (all exactly
//! reversible). [`encode_and_plan`] applies the reversible set, decides the
//! fallbacks, and returns the [`TextPlan`] the decoder fragments and the
//! in-process inverse are built from.

use std::sync::OnceLock;

use log::warn;
use regex::Regex;
use ztml_core::options::CapsMode;
use ztml_core::vars::JsVars;

pub mod caps;
pub mod elide;

pub use caps::{auto_upper, count_bad_auto_caps};

/// Which reversible transforms a given encode committed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPlan {
    /// The effective caps mode; `Auto` never appears here, it resolves to
    /// `Simple` or falls back to `Raw`.
    pub caps: CapsMode,
    pub the:  bool,
    pub quq:  bool
}

/// One-way normalization applied before anything reversible.
pub fn normalize(
    text: &str, reduce_whitespace: bool, unix_newline: bool, fix_punct: bool
) -> String {
    static PARAGRAPH: OnceLock<Regex> = OnceLock::new();
    static NEWLINE_RUN: OnceLock<Regex> = OnceLock::new();
    static SPACE_RUN: OnceLock<Regex> = OnceLock::new();
    static CRLF: OnceLock<Regex> = OnceLock::new();
    static DASH: OnceLock<Regex> = OnceLock::new();
    static SINGLE_QUOTE: OnceLock<Regex> = OnceLock::new();
    static DOUBLE_QUOTE: OnceLock<Regex> = OnceLock::new();

    const NL: &str = "\\n\\x{B}\\x{C}\\r\\x{85}\\x{2028}\\x{2029}";

    let mut text = text.to_string();
    if reduce_whitespace {
        let paragraph = PARAGRAPH
            .get_or_init(|| Regex::new(&format!("\\s*[{NL}]\\s*[{NL}]\\s*")).unwrap());
        let newline_run = NEWLINE_RUN
            .get_or_init(|| Regex::new(&format!("[^\\S{NL}]*[{NL}][^\\S{NL}]*")).unwrap());
        let space_run = SPACE_RUN.get_or_init(|| Regex::new(&format!("[^\\S{NL}]+")).unwrap());
        text = paragraph.replace_all(&text, "\n\n").into_owned();
        text = newline_run.replace_all(&text, "\n").into_owned();
        text = space_run.replace_all(&text, " ").into_owned();
        text = text.trim().to_string();
    } else if unix_newline {
        let crlf = CRLF.get_or_init(|| Regex::new("\r\n?").unwrap());
        text = crlf.replace_all(&text, "\n").into_owned();
    }
    if fix_punct {
        let dash = DASH.get_or_init(|| Regex::new("\\p{Pd}").unwrap());
        let single = SINGLE_QUOTE
            .get_or_init(|| Regex::new("[\\x{2018}-\\x{201B}\\x{5F3}\\x{FF07}]").unwrap());
        let double = DOUBLE_QUOTE
            .get_or_init(|| Regex::new("[\\x{201C}-\\x{201F}\\x{5F4}\\x{FF02}]").unwrap());
        text = dash.replace_all(&text, "-").into_owned();
        text = single.replace_all(&text, "'").into_owned();
        text = double.replace_all(&text, "\"").into_owned();
        text = text.replace('\u{2026}', "...");
    }
    text.trim_start_matches('\u{FEFF}').to_string()
}

/// Condense `text` and return it with the plan of committed transforms.
///
/// Fallbacks are decided here: `auto` caps drops to `raw` when the recovery
/// regex cannot reproduce the input, `the` is skipped when inversion would
/// be ambiguous, `qu` when it is lossy or not worth its decoder bytes.
pub fn encode_and_plan(text: &str, caps: CapsMode) -> (String, TextPlan) {
    let caps = match caps {
        CapsMode::Auto => {
            let bad = count_bad_auto_caps(text);
            if bad > 0 {
                warn!("auto caps: {bad} unrecoverable chars, falling back to raw");
                CapsMode::Raw
            } else {
                CapsMode::Simple
            }
        }
        mode => mode
    };

    let folded = if caps.folds() {
        text.to_lowercase()
    } else {
        text.to_string()
    };

    let mut the = true;
    if elide::the_is_ambiguous(&folded) {
        warn!("the-elision skipped: text already contains its inverse pattern");
        the = false;
    }

    let after_the = if the {
        elide::remove_the(&folded)
    } else {
        folded.clone()
    };

    let mut quq = true;
    let elided = elide::encode_quq(&after_the);
    let saved = after_the.chars().count() - elided.chars().count();
    if saved < elide::quq_js_decoder(caps).chars().count() {
        quq = false;
    } else if elide::quq_is_lossy(&folded, caps) {
        warn!("qu-elision skipped: round trip does not recover the text");
        quq = false;
    }

    let condensed = if quq { elided } else { after_the };
    (
        condensed,
        TextPlan {
            caps,
            the,
            quq
        }
    )
}

/// The `.replace(…)` chain reversing the plan, or an empty string when the
/// plan committed to nothing.
pub fn js_decoder(plan: &TextPlan, vars: &JsVars) -> String {
    let mut chain = String::new();
    if plan.quq {
        chain.push_str(&elide::quq_js_decoder(plan.caps));
    }
    if plan.the {
        chain.push_str(elide::THE_JS_DECODER);
    }
    match plan.caps {
        CapsMode::Simple => {
            chain.push_str(&format!(
                ".replace(/{}/gu,s=>s.toUpperCase())",
                caps::js_caps_regex()
            ));
        }
        CapsMode::Upper => chain.push_str(".toUpperCase()"),
        _ => {}
    }
    if chain.is_empty() {
        return String::new();
    }
    let text = &vars.text;
    format!("{text}={text}{chain}\n")
}

/// The in-process inverse of [`encode_and_plan`], used by the round-trip
/// oracle. Mirrors the synthesized chain transform for transform.
pub fn decode(condensed: &str, plan: &TextPlan) -> String {
    let mut out = condensed.to_string();
    if plan.quq {
        out = elide::decode_quq(&out, plan.caps);
    }
    if plan.the {
        out = elide::restore_the(&out);
    }
    match plan.caps {
        CapsMode::Simple => auto_upper(&out),
        CapsMode::Upper => out.to_uppercase(),
        _ => out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(text: &str, caps: CapsMode) -> TextPlan {
        let (condensed, plan) = encode_and_plan(text, caps);
        assert_eq!(decode(&condensed, &plan), text, "caps {caps:?}");
        plan
    }

    #[test]
    fn normalize_whitespace() {
        let out = normalize("  a\t b\r\n\r\nc \rd  ", true, true, false);
        assert_eq!(out, "a b\n\nc\nd");
    }

    #[test]
    fn normalize_newlines_only() {
        assert_eq!(normalize("a\r\nb\rc", false, true, false), "a\nb\nc");
        assert_eq!(normalize("a\r\nb", false, false, false), "a\r\nb");
    }

    #[test]
    fn normalize_punctuation_and_bom() {
        let out = normalize("\u{FEFF}a \u{2014} b \u{2018}c\u{2019} \u{201C}d\u{201D}\u{2026}", false, true, true);
        assert_eq!(out, "a - b 'c' \"d\"...");
    }

    #[test]
    fn auto_resolves_to_simple_for_conventional_prose() {
        let text = "The quick brown fox. It jumped, and I watched.";
        let plan = roundtrip(text, CapsMode::Auto);
        assert_eq!(plan.caps, CapsMode::Simple);
        assert!(plan.the);
    }

    #[test]
    fn auto_falls_back_to_raw() {
        let text = "eXtreme CaSe preserving Text";
        let plan = roundtrip(text, CapsMode::Auto);
        assert_eq!(plan.caps, CapsMode::Raw);
    }

    #[test]
    fn upper_mode_restores_the_in_caps() {
        let text = "THE DOG ATE THE QUICHE. AND I SAW IT.";
        let (condensed, plan) = encode_and_plan(text, CapsMode::Upper);
        assert!(condensed.starts_with(" dog"));
        assert!(condensed.contains("ate  quiche"));
        assert_eq!(decode(&condensed, &plan), text);
    }

    #[test]
    fn double_space_disables_the_elision() {
        let text = "column  aligned  text the end";
        let plan = roundtrip(text, CapsMode::Raw);
        assert!(!plan.the);
    }

    #[test]
    fn quq_skipped_when_not_worth_it() {
        // one qu saves one byte, far below the decoder fragment cost
        let plan = roundtrip("A quiet word.", CapsMode::Auto);
        assert!(!plan.quq);
    }

    #[test]
    fn quq_commits_on_qu_heavy_text() {
        let text = "Quite quickly, the quiet queen quoted quaint quotes; quality quills queued. \
                    Quarrels require quests; quick quips quench queries quite quickly, quoth she."
            .repeat(2);
        // lower folds irreversibly, so compare against the folded text
        let (condensed, plan) = encode_and_plan(&text, CapsMode::Lower);
        assert!(plan.quq);
        assert_eq!(decode(&condensed, &plan), text.to_lowercase());
    }

    #[test]
    fn lower_decode_is_identity_on_folded_text() {
        let (condensed, plan) = encode_and_plan("MiXeD", CapsMode::Lower);
        assert_eq!(decode(&condensed, &plan), "mixed");
        // the fold itself needs no decoder fragment
        let js = js_decoder(&plan, &JsVars::default());
        assert!(!js.contains("toUpperCase"));
        assert!(!js.contains("toLowerCase"));
    }

    #[test]
    fn js_decoder_fragments_match_plan() {
        let vars = JsVars::default();
        let plan = TextPlan {
            caps: CapsMode::Simple,
            the:  true,
            quq:  true
        };
        let js = js_decoder(&plan, &vars);
        assert!(js.starts_with("t=t.replace"));
        assert!(js.contains("'$1the '"));
        assert!(js.contains("toUpperCase()"));
        assert!(!js.contains("(?<"));

        let none = TextPlan {
            caps: CapsMode::Raw,
            the:  false,
            quq:  false
        };
        assert!(js_decoder(&none, &vars).is_empty());
    }
}
