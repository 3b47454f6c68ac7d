/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The aliasing minifier.
//!
//! Rather than a JS parser, this is a table of user-editable aliases; each
//! right-hand side is turned into a byte regex and substituted over the
//! non-payload parts of the script. An alias only commits when it pays for
//! itself (`min_count` uses), and its declaration is prepended so the script
//! stays self-contained. Aliases run in reverse declaration order, which
//! lets an early alias rewrite the prepended declarations of later ones
//! while still being declared above them in the output.

use log::warn;
use regex::bytes::Regex;

/// The stock alias table. Editable by callers; lines that do not apply to a
/// given script simply never reach their use count.
pub const DEFAULT_ALIASES: &str = "
Q = document
A = (e, c) => e.appendChild(c)
B = document.body
C = 'textContent'
D = 'dataset'
E = e => document.createElement(e)
F = String.fromCodePoint
G = 'width'
H = 'height'
I = setInterval
J = 'background'
K = 'color'
L = 'length'
M = (e, d) => e.setAttribute('style', d)
N = speechSynthesis
O = setTimeout
T = 'parentElement'
R = 'target'
S = 'style'
";

#[derive(Debug, Clone)]
pub struct UglifyOptions {
    /// Substitutions below this use count are rolled back.
    pub min_count:        usize,
    /// Prepend the declaration of every committed alias.
    pub add_used_aliases: bool,
    /// For string aliases, also replace the quoted form (`'length'` -> `L`)
    /// next to the dotted form (`.length` -> `[L]`).
    pub replace_quoted:   bool,
    /// Discard any alias whose substitution grows the script instead of
    /// only warning about it.
    pub prevent_grow:     bool
}

impl Default for UglifyOptions {
    fn default() -> UglifyOptions {
        UglifyOptions {
            min_count:        2,
            add_used_aliases: true,
            replace_quoted:   true,
            prevent_grow:     false
        }
    }
}

/// Apply the alias table to `script`, never touching the payload literal
/// `PAYLOAD=\`…\``.
pub fn uglify(
    script: Vec<u8>, aliases: &str, payload_var: &str, options: &UglifyOptions
) -> Vec<u8> {
    let original_len = script.len();
    let splitter = payload_splitter(payload_var);
    let mut script = script;

    for line in aliases.lines().rev() {
        let line = line.replace(' ', "");
        if line.is_empty() {
            continue;
        }
        let Some((short, long)) = line.split_once('=') else {
            warn!("ignoring malformed alias line {line:?}");
            continue;
        };
        if short == payload_var {
            warn!("alias {short} collides with the payload variable, skipped");
            continue;
        }
        let Some(rules) = build_rules(short, long, options.replace_quoted) else {
            warn!("unsupported alias signature {line:?}, skipped");
            continue;
        };

        let (candidate, count) = substitute_outside_payload(&script, &splitter, &rules);
        if count < options.min_count {
            continue;
        }

        let mut candidate = candidate;
        if options.add_used_aliases {
            let declaration = format!("{line}\n").into_bytes();
            if !contains(&candidate, &declaration) {
                let body_start = candidate
                    .iter()
                    .position(|byte| !byte.is_ascii_whitespace())
                    .unwrap_or(candidate.len());
                let mut with_declaration = declaration;
                with_declaration.extend_from_slice(&candidate[body_start..]);
                candidate = with_declaration;
            }
        }
        if options.prevent_grow && candidate.len() > script.len() {
            warn!("alias {short} grew the script, discarded");
            continue;
        }
        script = candidate;
    }

    if script.len() > original_len {
        warn!("uglify grew the script: {} B > {original_len} B", script.len());
    }
    script
}

/// The regex isolating the payload chunk, so substitution never rewrites
/// inside the embedded literal.
fn payload_splitter(payload_var: &str) -> Regex {
    let pattern = format!(
        "(?s-u){}=`(?:\\\\.|[^`\\\\])*`",
        regex::escape(payload_var)
    );
    Regex::new(&pattern).unwrap()
}

fn substitute_outside_payload(
    script: &[u8], splitter: &Regex, rules: &[(Regex, Vec<u8>)]
) -> (Vec<u8>, usize) {
    let literals: Vec<(usize, usize)> = splitter
        .find_iter(script)
        .map(|hit| (hit.start(), hit.end()))
        .collect();

    let mut out = Vec::with_capacity(script.len());
    let mut count = 0usize;
    let mut last = 0usize;

    for (start, end) in literals {
        apply_rules(&script[last..start], rules, &mut out, &mut count);
        out.extend_from_slice(&script[start..end]);
        last = end;
    }
    apply_rules(&script[last..], rules, &mut out, &mut count);
    (out, count)
}

fn apply_rules(part: &[u8], rules: &[(Regex, Vec<u8>)], out: &mut Vec<u8>, count: &mut usize) {
    let mut part = part.to_vec();
    for (pattern, replacement) in rules {
        *count += pattern.find_iter(&part).count();
        part = pattern.replace_all(&part, replacement.as_slice()).into_owned();
    }
    out.extend_from_slice(&part);
}

/// Derive the substitution rules from an alias right-hand side.
///
/// Supported shapes: a quoted string literal, a receiver method call
/// (`(a, b) => a.method(b)`), and a plain expression path (optionally behind
/// a single-argument arrow). Anything else returns `None`.
fn build_rules(short: &str, long: &str, replace_quoted: bool) -> Option<Vec<(Regex, Vec<u8>)>> {
    let mut rules = Vec::new();

    let quoted = long.len() >= 2
        && (long.starts_with('\'') || long.starts_with('"'))
        && long.chars().next() == long.chars().last();
    if quoted {
        let inner = &long[1..long.len() - 1];
        if inner.is_empty() || !inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        // .textContent -> [C]
        rules.push((
            compile(&format!("\\.{inner}\\b")),
            format!("[{short}]").into_bytes()
        ));
        if replace_quoted {
            // 'textContent' -> C
            rules.push((
                compile(&format!("['\"]{inner}['\"]")),
                short.as_bytes().to_vec()
            ));
        }
        return Some(rules);
    }

    let receiver_form = long.contains(',') && long.contains("=>");
    let body = strip_arrow(long);
    if body.is_empty() || !is_substitutable(&body) {
        return None;
    }
    let mut core = escape_core(&body);

    if receiver_form {
        let (replacement, tail) = if body.contains('(') {
            let tail = if ends_with_word(&body) { "\\b" } else { "" };
            (format!("{short}(${{1}}"), tail)
        } else {
            // no argument survived the strip; open the call here and let the
            // substitution carry the receiver's first argument comma
            core.push_str("\\(");
            (format!("{short}(${{1}},"), "")
        };
        rules.push((
            compile(&format!("([\\w.]+?)\\.{core}{tail}")),
            replacement.into_bytes()
        ));
    } else {
        let lead = if starts_with_word(&body) { "\\b" } else { "" };
        let tail = if ends_with_word(&body) { "\\b" } else { "" };
        rules.push((
            compile(&format!("{lead}{core}{tail}")),
            short.as_bytes().to_vec()
        ));
    }
    Some(rules)
}

/// Reduce an arrow alias to its substitutable body, the way the alias
/// grammar defines it: drop the parameter list, the receiver up to its
/// first dot when a receiver exists, any single-argument call parentheses,
/// and everything from the first argument comma on.
fn strip_arrow(long: &str) -> String {
    use std::sync::OnceLock;
    static STRIP: OnceLock<regex::Regex> = OnceLock::new();
    let strip = STRIP.get_or_init(|| {
        regex::Regex::new("[^,]+,[^=]+=>[^.]+\\.|[^=]+=>|\\([^,)]+\\)|,.*").unwrap()
    });
    strip.replace_all(long, "").into_owned()
}

fn is_substitutable(body: &str) -> bool {
    body.chars()
        .all(|c| c.is_ascii_alphanumeric() || "_.$('\")".contains(c))
}

fn starts_with_word(body: &str) -> bool {
    body.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn ends_with_word(body: &str) -> bool {
    body.chars()
        .last()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape the body for use inside a regex, widening quotes so either style
/// matches.
fn escape_core(body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 4);
    for ch in body.chars() {
        match ch {
            '\'' | '"' => out.push_str("['\"]"),
            c if c.is_ascii_alphanumeric() || c == '_' => out.push(c),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?s-u){pattern}")).unwrap()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
