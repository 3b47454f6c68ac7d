/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Canonical Huffman encoding
//!
//! Even though the PNG stage compresses with DEFLATE, which runs its own
//! Huffman internally, pre-encoding the symbol stream is a significant win
//! for text. Canonical code assignment means the decoder needs no explicit
//! codebook: it gets the symbols in order of decreasing assignment plus, per
//! code length, a `(base, offset)` pair in a variation of Moffat & Turpin.
//!
//! Code lengths are limited to 20, and to 15 wherever the alphabet permits
//! it, so every packed table value stays a Unicode scalar — a single UTF-16
//! code unit in the common case (see [`Encoded::table`]); the limiter
//! flattens the histogram until the deepest code fits.

use std::collections::BinaryHeap;

use log::trace;
use ztml_core::bits::BitVec;
use ztml_core::vars::JsVars;
use ztml_web::escape_code_points;

/// Everything the encode produces: the bit stream plus the two serialized
/// halves of the canonical codebook.
#[derive(Debug, Clone, Default)]
pub struct Encoded {
    pub bits:    BitVec,
    /// Symbols in order of decreasing canonical assignment; index 0 carries
    /// the numerically largest (deepest) codeword.
    pub charset: Vec<u32>,
    /// For each length `L` in `0..=max_len`, the pair
    /// `[2^L - top_code(L), charset_index_of_top(L)]`, with the sentinel
    /// `[2^L + 1, 1]` where no codes of length `L` exist. The sentinel base
    /// keeps the decoder's `2^L - base - code` negative for every prefix.
    pub table:   Vec<u32>
}

/// Build the canonical code for `data` and encode it.
pub fn encode(data: &[u32]) -> Encoded {
    let mut symbols: Vec<u32> = data.to_vec();
    symbols.sort_unstable();
    symbols.dedup();
    if symbols.is_empty() {
        return Encoded::default();
    }

    let mut counts: Vec<u64> = vec![0; symbols.len()];
    for value in data {
        counts[symbols.binary_search(value).unwrap()] += 1;
    }

    let lengths = limited_code_lengths(&counts, length_limit(symbols.len()));

    // canonical order: by length, then by symbol value
    let mut order: Vec<usize> = (0..symbols.len()).collect();
    order.sort_by_key(|&at| (lengths[at], symbols[at]));

    let mut codes = vec![0u32; symbols.len()];
    let mut code = 0u32;
    let mut previous_len = lengths[order[0]];
    for (rank, &at) in order.iter().enumerate() {
        if rank > 0 {
            code = (code + 1) << (lengths[at] - previous_len);
        }
        codes[at] = code;
        previous_len = lengths[at];
    }

    let n = symbols.len();
    let max_len = lengths.iter().copied().max().unwrap();
    let mut table = vec![0u32; 2 * (max_len as usize + 1)];
    for (slot, chunk) in table.chunks_exact_mut(2).enumerate() {
        chunk[0] = (1u32 << slot) + 1;
        chunk[1] = 1;
    }
    for (rank, &at) in order.iter().enumerate() {
        // the last assignment per length wins: exactly the top code
        let len = lengths[at] as usize;
        table[2 * len] = (1u32 << len) - codes[at];
        table[2 * len + 1] = (n - 1 - rank) as u32;
    }
    debug_assert!(no_adjacent_surrogate_pair(&table));

    let charset: Vec<u32> = order.iter().rev().map(|&at| symbols[at]).collect();

    let mut bits = BitVec::with_capacity(data.len() * 2);
    for value in data {
        let at = symbols.binary_search(value).unwrap();
        bits.push_code(codes[at], lengths[at]);
    }
    trace!(
        "huffman: {} symbols, max length {max_len}, {} bits",
        symbols.len(),
        bits.len()
    );

    Encoded {
        bits,
        charset,
        table
    }
}

/// Decode `bits` against a serialized codebook, mirroring the synthesized
/// JS loop bit for bit. Stops early if the stream ends mid-codeword.
pub fn decode(bits: &BitVec, charset: &[u32], table: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut at = 0usize;

    while at < bits.len() {
        let mut code = 0i64;
        let mut len = 0usize;
        loop {
            if 2 * len >= table.len() {
                return out;
            }
            let margin = (1i64 << len) - i64::from(table[2 * len]) - code;
            if margin >= 0 {
                out.push(charset[table[2 * len + 1] as usize + margin as usize]);
                break;
            }
            if at >= bits.len() {
                return out;
            }
            code = (code << 1) | i64::from(bits.get(at));
            at += 1;
            len += 1;
        }
    }
    out
}

/// The two-line JS decoder reading the bit array into the text variable.
pub fn js_decoder(encoded: &Encoded, vars: &JsVars) -> String {
    let charset = escape_code_points(&encoded.charset);
    let table = escape_code_points(&encoded.table);
    let text = &vars.text;
    let bits = &vars.bits;
    format!(
        "s=[...`{charset}`]\nd=[...`{table}`]\nfor(j={text}='';j<{bits}.length;{text}+=s[d[k*2-1].codePointAt()+m])for(k=c='0b0';(m=2**k-d[k++*2].codePointAt()-c)<0;)c+={bits}[j++]\n"
    )
}

/// The depth limit for an alphabet of `n` symbols: 15 keeps every table
/// value inside one UTF-16 code unit, and 20 is the hard ceiling — past
/// that `2^L` leaves the range a packed table value may occupy, and the
/// emitted `\u{…}` escape would not even parse.
///
/// # Panics
/// If the alphabet is too large for length-20 codes to exist.
fn length_limit(n: usize) -> u32 {
    assert!(
        n <= 1 << 20,
        "alphabet of {n} symbols cannot fit length-20 codes"
    );
    let floor = usize::BITS - (n.max(2) - 1).leading_zeros();
    floor.clamp(15, 20)
}

/// Huffman code lengths, flattening the histogram until none exceeds
/// `limit`.
fn limited_code_lengths(counts: &[u64], limit: u32) -> Vec<u32> {
    let mut counts = counts.to_vec();
    loop {
        let lengths = code_lengths(&counts);
        if lengths.iter().all(|&len| len <= limit) {
            return lengths;
        }
        for count in counts.iter_mut() {
            *count = (*count + 1) / 2;
        }
    }
}

fn code_lengths(counts: &[u64]) -> Vec<u32> {
    let n = counts.len();
    if n == 1 {
        // a zero-bit code cannot be read back; spend the one bit
        return vec![1];
    }

    let mut weight: Vec<u64> = counts.to_vec();
    let mut parent: Vec<usize> = vec![usize::MAX; n];
    let mut heap: BinaryHeap<std::cmp::Reverse<(u64, usize)>> = (0..n)
        .map(|at| std::cmp::Reverse((weight[at], at)))
        .collect();

    while heap.len() > 1 {
        let std::cmp::Reverse((weight_a, a)) = heap.pop().unwrap();
        let std::cmp::Reverse((weight_b, b)) = heap.pop().unwrap();
        let merged = weight.len();
        weight.push(weight_a + weight_b);
        parent.push(usize::MAX);
        parent[a] = merged;
        parent[b] = merged;
        heap.push(std::cmp::Reverse((weight_a + weight_b, merged)));
    }

    (0..n)
        .map(|leaf| {
            let mut depth = 0;
            let mut node = leaf;
            while parent[node] != usize::MAX {
                node = parent[node];
                depth += 1;
            }
            depth
        })
        .collect()
}

/// A lone high surrogate followed by a lone low surrogate would fuse into
/// one code point under the decoder's string spread; the depth limit makes
/// that impossible for single-code-unit tables, this guards the rest.
fn no_adjacent_surrogate_pair(table: &[u32]) -> bool {
    table.windows(2).all(|pair| {
        !((0xD800..0xDC00).contains(&pair[0]) && (0xDC00..0xE000).contains(&pair[1]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(data: &[u32]) -> Encoded {
        let encoded = encode(data);
        assert_eq!(
            decode(&encoded.bits, &encoded.charset, &encoded.table),
            data
        );
        encoded
    }

    #[test]
    fn empty_input() {
        let encoded = roundtrip(&[]);
        assert!(encoded.bits.is_empty());
        assert!(encoded.charset.is_empty());
        assert!(encoded.table.is_empty());
    }

    #[test]
    fn single_symbol_costs_one_bit() {
        let data = vec![7u32; 13];
        let encoded = roundtrip(&data);
        assert_eq!(encoded.bits.len(), 13);
        assert_eq!(encoded.charset, vec![7]);
        // L=0 sentinel, then the single length-1 code
        assert_eq!(encoded.table, vec![2, 1, 2, 0]);
    }

    #[test]
    fn skewed_histogram() {
        let mut data = vec![0u32; 100];
        data.extend(std::iter::repeat(1).take(40));
        data.extend(std::iter::repeat(2).take(10));
        data.extend(std::iter::repeat(3).take(3));
        let encoded = roundtrip(&data);
        // the dominant symbol gets the short code, so the stream beats 2n
        assert!(encoded.bits.len() < data.len() * 2);
        assert_eq!(encoded.charset.len(), 4);
    }

    #[test]
    fn text_like_roundtrip() {
        let data: Vec<u32> = "the quick brown fox jumps over the lazy dog, twice over"
            .chars()
            .map(u32::from)
            .collect();
        roundtrip(&data);
    }

    #[test]
    fn sentinels_fill_missing_lengths() {
        // two symbols: both get 1-bit codes, L=0 carries the sentinel
        let encoded = roundtrip(&[5, 5, 9]);
        assert_eq!(encoded.table.len(), 4);
        assert_eq!(&encoded.table[0..2], &[2, 1]);
        // top code of length 1 is 1 -> base 2-1=1, owned by charset[0]
        assert_eq!(&encoded.table[2..4], &[1, 0]);
        assert_eq!(encoded.charset.len(), 2);
    }

    #[test]
    fn degenerate_fibonacci_weights_get_limited() {
        // fibonacci-ish weights push plain huffman past any sane depth
        let mut data = Vec::new();
        let mut a = 1u64;
        let mut b = 1u64;
        for symbol in 0..24u32 {
            for _ in 0..a.min(100_000) {
                data.push(symbol);
            }
            let next = a + b;
            a = b;
            b = next;
        }
        let encoded = encode(&data);
        let max_len = (encoded.table.len() / 2) - 1;
        assert!(max_len <= 15, "depth {max_len} exceeds the code unit limit");
        assert_eq!(
            decode(&encoded.bits, &encoded.charset, &encoded.table),
            data
        );
    }

    #[test]
    fn length_limit_stays_between_15_and_20() {
        assert_eq!(length_limit(1), 15);
        assert_eq!(length_limit(1 << 15), 15);
        assert_eq!(length_limit((1 << 15) + 1), 16);
        assert_eq!(length_limit(1 << 20), 20);
    }

    #[test]
    #[should_panic(expected = "cannot fit length-20 codes")]
    fn oversized_alphabet_panics() {
        length_limit((1 << 20) + 1);
    }

    #[test]
    fn js_decoder_embeds_escaped_tables() {
        let encoded = encode(&[0, 0, 1, 2]);
        let js = js_decoder(&encoded, &JsVars::default());
        assert!(js.starts_with("s=[...`"));
        assert!(js.contains("\\0"));
        assert!(js.contains("'0b0'"));
    }
}
