/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Burrows-Wheeler and move-to-front transforms
//!
//! The transform runs over plain `u32` symbol sequences: code points for the
//! text stage, `0`/`1` for the bit stream stage. Building on a suffix array
//! avoids the explicit end-of-string sentinel, using the identity
//! `trans = [last(input)] ++ [input[sa[i]-1] for sa[i] != 0]` with the
//! primary index at the suffix array position of `0`.
//!
//! Each encode has a matching [`js_bits_decoder`] / [`js_text_decoder`]
//! fragment; the inverse BWT arrow function is defined once by the bit
//! stream fragment and reused by the text fragment.

use log::trace;
use ztml_core::options::MtfPolicy;
use ztml_core::vars::JsVars;

pub mod mtf;
pub mod suffix;
pub mod vowels;

pub use mtf::{mtf_decode, mtf_encode, MAX_MTF_SYMBOL};
use suffix::suffix_array;

/// Burrows-Wheeler transform of `data`, then optionally MTF rank coding.
///
/// Returns the transformed sequence and the primary index. Emitted ranks are
/// surrogate-safe (see [`mtf`]).
pub fn encode(data: &[u32], mtf: Option<MtfPolicy>) -> (Vec<u32>, usize) {
    let (trans, index) = bwt_encode(data);
    trace!("bwt: {} symbols, primary index {index}", trans.len());
    match mtf {
        Some(policy) => (mtf_encode(&trans, policy), index),
        None => (trans, index)
    }
}

/// Invert [`encode`].
pub fn decode(data: &[u32], index: usize, mtf: Option<MtfPolicy>) -> Vec<u32> {
    let trans = match mtf {
        Some(policy) => mtf_decode(data, policy),
        None => data.to_vec()
    };
    bwt_decode(&trans, index)
}

fn bwt_encode(data: &[u32]) -> (Vec<u32>, usize) {
    if data.is_empty() {
        return (Vec::new(), 0);
    }
    let sa = suffix_array(data);

    let mut trans = Vec::with_capacity(data.len());
    trans.push(*data.last().unwrap());
    for &start in &sa {
        if start != 0 {
            trans.push(data[start as usize - 1]);
        }
    }
    let index = sa.iter().position(|&start| start == 0).unwrap();
    (trans, index)
}

fn bwt_decode(trans: &[u32], index: usize) -> Vec<u32> {
    // (symbol, i - (i <= index)): the link may be -1 for the entry consumed
    // last, so it is carried as a signed value
    let mut ordered: Vec<(u32, isize)> = trans
        .iter()
        .enumerate()
        .map(|(i, &symbol)| (symbol, i as isize - isize::from(i <= index)))
        .collect();
    ordered.sort();

    let mut out = Vec::with_capacity(trans.len());
    let mut at = index as isize;
    for _ in 0..trans.len() {
        let (symbol, next) = ordered[at as usize];
        out.push(symbol);
        at = next;
    }
    out
}

/// The inverse-BWT fragment for the bit array.
///
/// Defines the shared arrow function `B` and applies it; the text fragment
/// emitted later reuses `B`. The sort key is numeric so the same function
/// stays correct for code points beyond the BMP.
pub fn js_bits_decoder(index: usize, vars: &JsVars) -> String {
    let bits = &vars.bits;
    let bwt = &vars.bwt;
    format!(
        "{bwt}=(d,k)=>{{s=d.map((c,i)=>[c,i-(i<=k)]).sort((a,b)=>a[0]-b[0]);for(j=0;j<s.length;)[d[j++],k]=s[k]}}\n{bwt}({bits},{index})\n"
    )
}

/// The inverse MTF + inverse BWT fragment for the symbol stream.
///
/// `max_rank` is the largest emitted (shifted) rank; the surrogate
/// correction map is only included when some rank actually crossed the gap.
pub fn js_text_decoder(
    index: usize, mtf: Option<MtfPolicy>, max_rank: u32, vars: &JsVars
) -> String {
    let text = &vars.text;
    let bwt = &vars.bwt;
    let mut out = String::new();

    let to_code_points = if mtf.is_some() && max_rank >= mtf::SURROGATE_BASE {
        format!("{text}=[...{text}].map(c=>(c=c.codePointAt(),c<57344?c:c-2048))\n")
    } else {
        format!("{text}=[...{text}].map(c=>c.codePointAt())\n")
    };
    out.push_str(&to_code_points);

    if let Some(policy) = mtf {
        // policies that look back at the previous rank read p before the
        // first assignment, so it gets seeded with the encoder's 0
        let init = match policy {
            MtfPolicy::StickySplit | MtfPolicy::HalfSticky => "j=p=0",
            _ => "j=0"
        };
        out.push_str(&format!(
            "d=[...Array({text}.reduce((a,b)=>Math.max(a,b+1),0)).keys()]\n{init}\nfor(k of {text}){text}[j++]=d[k],{}\n",
            js_reinsert(policy)
        ));
    }
    out.push_str(&format!(
        "{bwt}({text},{index})\n{text}={text}.map(c=>String.fromCodePoint(c)).join('')\n"
    ));
    out
}

/// The splice expression reinserting the just-decoded symbol, per policy.
/// Policies that look at the previous rank keep it in `p`.
fn js_reinsert(policy: MtfPolicy) -> &'static str {
    match policy {
        MtfPolicy::MoveToFront => "d.unshift(d.splice(k,1)[0])",
        MtfPolicy::StickyFront => "d.splice(k>1,0,d.splice(k,1)[0])",
        MtfPolicy::StickySplit => "d.splice(p>0?k>0:k>1,0,d.splice(k,1)[0]),p=k",
        MtfPolicy::HalfJump => "d.splice(k>>1,0,d.splice(k,1)[0])",
        MtfPolicy::HalfSticky => "d.splice(k>1?k>>1:p>0&&k>0,0,d.splice(k,1)[0]),p=k",
        MtfPolicy::Scaled60 => "d.splice(k*.6+.5|0,0,d.splice(k,1)[0])",
        MtfPolicy::Scaled70 => "d.splice(k*.7+.5|0,0,d.splice(k,1)[0])",
        MtfPolicy::Scaled80 => "d.splice(k*.8+.5|0,0,d.splice(k,1)[0])",
        MtfPolicy::Scaled90 => "d.splice(k*.9+.5|0,0,d.splice(k,1)[0])"
    }
}
