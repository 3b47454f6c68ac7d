/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Shaping a bit sequence into a near-square PNG and re-optimizing it.
//!
//! The browser's PNG path is the decompressor, so the only thing that
//! matters about the image is its byte count. The shape search keeps the
//! rectangle close to square (canvas limits cap each dimension at 32767),
//! padding one bit at a time until the area divides exactly; each filter
//! strategy is then compressed with Zopfli and the smallest artifact wins.

use std::num::NonZeroU64;

use log::{info, trace};
use ztml_core::bits::BitVec;

use crate::error::PngErrors;
use crate::filters::{entropy_cost, filter_row, min_sum_cost, FilterStrategy};

/// Canvas dimension limit shared by the browsers that matter.
pub const MAX_DIM: usize = 32767;
/// Total pixel limit; square canvases above this fail on mobile Safari.
pub const MAX_PIXELS: usize = 11180 * 11180;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];
/// Filtered streams above this get the cheaper iteration count.
const LARGE_STREAM: usize = 200_000;

#[derive(Debug, Clone)]
pub struct PngOptions {
    depth:            u8,
    strategies:       Vec<FilterStrategy>,
    iterations:       u32,
    iterations_large: u32,
    strip_iend:       bool
}

impl Default for PngOptions {
    fn default() -> PngOptions {
        PngOptions {
            depth:            1,
            strategies:       FilterStrategy::all().to_vec(),
            iterations:       15,
            iterations_large: 5,
            strip_iend:       true
        }
    }
}

impl PngOptions {
    pub fn new() -> PngOptions {
        PngOptions::default()
    }

    pub const fn depth(&self) -> u8 {
        self.depth
    }

    pub fn strategies(&self) -> &[FilterStrategy] {
        &self.strategies
    }

    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    pub const fn iterations_large(&self) -> u32 {
        self.iterations_large
    }

    pub const fn strip_iend(&self) -> bool {
        self.strip_iend
    }

    /// Bits per pixel; only 1, 8 and 24 exist (see [`to_png`]).
    pub fn set_depth(mut self, depth: u8) -> Self {
        self.depth = depth;
        self
    }

    pub fn set_strategies(mut self, strategies: &[FilterStrategy]) -> Self {
        self.strategies = strategies.to_vec();
        self
    }

    pub fn set_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn set_iterations_large(mut self, iterations: u32) -> Self {
        self.iterations_large = iterations;
        self
    }

    pub fn set_strip_iend(mut self, yes: bool) -> Self {
        self.strip_iend = yes;
        self
    }
}

/// The finished image plus the geometry the decoder fragment needs.
#[derive(Debug, Clone)]
pub struct PngArtifact {
    pub data:     Vec<u8>,
    pub width:    usize,
    pub height:   usize,
    /// Payload bits, excluding shape padding.
    pub bit_count: usize,
    pub pad_bits: usize,
    pub strategy: FilterStrategy
}

/// Encode `bits` as a greyscale (or RGB at depth 24) PNG.
///
/// # Panics
/// On the input shape violations: an empty bit sequence, a depth outside
/// {1, 8, 24}, or a sequence too large for any allowed canvas.
pub fn to_png(bits: &BitVec, options: &PngOptions) -> Result<PngArtifact, PngErrors> {
    assert!(!bits.is_empty(), "cannot shape an empty bit sequence into a PNG");
    assert!(
        matches!(options.depth, 1 | 8 | 24),
        "unsupported bit depth {}",
        options.depth
    );

    let bit_count = bits.len();
    let bpp = usize::from(options.depth);
    let mut bits = bits.clone();
    let (width, height) = shape_and_pad(&mut bits, bpp);
    let pad_bits = bits.len() - bit_count;

    let rows = pack_scanlines(&bits, width, height, bpp);
    let bpp_bytes = (bpp / 8).max(1);

    let mut best: Option<(Vec<u8>, FilterStrategy)> = None;
    for &strategy in &options.strategies {
        let filtered = apply_strategy(&rows, strategy, bpp_bytes, options.depth)?;
        let iterations = if filtered.len() > LARGE_STREAM {
            options.iterations_large
        } else {
            options.iterations
        };
        let zlib = zlib_compress(&filtered, iterations)?;
        let candidate = assemble(width, height, options.depth, &zlib, options.strip_iend);
        trace!("strategy {strategy:?}: {} B", candidate.len());

        let better = best
            .as_ref()
            .map(|(data, _)| candidate.len() < data.len())
            .unwrap_or(true);
        if better {
            best = Some((candidate, strategy));
        }
    }
    let (data, strategy) = best.ok_or("no filter strategy configured")?;
    info!(
        "png: {width}x{height}, {pad_bits} pad bits, {} B via {strategy:?}",
        data.len()
    );

    Ok(PngArtifact {
        data,
        width,
        height,
        bit_count,
        pad_bits,
        strategy
    })
}

/// Find the near-square rectangle, appending padding until it tiles.
fn shape_and_pad(bits: &mut BitVec, bpp: usize) -> (usize, usize) {
    let padding_bit = |bits: &BitVec| {
        if bpp == 1 {
            0
        } else {
            // repeating the last value keeps the tail compressible
            bits.get(bits.len() - 1)
        }
    };

    while bits.len() % bpp != 0 {
        let bit = padding_bit(bits);
        bits.push(bit);
    }
    loop {
        let pixels = bits.len() / bpp;
        assert!(pixels <= MAX_PIXELS, "bit sequence needs {pixels} pixels, more than a canvas can hold");

        let mut height = isqrt(pixels);
        while height > 1 && pixels % height != 0 && pixels / (height - 1) <= MAX_DIM {
            height -= 1;
        }
        let width = pixels / height;
        assert!(width <= MAX_DIM, "png width {width} exceeds {MAX_DIM}");

        if width * height == pixels {
            return (width, height);
        }
        for _ in 0..bpp {
            let bit = padding_bit(bits);
            bits.push(bit);
        }
    }
}

fn isqrt(value: usize) -> usize {
    let mut root = (value as f64).sqrt() as usize;
    while root * root > value {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= value {
        root += 1;
    }
    root.max(1)
}

/// Pack the payload bits into unfiltered scanlines, MSB first, rows padded
/// to byte boundaries with zero bits.
fn pack_scanlines(bits: &BitVec, width: usize, height: usize, bpp: usize) -> Vec<Vec<u8>> {
    let row_payload_bits = width * bpp;
    let row_bytes = (row_payload_bits + 7) / 8;
    let mut rows = Vec::with_capacity(height);

    for y in 0..height {
        let mut row = vec![0u8; row_bytes];
        for pos in 0..row_payload_bits {
            let bit = bits.get(y * row_payload_bits + pos);
            row[pos >> 3] |= bit << (7 - (pos & 7));
        }
        rows.push(row);
    }
    rows
}

/// Serialize the rows under one strategy: filter byte plus filtered bytes
/// per row.
fn apply_strategy(
    rows: &[Vec<u8>], strategy: FilterStrategy, bpp_bytes: usize, depth: u8
) -> Result<Vec<u8>, PngErrors> {
    let mut stream = Vec::new();
    let mut filtered = Vec::new();
    let mut scratch = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        let prev: &[u8] = if y == 0 { &[] } else { &rows[y - 1] };
        let filter = match strategy {
            FilterStrategy::Fixed(filter) => filter,
            FilterStrategy::MinSum => pick_row_filter(|f| {
                filter_row(f, row, prev, bpp_bytes, &mut scratch);
                min_sum_cost(&scratch) as f64
            }),
            FilterStrategy::Entropy => pick_row_filter(|f| {
                filter_row(f, row, prev, bpp_bytes, &mut scratch);
                entropy_cost(&scratch)
            }),
            FilterStrategy::Predict => {
                // what the plain writer does: sub-byte rows stay unfiltered,
                // byte-aligned rows get the min-sum heuristic
                if depth < 8 {
                    0
                } else {
                    pick_row_filter(|f| {
                        filter_row(f, row, prev, bpp_bytes, &mut scratch);
                        min_sum_cost(&scratch) as f64
                    })
                }
            }
            FilterStrategy::Brute => {
                let mut best = (f64::INFINITY, 0u8);
                for f in 0..=4u8 {
                    filter_row(f, row, prev, bpp_bytes, &mut scratch);
                    let compressed = deflate_len(&scratch)?;
                    if (compressed as f64) < best.0 {
                        best = (compressed as f64, f);
                    }
                }
                best.1
            }
        };
        filter_row(filter, row, prev, bpp_bytes, &mut filtered);
        stream.push(filter);
        stream.extend_from_slice(&filtered);
    }
    Ok(stream)
}

fn pick_row_filter<F: FnMut(u8) -> f64>(mut cost: F) -> u8 {
    let mut best = (f64::INFINITY, 0u8);
    for filter in 0..=4u8 {
        let value = cost(filter);
        if value < best.0 {
            best = (value, filter);
        }
    }
    best.1
}

/// One-shot deflate length, the brute-force row cost.
fn deflate_len(data: &[u8]) -> Result<usize, PngErrors> {
    let options = zopfli::Options {
        iteration_count: NonZeroU64::new(1).unwrap(),
        ..zopfli::Options::default()
    };
    let mut out = Vec::new();
    zopfli::compress(options, zopfli::Format::Deflate, data, &mut out)?;
    Ok(out.len())
}

fn zlib_compress(data: &[u8], iterations: u32) -> Result<Vec<u8>, PngErrors> {
    let options = zopfli::Options {
        iteration_count: NonZeroU64::new(u64::from(iterations.max(1))).unwrap(),
        ..zopfli::Options::default()
    };
    let mut out = Vec::new();
    zopfli::compress(options, zopfli::Format::Zlib, data, &mut out)?;
    Ok(out)
}

fn assemble(width: usize, height: usize, depth: u8, zlib: &[u8], strip_iend: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(zlib.len() + 64);
    out.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(if depth == 1 { 1 } else { 8 }); // bits per sample
    ihdr.push(if depth == 24 { 2 } else { 0 }); // greyscale / truecolor
    ihdr.extend_from_slice(&[0, 0, 0]); // deflate, adaptive filtering, no interlace
    write_chunk(&mut out, b"IHDR", &ihdr);

    write_chunk(&mut out, b"IDAT", zlib);
    if !strip_iend {
        write_chunk(&mut out, b"IEND", &[]);
    }
    out
}

fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(tag);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_prefers_exact_squares() {
        let mut bits: BitVec = std::iter::repeat(0u8).take(36).collect();
        let (width, height) = shape_and_pad(&mut bits, 1);
        assert_eq!((width, height), (6, 6));
        assert_eq!(bits.len(), 36);
    }

    #[test]
    fn shape_finds_rectangles_before_padding() {
        // 35 = 7 * 5: exact, no padding
        let mut bits: BitVec = std::iter::repeat(1u8).take(35).collect();
        let (width, height) = shape_and_pad(&mut bits, 1);
        assert_eq!(width * height, 35);
        assert_eq!(bits.len(), 35);
        assert!(height <= width);
    }

    #[test]
    fn small_primes_collapse_to_one_row() {
        // every height down to 1 is legal here, and 1 always divides
        let mut bits: BitVec = std::iter::repeat(0u8).take(37).collect();
        let (width, height) = shape_and_pad(&mut bits, 1);
        assert_eq!((width, height), (37, 1));
        assert_eq!(bits.len(), 37);
    }

    #[test]
    fn oversized_primes_get_padded() {
        // a prime above the dimension limit cannot be one row, so the
        // search pads until the area divides
        let mut bits: BitVec = std::iter::repeat(0u8).take(32771).collect();
        let (width, height) = shape_and_pad(&mut bits, 1);
        assert_eq!(width * height, bits.len());
        assert!(bits.len() > 32771);
        assert!(width <= MAX_DIM && height <= MAX_DIM);
    }

    #[test]
    fn scanlines_pack_msb_first() {
        let bits: BitVec = [1u8, 0, 1, 1, 0, 0, 0, 1, 1].iter().copied().collect();
        let rows = pack_scanlines(&bits, 3, 3, 1);
        assert_eq!(rows, vec![vec![0b1010_0000], vec![0b1000_0000], vec![0b0110_0000]]);
    }

    #[test]
    fn chunk_crc_is_correct() {
        // IEND CRC is a well-known constant
        let mut out = Vec::new();
        write_chunk(&mut out, b"IEND", &[]);
        assert_eq!(out, vec![0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    #[should_panic(expected = "empty bit sequence")]
    fn empty_bits_panic() {
        let _ = to_png(&BitVec::new(), &PngOptions::default());
    }

    #[test]
    #[should_panic(expected = "unsupported bit depth")]
    fn bad_depth_panics() {
        let bits: BitVec = std::iter::once(1u8).collect();
        let _ = to_png(&bits, &PngOptions::default().set_depth(4));
    }
}
