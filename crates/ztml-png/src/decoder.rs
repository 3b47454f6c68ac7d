/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The in-process PNG reader.
//!
//! This is the round-trip oracle standing in for the browser: it accepts
//! exactly what the encoder writes (greyscale 1/8-bit or RGB, single IDAT,
//! optionally missing IEND) and hands back the payload bits.

use ztml_core::bits::BitVec;
use zune_inflate::DeflateDecoder;

use crate::error::PngErrors;
use crate::filters::unfilter_row;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Recover the first `bit_count` payload bits from `data`.
pub fn png_to_bits(data: &[u8], bit_count: usize) -> Result<BitVec, PngErrors> {
    if data.len() < 8 || data[..8] != PNG_SIGNATURE {
        return Err(PngErrors::BadSignature);
    }

    let mut at = 8usize;
    let mut width = 0usize;
    let mut height = 0usize;
    let mut bpp = 0usize;
    let mut idat: Vec<u8> = Vec::new();

    // a stripped IEND just means we run off the end after the last chunk
    while at + 8 <= data.len() {
        let length = u32::from_be_bytes(data[at..at + 4].try_into().unwrap()) as usize;
        let tag = &data[at + 4..at + 8];
        let body_start = at + 8;
        if body_start + length > data.len() {
            return Err("truncated chunk body".into());
        }
        let body = &data[body_start..body_start + length];

        match tag {
            b"IHDR" => {
                if length != 13 {
                    return Err("bad IHDR length".into());
                }
                width = u32::from_be_bytes(body[0..4].try_into().unwrap()) as usize;
                height = u32::from_be_bytes(body[4..8].try_into().unwrap()) as usize;
                let sample_bits = body[8];
                let color = body[9];
                bpp = match (sample_bits, color) {
                    (1, 0) => 1,
                    (8, 0) => 8,
                    (8, 2) => 24,
                    _ => return Err(PngErrors::Generic(format!(
                        "unsupported depth/color {sample_bits}/{color}"
                    )))
                };
            }
            b"IDAT" => idat.extend_from_slice(body),
            b"IEND" => break,
            _ => {}
        }
        // body + CRC
        at = body_start + length + 4;
    }
    if width == 0 || height == 0 || bpp == 0 {
        return Err("missing IHDR".into());
    }
    if idat.is_empty() {
        return Err("missing IDAT".into());
    }

    let raw = DeflateDecoder::new(&idat).decode_zlib()?;

    let row_payload_bits = width * bpp;
    let row_bytes = (row_payload_bits + 7) / 8;
    if raw.len() < height * (row_bytes + 1) {
        return Err("inflated stream shorter than the image".into());
    }

    let bpp_bytes = (bpp / 8).max(1);
    let mut rows: Vec<Vec<u8>> = Vec::with_capacity(height);
    for y in 0..height {
        let line = &raw[y * (row_bytes + 1)..(y + 1) * (row_bytes + 1)];
        let filter = line[0];
        let mut row = line[1..].to_vec();
        let prev: &[u8] = if y == 0 { &[] } else { &rows[y - 1] };
        unfilter_row(filter, &mut row, prev, bpp_bytes);
        rows.push(row);
    }

    if bit_count > width * height * bpp {
        return Err("bit count exceeds the image area".into());
    }
    let mut bits = BitVec::with_capacity(bit_count);
    'outer: for row in &rows {
        for pos in 0..row_payload_bits {
            if bits.len() == bit_count {
                break 'outer;
            }
            bits.push((row[pos >> 3] >> (7 - (pos & 7))) & 1);
        }
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use ztml_core::bits::BitVec;

    use super::png_to_bits;
    use crate::encoder::{to_png, PngOptions};
    use crate::filters::FilterStrategy;

    fn pseudo_bits(count: usize) -> BitVec {
        // xorshift so the stream is stable across runs
        let mut state = 0x9E3779B9u32;
        (0..count)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state & 1) as u8
            })
            .collect()
    }

    #[test]
    fn roundtrip_every_strategy() {
        let bits = pseudo_bits(700);
        for strategy in FilterStrategy::all() {
            let options = PngOptions::default()
                .set_strategies(&[strategy])
                .set_iterations(2);
            let artifact = to_png(&bits, &options).unwrap();
            let back = png_to_bits(&artifact.data, bits.len()).unwrap();
            assert_eq!(back.to_unpacked(), bits.to_unpacked(), "{strategy:?}");
        }
    }

    #[test]
    fn roundtrip_with_and_without_iend() {
        let bits = pseudo_bits(257);
        for strip in [true, false] {
            let options = PngOptions::default()
                .set_iterations(1)
                .set_strategies(&[FilterStrategy::Fixed(0)])
                .set_strip_iend(strip);
            let artifact = to_png(&bits, &options).unwrap();
            let back = png_to_bits(&artifact.data, bits.len()).unwrap();
            assert_eq!(back.to_unpacked(), bits.to_unpacked(), "strip={strip}");
        }
    }

    #[test]
    fn iend_strip_saves_exactly_twelve_bytes() {
        let bits = pseudo_bits(64);
        let options = PngOptions::default()
            .set_iterations(1)
            .set_strategies(&[FilterStrategy::Fixed(0)]);
        let stripped = to_png(&bits, &options.clone()).unwrap();
        let kept = to_png(&bits, &options.set_strip_iend(false)).unwrap();
        assert_eq!(kept.data.len(), stripped.data.len() + 12);
    }

    #[test]
    fn higher_depths_roundtrip() {
        let bits = pseudo_bits(480);
        for depth in [8u8, 24] {
            let options = PngOptions::default()
                .set_depth(depth)
                .set_iterations(1)
                .set_strategies(&[FilterStrategy::MinSum]);
            let artifact = to_png(&bits, &options).unwrap();
            let back = png_to_bits(&artifact.data, bits.len()).unwrap();
            assert_eq!(back.to_unpacked(), bits.to_unpacked(), "depth {depth}");
        }
    }

    #[test]
    fn single_bit_image() {
        let bits: BitVec = std::iter::once(1u8).collect();
        let options = PngOptions::default().set_iterations(1);
        let artifact = to_png(&bits, &options).unwrap();
        assert_eq!((artifact.width, artifact.height), (1, 1));
        let back = png_to_bits(&artifact.data, 1).unwrap();
        assert_eq!(back.to_unpacked(), vec![1]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(png_to_bits(b"not a png at all", 0).is_err());
    }
}
