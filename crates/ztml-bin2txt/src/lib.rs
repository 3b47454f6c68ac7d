/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Binary-to-text codecs targeting JS template literals
//!
//! Three codecs, one contract: encode bytes into something that survives
//! verbatim between backticks in an HTML document, and emit the matching
//! decoder fragment. Base64 is the baseline, Base125 the UTF-8-safe
//! option, crEnc the near-1:1 option for cp1252 documents.
//!
//! Every codec supports a global modular byte offset; [`resolve_offset`]
//! turns [`OffsetMode`] into a concrete `(encoded, offset)` pair, sweeping
//! all 256 candidates when asked for the optimum.

use ztml_core::options::OffsetMode;

pub mod base125;
pub mod base64;
pub mod crenc;

/// Try every offset, keep the shortest output; ties break to the smallest
/// offset so the sweep is deterministic.
pub(crate) fn sweep(
    data: &[u8], encode: impl Fn(&[u8], u8) -> Vec<u8>
) -> (Vec<u8>, u8, usize) {
    let mut best_offset = 0u8;
    let mut best_len = usize::MAX;
    let mut zero_len = 0usize;

    for offset in 0..=255u8 {
        let length = encode(data, offset).len();
        if offset == 0 {
            zero_len = length;
        }
        if length < best_len {
            best_len = length;
            best_offset = offset;
        }
    }
    log::trace!("offset sweep: {best_offset} saves {} B", zero_len - best_len);
    (encode(data, best_offset), best_offset, zero_len - best_len)
}

/// Apply an [`OffsetMode`] for the given codec `encode`/`optimize` pair.
pub fn resolve_offset(
    data: &[u8], mode: OffsetMode, encode: impl Fn(&[u8], u8) -> Vec<u8>,
    optimize: impl Fn(&[u8]) -> (Vec<u8>, u8, usize)
) -> (Vec<u8>, u8) {
    match mode {
        OffsetMode::Fixed(offset) => (encode(data, offset), offset),
        OffsetMode::SweepOptimal => {
            let (encoded, offset, _) = optimize(data);
            (encoded, offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use ztml_core::options::OffsetMode;

    use super::*;

    #[test]
    fn roundtrip_grid_over_codecs_and_offsets() {
        let payloads: [&[u8]; 4] = [
            b"",
            b"hello world",
            &[0, 13, 92, 96, 36, 123, 255, 128],
            b"\r\r\r\\\\``${${"
        ];
        for payload in payloads {
            for offset in [0u8, 1, 7, 13, 92, 200, 255] {
                let b125 = base125::encode(payload, offset);
                assert_eq!(base125::decode(&b125, offset), payload, "base125 {offset}");
                let cr = crenc::encode(payload, offset);
                assert_eq!(crenc::decode(&cr, offset), payload, "crenc {offset}");
            }
            let b64 = base64::encode(payload);
            assert_eq!(base64::decode(&b64).unwrap(), payload);
        }
    }

    #[test]
    fn sweep_is_never_worse_than_offset_zero() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(700).collect();
        let (best, _, _) = base125::optimize_encode(&payload);
        assert!(best.len() <= base125::encode(&payload, 0).len());
        let (best, _, _) = crenc::optimize_encode(&payload);
        assert!(best.len() <= crenc::encode(&payload, 0).len());
    }

    #[test]
    fn resolve_offset_fixed_and_sweep() {
        let data = vec![b'\r'; 32];
        let (fixed, offset) =
            resolve_offset(&data, OffsetMode::Fixed(0), crenc::encode, crenc::optimize_encode);
        assert_eq!(offset, 0);
        assert_eq!(fixed.len(), 64);
        let (swept, offset) = resolve_offset(
            &data,
            OffsetMode::SweepOptimal,
            crenc::encode,
            crenc::optimize_encode
        );
        assert_eq!(swept.len(), 32);
        assert!(offset != 0);
    }
}
