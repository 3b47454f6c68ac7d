/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The full offset grid: `decode(encode(p, b), b) == p` for every byte
//! offset, and the sweep never losing to offset zero.

fn payloads() -> Vec<Vec<u8>> {
    let mut state = 0x12345678u32;
    let mut random = |count: usize| -> Vec<u8> {
        (0..count)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect()
    };
    vec![
        Vec::new(),
        b"hello world".to_vec(),
        vec![0u8; 64],
        vec![13u8; 64],
        (0..=255u8).collect(),
        random(513)
    ]
}

#[test]
fn base125_full_offset_grid() {
    for payload in payloads() {
        for offset in 0..=255u8 {
            let encoded = ztml_bin2txt::base125::encode(&payload, offset);
            assert_eq!(
                ztml_bin2txt::base125::decode(&encoded, offset),
                payload,
                "offset {offset}"
            );
        }
    }
}

#[test]
fn crenc_full_offset_grid() {
    for payload in payloads() {
        for offset in 0..=255u8 {
            let encoded = ztml_bin2txt::crenc::encode(&payload, offset);
            assert_eq!(
                ztml_bin2txt::crenc::decode(&encoded, offset),
                payload,
                "offset {offset}"
            );
        }
    }
}

#[test]
fn sweeps_hold_the_optimality_property() {
    for payload in payloads() {
        let (best, offset, saved) = ztml_bin2txt::base125::optimize_encode(&payload);
        let zero = ztml_bin2txt::base125::encode(&payload, 0);
        assert!(best.len() <= zero.len());
        assert_eq!(best.len() + saved, zero.len());
        assert_eq!(ztml_bin2txt::base125::decode(&best, offset), payload);

        let (best, offset, saved) = ztml_bin2txt::crenc::optimize_encode(&payload);
        let zero = ztml_bin2txt::crenc::encode(&payload, 0);
        assert!(best.len() <= zero.len());
        assert_eq!(best.len() + saved, zero.len());
        assert_eq!(ztml_bin2txt::crenc::decode(&best, offset), payload);
    }
}

#[test]
fn base125_overhead_is_near_the_design_figure() {
    // ~14.7% on uniform bytes
    let payload: Vec<u8> = (0..=255u8).cycle().take(1 << 14).collect();
    let encoded = ztml_bin2txt::base125::encode(&payload, 0);
    let overhead = encoded.len() as f64 / payload.len() as f64 - 1.0;
    assert!(overhead > 0.10 && overhead < 0.20, "overhead {overhead:.3}");
}

#[test]
fn crenc_overhead_is_tiny() {
    let payload: Vec<u8> = (0..=255u8).cycle().take(1 << 14).collect();
    let encoded = ztml_bin2txt::crenc::encode(&payload, 0);
    let overhead = encoded.len() as f64 / payload.len() as f64 - 1.0;
    assert!(overhead < 0.03, "overhead {overhead:.3}");
}
