/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Reference vectors and exhaustive small-input grids for the transforms.

use ztml_core::options::MtfPolicy;

const POLICIES: [Option<MtfPolicy>; 10] = [
    None,
    Some(MtfPolicy::MoveToFront),
    Some(MtfPolicy::StickyFront),
    Some(MtfPolicy::StickySplit),
    Some(MtfPolicy::HalfJump),
    Some(MtfPolicy::HalfSticky),
    Some(MtfPolicy::Scaled60),
    Some(MtfPolicy::Scaled70),
    Some(MtfPolicy::Scaled80),
    Some(MtfPolicy::Scaled90)
];

fn codepoints(text: &str) -> Vec<u32> {
    text.chars().map(u32::from).collect()
}

fn to_string(points: &[u32]) -> String {
    points
        .iter()
        .map(|&point| char::from_u32(point).unwrap())
        .collect()
}

#[test]
fn mississippi_reference() {
    // the textbook vector: BWT clusters the repeated letters
    let data = codepoints("mississippi");
    let (trans, index) = ztml_bwt::encode(&data, None);
    assert_eq!(to_string(&trans), "ipssmpissii");
    assert_eq!(ztml_bwt::decode(&trans, index, None), data);
}

#[test]
fn exhaustive_ternary_grid() {
    // every sequence over a 3 symbol alphabet up to length 5, every policy
    for length in 0..=5usize {
        for mut stamp in 0..3usize.pow(length as u32) {
            let mut data = Vec::with_capacity(length);
            for _ in 0..length {
                data.push((stamp % 3) as u32);
                stamp /= 3;
            }
            for policy in POLICIES {
                let (trans, index) = ztml_bwt::encode(&data, policy);
                assert_eq!(
                    ztml_bwt::decode(&trans, index, policy),
                    data,
                    "data {data:?} policy {policy:?}"
                );
            }
        }
    }
}

#[test]
fn run_heavy_input_stays_run_heavy() {
    // BWT should not scatter an all-runs input, that is its whole point
    let data: Vec<u32> = std::iter::repeat(7u32)
        .take(100)
        .chain(std::iter::repeat(3).take(100))
        .collect();
    let (trans, index) = ztml_bwt::encode(&data, Some(MtfPolicy::MoveToFront));
    let zeros = trans.iter().filter(|&&rank| rank == 0).count();
    assert!(zeros > 190, "only {zeros} zero ranks after bwt+mtf");
    assert_eq!(
        ztml_bwt::decode(&trans, index, Some(MtfPolicy::MoveToFront)),
        data
    );
}

#[test]
fn large_text_round_trip() {
    let text = "the quick brown fox jumps over the lazy dog, and then does it again "
        .repeat(64);
    let data = codepoints(&text);
    for policy in [None, Some(MtfPolicy::Scaled80)] {
        let (trans, index) = ztml_bwt::encode(&data, policy);
        assert_eq!(ztml_bwt::decode(&trans, index, policy), data);
    }
}
