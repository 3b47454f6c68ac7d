/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

/// English-shaped symbol stream without shipping a corpus: a Zipf-ish
/// draw over a small alphabet.
fn synthetic_symbols(count: usize) -> Vec<u32> {
    let alphabet: Vec<u32> = " etaoinshrdlucmfwypvbgkjqxz.,\n"
        .chars()
        .map(u32::from)
        .collect();
    let mut state = 0x2545F491u64;
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            // bias toward the head of the alphabet
            let draw = (state % 1000) as usize;
            let at = (draw * draw) / (1000 * 1000 / alphabet.len());
            alphabet[at.min(alphabet.len() - 1)]
        })
        .collect()
}

fn encode_bench(c: &mut Criterion) {
    let data = synthetic_symbols(1 << 18);

    let mut group = c.benchmark_group("huffman");
    group.throughput(Throughput::Elements(data.len() as u64));

    group.bench_function("encode", |b| {
        b.iter(|| {
            let encoded = ztml_huffman::encode(black_box(&data));
            black_box(encoded.bits.len())
        })
    });

    let encoded = ztml_huffman::encode(&data);
    group.bench_function("decode", |b| {
        b.iter(|| {
            let decoded =
                ztml_huffman::decode(&encoded.bits, &encoded.charset, &encoded.table);
            black_box(decoded.len())
        })
    });
    group.finish();
}

criterion_group!(benches, encode_bench);
criterion_main!(benches);
