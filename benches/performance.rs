// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for the composer
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Procedural generation per genre and length
//! - SMF encoding and decoding
//! - Tokenization and one training step of the model

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use genre_composer::engine::CompositionEngine;
use genre_composer::genres::GenreRegistry;
use genre_composer::midi::{MidiDecoder, MidiEncoder, SmfDecoder, SmfEncoder};
use genre_composer::neural::{Hyperparameters, NeuralModel, Vocabulary};

fn bench_generation(c: &mut Criterion) {
    let registry = GenreRegistry::builtin();
    let engine = CompositionEngine::default();
    let mut group = c.benchmark_group("generate");

    for genre in ["pop", "reggaeton", "bebop"] {
        for bars in [8i64, 32] {
            let profile = registry.get(genre).expect("builtin genre");
            group.bench_with_input(BenchmarkId::new(genre, bars), &bars, |b, &bars| {
                b.iter(|| black_box(engine.generate(profile, bars, Some(42)).expect("generate")))
            });
        }
    }
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let registry = GenreRegistry::builtin();
    let composition = CompositionEngine::default()
        .generate(registry.get("funk").expect("builtin genre"), 32, Some(1))
        .expect("generate");
    let encoder = SmfEncoder::new();
    let bytes = encoder.encode(&composition).expect("encode");
    let decoder = SmfDecoder::new(composition.ppqn);

    c.bench_function("smf_encode_32_bars", |b| {
        b.iter(|| black_box(encoder.encode(black_box(&composition)).expect("encode")))
    });
    c.bench_function("smf_decode_32_bars", |b| {
        b.iter(|| black_box(decoder.decode_bytes(black_box(&bytes)).expect("decode")))
    });
}

fn bench_model(c: &mut Criterion) {
    let registry = GenreRegistry::builtin();
    let vocab = Vocabulary::default();
    let composition = CompositionEngine::default()
        .generate(registry.get("bebop").expect("builtin genre"), 8, Some(3))
        .expect("generate");
    let sequences: Vec<_> = composition
        .tracks
        .iter()
        .filter(|t| !t.kind.is_percussive())
        .map(|t| vocab.encode_notes(&t.notes))
        .collect();

    c.bench_function("tokenize_track", |b| {
        b.iter(|| black_box(vocab.encode_notes(black_box(&composition.tracks[0].notes))))
    });

    c.bench_function("train_one_epoch", |b| {
        b.iter_batched(
            || NeuralModel::new(vocab, Hyperparameters::default()),
            |mut model| black_box(model.train(&sequences, 1).expect("train")),
            criterion::BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_generation, bench_codec, bench_model);
criterion_main!(benches);
