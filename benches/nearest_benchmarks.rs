//! Benchmarks for symbol normalization and nearest-symbol resolution.
//!
//! Cold lookups pay for a similarity search over the whole inventory; warm
//! lookups hit the resolution cache.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use allophony::prelude::*;

const PHONEMES: [&str; 24] = [
    "p", "b", "t", "d", "k", "ɡ", "m", "n", "ŋ", "f", "v", "s", "z", "ʃ", "l", "ɹ", "j", "w", "i",
    "ɪ", "ɛ", "æ", "ɑ", "u",
];

const QUERIES: [&str; 6] = ["x", "ɣ", "ʂ", "ɨ", "y", "ɕ"];

fn inventory() -> Inventory {
    Inventory::from_phonemes("bench", PHONEMES, FeatureTable::shared())
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature/normalize");
    let table = FeatureTable::shared();

    for symbol in ["a", "kʰ", "ʰkʷ", "t\u{0303}ː", "e\u{0301}"] {
        group.bench_with_input(BenchmarkId::from_parameter(symbol), symbol, |b, s| {
            b.iter(|| table.normalize(black_box(s)).ok());
        });
    }

    group.finish();
}

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature/tokenize");
    let table = FeatureTable::shared();

    for text in ["kʰæt", "ðəkwɪkbɹaʊnfɑks", "ʔɓaːn˧˧ tʰɯə˨˩"] {
        group.bench_with_input(BenchmarkId::from_parameter(text), text, |b, t| {
            b.iter(|| table.tokenize(black_box(t)));
        });
    }

    group.finish();
}

fn bench_nearest_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory/nearest_cold");

    for symbol in QUERIES {
        group.bench_with_input(BenchmarkId::from_parameter(symbol), symbol, |b, s| {
            // a fresh inventory per batch so every lookup searches
            b.iter_batched(
                inventory,
                |inv| inv.nearest_phoneme(black_box(s)),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_nearest_warm(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory/nearest_warm");
    let inv = inventory();
    for symbol in QUERIES {
        inv.nearest_phoneme(symbol);
    }

    for symbol in QUERIES {
        group.bench_with_input(BenchmarkId::from_parameter(symbol), symbol, |b, s| {
            b.iter(|| inv.nearest_phoneme(black_box(s)));
        });
    }

    group.finish();
}

fn bench_most_similar(c: &mut Criterion) {
    let table = FeatureTable::shared();
    let engine = SimilarityEngine::new(&table);

    c.bench_function("similarity/most_similar", |b| {
        b.iter(|| {
            for q in QUERIES {
                black_box(engine.most_similar(black_box(q), &PHONEMES));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_normalize,
    bench_tokenize,
    bench_nearest_cold,
    bench_nearest_warm,
    bench_most_similar,
);

criterion_main!(benches);
