//! Benchmarks for artwork candidate ranking
//!
//! Tests performance of deduplicating and ordering artwork gathered from
//! every source for one name search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use romlookup::artwork::{dedup_urls, rank_artwork};
use romlookup_common::{ArtworkMetadata, ArtworkType, SourceKind, SystemIdentifier};

/// `count` entries cycling through every type and source, with roughly one
/// duplicate in four.
fn candidates(count: usize) -> Vec<ArtworkMetadata> {
    (0..count)
        .map(|i| {
            let id = if i % 4 == 3 { i - 1 } else { i };
            ArtworkMetadata {
                url: format!("https://cdn.thegamesdb.net/images/original/boxart/front/{id}-1.jpg"),
                artwork_type: ArtworkType::ALL[id % ArtworkType::ALL.len()],
                resolution: None,
                source: Some(SourceKind::ALL[i % SourceKind::ALL.len()]),
                system: SystemIdentifier::SNES,
            }
        })
        .collect()
}

fn bench_rank_artwork(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_artwork");

    for size in [10, 100, 1000] {
        let input = candidates(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| rank_artwork(black_box(input.clone())))
        });
    }

    group.finish();
}

fn bench_dedup_urls(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedup_urls");

    for size in [10, 100, 1000] {
        let urls: Vec<String> = candidates(size).into_iter().map(|a| a.url).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &urls, |b, urls| {
            b.iter(|| dedup_urls(black_box(urls.clone())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank_artwork, bench_dedup_urls);
criterion_main!(benches);
