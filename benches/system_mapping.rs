//! Benchmarks for system identification
//!
//! Vendor id translation runs once per decoded row, and extension and
//! title parsing once per file name query.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use romlookup_common::paths::{base_title, system_for_extension};
use romlookup_common::systems::{forward, forward_numeric, reverse, vendor_ids, VendorId};
use romlookup_common::{SourceKind, SystemIdentifier};
use std::path::Path;

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward");

    group.bench_function("numeric/hit", |b| {
        b.iter(|| forward_numeric(black_box(SourceKind::OpenVgdb), black_box(26)))
    });

    group.bench_function("numeric/miss", |b| {
        b.iter(|| forward_numeric(black_box(SourceKind::OpenVgdb), black_box(9999)))
    });

    let text = VendorId::Text("NINTENDO_SNES".to_string());
    group.bench_function("text/hit", |b| {
        b.iter(|| forward(black_box(SourceKind::ShiraGame), black_box(&text)))
    });

    group.finish();
}

fn bench_reverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("reverse");

    group.bench_function("all_sources/all_systems", |b| {
        b.iter(|| {
            let mut found = 0usize;
            for source in SourceKind::ALL {
                for system in SystemIdentifier::ALL {
                    if reverse(*source, *system).is_some() {
                        found += 1;
                    }
                }
            }
            black_box(found)
        })
    });

    group.bench_function("vendor_ids/genesis", |b| {
        b.iter(|| vendor_ids(black_box(SourceKind::TheGamesDb), SystemIdentifier::Genesis))
    });

    group.finish();
}

fn bench_file_names(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_names");

    let names = [
        "Pitfall - The Mayan Adventure (USA).sfc",
        "/roms/genesis/Sonic The Hedgehog (USA, Europe) [!].md",
        "Final Fantasy VII (Disc 1).chd",
        "no_extension",
    ];

    group.bench_function("system_for_extension", |b| {
        b.iter(|| {
            for name in &names {
                black_box(system_for_extension(Path::new(black_box(name))));
            }
        })
    });

    group.bench_function("base_title", |b| {
        b.iter(|| {
            for name in &names {
                black_box(base_title(black_box(name)));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_forward, bench_reverse, bench_file_names);
criterion_main!(benches);
