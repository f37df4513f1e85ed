//! Harness overhead: workload generation, key rendering and stats parsing.
//!
//! These run inside or next to every timed phase, so they bound how much of
//! a phase's figure is the harness rather than the engine.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kv_sweep::stats::{parse_level_sizes, render_leveldb_table, StatsLayout};
use kv_sweep::workload::{workload, write_key, write_value, Ordering};

fn workload_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("workload");
    for num in [10_000usize, 1_000_000] {
        group.throughput(Throughput::Elements(num as u64));
        group.bench_with_input(BenchmarkId::new("sequential", num), &num, |b, &num| {
            b.iter(|| workload(black_box(num), Ordering::Sequential));
        });
        group.bench_with_input(BenchmarkId::new("random", num), &num, |b, &num| {
            b.iter(|| workload(black_box(num), Ordering::Random));
        });
    }
    group.finish();
}

fn key_value_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.throughput(Throughput::Elements(1));
    for size in [64usize, 4096, 262_144] {
        let mut key = String::new();
        let mut value = String::new();
        group.bench_with_input(BenchmarkId::new("pair", size), &size, |b, &size| {
            let mut id = 0usize;
            b.iter(|| {
                write_key(&mut key, id);
                write_value(&mut value, id, size);
                id += 1;
                black_box((&key, &value));
            });
        });
    }
    group.finish();
}

fn stats_parsing(c: &mut Criterion) {
    let levels: Vec<(usize, usize, u64)> = (0..7).map(|l| (l, l * 10, (l as u64) << 8)).collect();
    let text = render_leveldb_table(&levels);
    c.bench_function("stats/leveldb", |b| {
        b.iter(|| parse_level_sizes(black_box(&text), StatsLayout::LEVELDB).unwrap());
    });
}

criterion_group!(benches, workload_generation, key_value_rendering, stats_parsing);
criterion_main!(benches);
