//! Three-way merge benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stint_bench::replica;
use stint_sync_protocol::{merge, MergeOptions, Snapshot};

/// Benchmark merging three identical replicas (the no-op round).
fn bench_merge_identical(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_identical");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let original = replica(count);
            let local = original.clone();
            let remote = original.clone();

            b.iter(|| {
                let result = merge(
                    black_box(&original),
                    black_box(&local),
                    black_box(&remote),
                    MergeOptions::default(),
                );
                black_box(result);
            });
        });
    }
    group.finish();
}

/// Benchmark merging non-overlapping edits on both sides.
fn bench_merge_disjoint_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_disjoint_edits");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let original = replica(count);
            let mut local = original.clone();
            let mut remote = original.clone();
            for session in local.sessions.iter_mut().take(count / 2) {
                session.notes = "edited locally".into();
            }
            for session in remote.sessions.iter_mut().skip(count / 2) {
                session.notes = "edited remotely".into();
            }

            b.iter(|| {
                let result = merge(
                    black_box(&original),
                    black_box(&local),
                    black_box(&remote),
                    MergeOptions::default(),
                );
                black_box(result);
            });
        });
    }
    group.finish();
}

/// Benchmark the worst case: every record edited differently on both
/// sides, so every record conflicts.
fn bench_merge_all_conflicting(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_all_conflicting");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let original = replica(count);
            let mut local = original.clone();
            let mut remote = original.clone();
            for session in local.sessions.iter_mut() {
                session.notes = "local side".into();
            }
            for session in remote.sessions.iter_mut() {
                session.notes = "remote side".into();
            }

            b.iter(|| {
                let result = merge(
                    black_box(&original),
                    black_box(&local),
                    black_box(&remote),
                    MergeOptions::default(),
                );
                black_box(result);
            });
        });
    }
    group.finish();
}

/// Benchmark deletion propagation: half of the records removed locally.
fn bench_merge_deletions(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_deletions");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let original = replica(count);
            let mut local = original.clone();
            local.sessions.truncate(count / 2);
            local.timeframes.truncate(count / 2);
            let remote = original.clone();

            b.iter(|| {
                let result = merge(
                    black_box(&original),
                    black_box(&local),
                    black_box(&remote),
                    MergeOptions::default(),
                );
                black_box(result);
            });
        });
    }
    group.finish();
}

/// Benchmark the first-sync shape: no recorded baseline, so the remote
/// snapshot stands in for it and the merge runs additively.
fn bench_merge_first_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_first_sync");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let local = replica(count);
            let remote = {
                let mut other = replica(count);
                // Shift remote IDs so the two replicas share nothing.
                for session in other.sessions.iter_mut() {
                    session.id = format!("r-{}", session.id);
                }
                for frame in other.timeframes.iter_mut() {
                    frame.id = format!("r-{}", frame.id);
                    frame.session_id = format!("r-{}", frame.session_id);
                }
                other
            };

            b.iter(|| {
                let result = merge(
                    black_box(&remote),
                    black_box(&local),
                    black_box(&remote),
                    MergeOptions::additive(),
                );
                black_box(result);
            });
        });
    }
    group.finish();
}

/// Benchmark merging an empty round (all three snapshots empty).
fn bench_merge_empty(c: &mut Criterion) {
    c.bench_function("merge_empty", |b| {
        let empty = Snapshot::default();

        b.iter(|| {
            let result = merge(
                black_box(&empty),
                black_box(&empty),
                black_box(&empty),
                MergeOptions::default(),
            );
            black_box(result);
        });
    });
}

criterion_group!(
    benches,
    bench_merge_identical,
    bench_merge_disjoint_edits,
    bench_merge_all_conflicting,
    bench_merge_deletions,
    bench_merge_first_sync,
    bench_merge_empty,
);

criterion_main!(benches);
