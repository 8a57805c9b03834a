//! Sqlite store benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use stint_bench::{new_session, replica};
use stint_store::Database;
use stint_sync_protocol::{Change, Changeset};

/// Open an in-memory store holding `count` sessions of one frame each.
fn populated(count: usize) -> Database {
    let db = Database::open_in_memory().unwrap();
    for i in 0..count {
        db.add_session(new_session(i)).unwrap();
    }
    db
}

/// Benchmark adding one session (with its frame) to an in-memory store.
fn bench_add_session(c: &mut Criterion) {
    c.bench_function("add_session", |b| {
        let db = Database::open_in_memory().unwrap();
        let mut i = 0;

        b.iter(|| {
            let id = db.add_session(black_box(new_session(i))).unwrap();
            i += 1;
            black_box(id);
        });
    });
}

/// Benchmark adding one session to a file-backed store, fsync included.
fn bench_add_session_on_disk(c: &mut Criterion) {
    c.bench_function("add_session_on_disk", |b| {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("bench.db")).unwrap();
        let mut i = 0;

        b.iter(|| {
            let id = db.add_session(black_box(new_session(i))).unwrap();
            i += 1;
            black_box(id);
        });
    });
}

/// Benchmark reading one random session out of a populated store.
fn bench_get_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_session");

    for count in [100, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let db = Database::open_in_memory().unwrap();
            let mut ids = Vec::with_capacity(count);
            for i in 0..count {
                ids.push(db.add_session(new_session(i)).unwrap());
            }
            let mut rng = rand::thread_rng();

            b.iter(|| {
                let idx = rng.gen_range(0..ids.len());
                let session = db.get_session(black_box(&ids[idx])).unwrap();
                black_box(session);
            });
        });
    }
    group.finish();
}

/// Benchmark exporting the full snapshot.
fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let db = populated(count);

            b.iter(|| {
                let snapshot = db.export().unwrap();
                black_box(snapshot);
            });
        });
    }
    group.finish();
}

/// Benchmark applying a changeset of upserts in one transaction.
fn bench_import_changes(c: &mut Criterion) {
    let mut group = c.benchmark_group("import_changes");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let db = Database::open_in_memory().unwrap();
            let snapshot = replica(count);
            let changes = Changeset {
                sessions: snapshot.sessions.into_iter().map(Change::exist).collect(),
                timeframes: snapshot
                    .timeframes
                    .into_iter()
                    .map(Change::exist)
                    .collect(),
                tasks: Vec::new(),
            };

            // Upserts are idempotent, so repeated iterations hit the
            // same rows instead of growing the store.
            b.iter(|| {
                db.import_changes(black_box(&changes)).unwrap();
            });
        });
    }
    group.finish();
}

/// Benchmark replacing the whole store with a snapshot.
fn bench_replace_and_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("replace_and_import");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let db = populated(count);
            let snapshot = replica(count);
            let changes = Changeset::default();

            b.iter(|| {
                db.replace_and_import(black_box(&snapshot), black_box(&changes))
                    .unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_add_session,
    bench_add_session_on_disk,
    bench_get_session,
    bench_export,
    bench_import_changes,
    bench_replace_and_import,
);

criterion_main!(benches);
