//! Benchmarks for the hit/miss/eviction paths of `BufferPoolManager`.

use std::sync::Arc;

use clockpool::storage::{DiskManager, PageFile};
use clockpool::BufferPoolManager;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use tempfile::tempdir;

fn make_file() -> (Arc<dyn PageFile>, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bench.db");
    let dm = DiskManager::create(&path).unwrap();
    (Arc::new(dm), dir)
}

fn bench_alloc_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_page");
    group.throughput(Throughput::Elements(1));

    group.bench_function("fresh_frame", |b| {
        b.iter_batched(
            || {
                let (file, dir) = make_file();
                (BufferPoolManager::new(256), file, dir)
            },
            |(bpm, file, _dir)| {
                let (_page_no, guard) = bpm.alloc_page(&file).unwrap();
                black_box(guard);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_read_page_hit(c: &mut Criterion) {
    let (file, _dir) = make_file();
    let bpm = BufferPoolManager::new(64);
    let (page_no, guard) = bpm.alloc_page(&file).unwrap();
    drop(guard);
    bpm.unpin_page(&file, page_no, false).unwrap();

    let mut group = c.benchmark_group("read_page");
    group.throughput(Throughput::Elements(1));
    group.bench_function("directory_hit", |b| {
        b.iter(|| {
            let guard = bpm.read_page(&file, page_no).unwrap();
            black_box(guard.as_slice()[0]);
        });
    });
    group.finish();
}

fn bench_clock_eviction(c: &mut Criterion) {
    let mut group = c.benchmark_group("clock_eviction");
    group.throughput(Throughput::Elements(1));

    group.bench_function("evict_and_reload", |b| {
        b.iter_batched(
            || {
                let (file, dir) = make_file();
                let bpm = BufferPoolManager::new(4);
                for _ in 0..4 {
                    let (page_no, guard) = bpm.alloc_page(&file).unwrap();
                    drop(guard);
                    bpm.unpin_page(&file, page_no, false).unwrap();
                }
                (bpm, file, dir)
            },
            |(bpm, file, _dir)| {
                let (_page_no, guard) = bpm.alloc_page(&file).unwrap();
                black_box(guard);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_alloc_page,
    bench_read_page_hit,
    bench_clock_eviction
);
criterion_main!(benches);
