//! Pool allocator benchmarks.
//!
//! Workload sizes mirror what the pool was built for: small fixed
//! records, a table of them, and a spill just past two pages. The system
//! allocator runs the same steady-state pattern as a baseline.

use std::alloc::{alloc, dealloc, Layout};

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use pagepool::PagePool;

const SMALL: usize = 24;
const BIG: usize = 240;
const HUGE: usize = 2 * 4096 + 113;
const BATCH: usize = 1_000;

fn steady_state(c: &mut Criterion) {
    let mut group = c.benchmark_group("steady_alloc_free");

    // In-page sizes only: a spill-sized round trip leaves its emptied
    // chunk at the head of the current list, so it would pin one block
    // per iteration.
    for (name, size) in [("small", SMALL), ("big", BIG)] {
        group.bench_function(name, |b| {
            let mut pool = PagePool::with_capacity(0).unwrap();
            b.iter(|| {
                let p = pool.alloc(black_box(size)).unwrap();
                unsafe { pool.free(p, size) };
            });
        });
    }

    group.bench_function("small_system", |b| {
        let layout = Layout::from_size_align(SMALL, 8).unwrap();
        b.iter(|| unsafe {
            let p = alloc(layout);
            black_box(p);
            dealloc(p, layout);
        });
    });

    group.finish();
}

fn fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");

    for (name, size) in [("small", SMALL), ("big", BIG), ("huge", HUGE)] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || PagePool::with_capacity(0).unwrap(),
                |mut pool| {
                    for _ in 0..BATCH {
                        let p = pool.alloc(black_box(size)).unwrap();
                        unsafe { p.as_ptr().write_bytes(1, size) };
                    }
                    pool
                },
                BatchSize::SmallInput,
            );
        });
    }

    // Every fourth allocation handed straight back, the trailing-reclaim
    // hot case.
    group.bench_function("small_with_free", |b| {
        b.iter_batched(
            || PagePool::with_capacity(0).unwrap(),
            |mut pool| {
                for i in 0..BATCH {
                    let p = pool.alloc(black_box(SMALL)).unwrap();
                    unsafe { p.as_ptr().write_bytes(1, SMALL) };
                    if i & 3 == 0 {
                        unsafe { pool.free(p, SMALL) };
                    }
                }
                pool
            },
            BatchSize::SmallInput,
        );
    });

    // Every fourth allocation is a table, the rest are records.
    group.bench_function("mix", |b| {
        b.iter_batched(
            || PagePool::with_capacity(0).unwrap(),
            |mut pool| {
                for i in 0..BATCH {
                    let size = if i & 3 == 0 { BIG } else { SMALL };
                    let p = pool.alloc(black_box(size)).unwrap();
                    unsafe { p.as_ptr().write_bytes(1, size) };
                }
                pool
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, steady_state, fill);
criterion_main!(benches);
