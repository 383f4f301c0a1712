//! Read/write path benchmarks for localstore-core
//!
//! Measures:
//! - Cached reads (the hot path)
//! - First reads that fall through to SQLite
//! - set() enqueue cost
//!
//! Run with:
//! ```bash
//! cargo bench --bench resolve_bench
//! ```

use criterion::{criterion_group, criterion_main, Criterion};
use localstore_core::{Configuration, LocalStore, MemoryKv, SqliteKv};
use std::hint::black_box;

fn config() -> Configuration {
    (0..64).fold(Configuration::new("en"), |config, i| {
        config.with(format!("key_{}", i), i)
    })
}

fn bench_cached_get(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _guard = rt.enter();
    let store = LocalStore::initialize(config(), MemoryKv::new(), &false).unwrap();
    store.get("language");

    c.bench_function("get_cached", |b| {
        b.iter(|| black_box(store.get(black_box("language"))))
    });
}

fn bench_uncached_get_sqlite(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _guard = rt.enter();

    c.bench_function("get_first_read_sqlite", |b| {
        b.iter_batched(
            || {
                LocalStore::initialize(config(), SqliteKv::open_in_memory().unwrap(), &false)
                    .unwrap()
            },
            |store| black_box(store.get("key_42")),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn bench_set(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let _guard = rt.enter();
    let store = LocalStore::initialize(config(), MemoryKv::new(), &false).unwrap();

    c.bench_function("set_enqueue", |b| {
        b.iter(|| store.set(black_box("language"), black_box("fr")))
    });

    rt.block_on(store.flush()).unwrap();
}

criterion_group!(benches, bench_cached_get, bench_uncached_get_sqlite, bench_set);
criterion_main!(benches);
