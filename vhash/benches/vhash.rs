//! VHASH benchmarks.

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vhash::{Vhash, DEFAULT_KEY};

fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("vhash");
    let vhash = Vhash::new(&DEFAULT_KEY.into());

    for size in &[10, 100, 1000, 10000] {
        let buf = vec![0u8; *size];

        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_function(BenchmarkId::new("hash", size), |b| {
            b.iter(|| vhash.hash(&buf, 0u64));
        });
    }

    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
