use criterion::{black_box, criterion_group, criterion_main, Criterion};
use index::{FlatIpIndex, VectorIndex};

fn synthetic(rows: usize, dim: usize) -> VectorIndex {
    let data: Vec<f32> = (0..rows * dim)
        .map(|i| ((i * 2654435761) % 1000) as f32 / 1000.0 - 0.5)
        .collect();
    let flat = FlatIpIndex::new(dim, data).expect("valid shape");
    VectorIndex::new(flat, (0..rows as i64).collect()).expect("equal lengths")
}

fn bench_flat_search(c: &mut Criterion) {
    let query: Vec<f32> = (0..896).map(|i| (i as f32 * 0.01).sin()).collect();

    let small = synthetic(3_000, 896);
    c.bench_function("flat_search_3k_k100", |b| {
        b.iter(|| small.search(black_box(&query), black_box(100)).expect("search"))
    });

    let large = synthetic(20_000, 896);
    c.bench_function("flat_search_20k_parallel_k100", |b| {
        b.iter(|| large.search(black_box(&query), black_box(100)).expect("search"))
    });
}

criterion_group!(benches, bench_flat_search);
criterion_main!(benches);
