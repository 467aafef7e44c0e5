use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scout_features::{ChunkSampler, FeatureBuilder, WINDOW_SIZE};

fn generate_file(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| ((i.wrapping_mul(31).wrapping_add(i >> 7)) % 96 + 32) as u8)
        .collect()
}

fn bench_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_windows");
    let sampler = ChunkSampler::new();

    // Sampled I/O stays at three windows however large the file is
    for size in [4 * 1024, 1024 * 1024, 16 * 1024 * 1024] {
        let data = generate_file(size);
        group.throughput(Throughput::Bytes((3 * WINDOW_SIZE).min(size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let mut reader = Cursor::new(data.as_slice());
                sampler
                    .sample(black_box(&mut reader), data.len() as u64)
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_feature_vector(c: &mut Criterion) {
    let builder = FeatureBuilder::standard();
    let data = generate_file(8 * 1024 * 1024);

    c.bench_function("feature_vector_8mb", |b| {
        b.iter(|| {
            let mut reader = Cursor::new(data.as_slice());
            builder
                .build_from_reader(black_box("webster"), data.len() as u64, &mut reader)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_sampling, bench_feature_vector);
criterion_main!(benches);
