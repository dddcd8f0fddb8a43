use batched_bloom_rs::{BatchedBloomFilter, FilterConfigBuilder};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, distr::Alphanumeric};
use std::hint::black_box;

// Helper function to generate random string data
fn generate_random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn generate_test_data(count: usize) -> Vec<String> {
    (0..count).map(|_| generate_random_string(32)).collect()
}

fn create_filter(capacity: usize, batch_size: usize) -> BatchedBloomFilter {
    let config = FilterConfigBuilder::default()
        .capacity(capacity)
        .false_positive_rate(0.01)
        .queue_capacity(capacity)
        .batch_size(batch_size)
        .build()
        .expect("Failed to build filter config");
    BatchedBloomFilter::new(config).expect("Failed to create filter")
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_and_drain");

    for batch_size in [1, 10, 100, 1_000] {
        let test_data = generate_test_data(10_000);

        group.bench_with_input(
            BenchmarkId::new("batch_size", batch_size),
            &(batch_size, &test_data),
            |b, (batch_size, data)| {
                b.iter_batched(
                    || create_filter(data.len(), *batch_size),
                    |filter| {
                        for item in data.iter() {
                            filter.insert(item.as_bytes());
                        }
                        filter.close();
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("might_contain");

    for capacity in [1_000, 100_000] {
        let test_data = generate_test_data(capacity);
        let filter = create_filter(capacity, 100);
        for item in &test_data {
            filter.insert(item.as_bytes());
        }
        filter.close();

        let probes = generate_test_data(1_000);
        group.bench_with_input(
            BenchmarkId::new("capacity", capacity),
            &probes,
            |b, probes| {
                b.iter(|| {
                    for probe in probes {
                        black_box(filter.might_contain(probe.as_bytes()));
                    }
                })
            },
        );
    }

    group.finish();
}

fn bench_diagnostics(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnostics");
    let filter = create_filter(100_000, 100);
    for item in generate_test_data(100_000) {
        filter.insert(item.as_bytes());
    }
    filter.close();

    group.bench_function("saturation", |b| {
        b.iter(|| black_box(filter.saturation_percent()))
    });
    group.bench_function("distribution_variance", |b| {
        b.iter(|| black_box(filter.distribution_variance()))
    });
    group.bench_function("heatmap_1000", |b| {
        b.iter(|| black_box(filter.heatmap(1_000, 100)))
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_query, bench_diagnostics);
criterion_main!(benches);
