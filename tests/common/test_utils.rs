use batched_bloom_rs::{BatchedBloomFilter, FilterConfigBuilder};
use std::time::{Duration, Instant};

/// Filter whose queue is large enough that `capacity` inserts never drop.
#[allow(dead_code)]
pub fn create_test_filter(capacity: usize, fpr: f64) -> BatchedBloomFilter {
    let config = FilterConfigBuilder::default()
        .capacity(capacity)
        .false_positive_rate(fpr)
        .queue_capacity(capacity.max(10_000))
        .build()
        .expect("Failed to build test config");

    BatchedBloomFilter::new(config).expect("Failed to create test filter")
}

/// Filter that holds up to `capacity` keys uncommitted until close.
#[allow(dead_code)]
pub fn create_lazy_filter(capacity: usize) -> BatchedBloomFilter {
    let config = FilterConfigBuilder::default()
        .capacity(capacity)
        .false_positive_rate(0.01)
        .queue_capacity(capacity)
        .batch_size(capacity + 1)
        .flush_interval(Duration::from_secs(3600))
        .build()
        .expect("Failed to build test config");

    BatchedBloomFilter::new(config).expect("Failed to create test filter")
}

// Helper function to generate consistent test data
#[allow(dead_code)]
pub fn generate_test_items(prefix: &str, count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| format!("{prefix}_{i:07}").into_bytes())
        .collect()
}

/// Polls `condition` until it holds or `timeout` elapses.
#[allow(dead_code)]
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
