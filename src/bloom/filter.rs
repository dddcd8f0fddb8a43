use super::coalescer::{CoalescerSettings, CoalescerState, WriteCoalescer};
use super::diagnostics::{self, Heatmap};
use super::storage::BitFieldStore;
use super::{
    BloomFilterStats, BloomParams, BulkBloomFilterOps, FilterConfig,
    FilterConfigBuilder,
};
use crate::error::{FilterError, Result};
use crate::hash::{DoubleHasher, KeyHashFunction};
use rand::Rng;
use std::sync::Arc;
use tracing::info;

/// Point-in-time view of a filter's counters and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterStats {
    pub bit_vector_size: usize,
    pub num_hashes: usize,
    pub byte_size: usize,
    pub element_count: u64,
    pub dropped_count: u64,
    pub queued: usize,
    /// Percent
    pub estimated_fpr: f64,
    /// Percent
    pub saturation: f64,
    pub distribution_variance: f64,
}

/// Bloom filter with asynchronous, batched inserts.
///
/// Queries read the bit array directly under a shared lock. Inserts are
/// queued and committed in batches by a background worker, so a key becomes
/// visible after its batch commits: at the latest one flush interval after
/// it was accepted, or when [`close`](Self::close) returns.
pub struct BatchedBloomFilter {
    config: FilterConfig,
    params: BloomParams,
    hasher: DoubleHasher,
    store: Arc<BitFieldStore>,
    coalescer: WriteCoalescer,
}

impl BatchedBloomFilter {
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;

        let params = BloomParams::try_from(&config)?;
        let hasher = DoubleHasher::new(
            config.hash_function_1,
            config.hash_function_2,
            params.num_hashes,
            params.bit_vector_size,
        );
        let store = Arc::new(BitFieldStore::new(params.bit_vector_size));
        let coalescer = WriteCoalescer::spawn(
            Arc::clone(&store),
            hasher,
            CoalescerSettings {
                queue_capacity: config.queue_capacity,
                batch_size: config.batch_size,
                flush_interval: config.flush_interval,
            },
        )?;

        info!(
            capacity = config.capacity,
            false_positive_rate = config.false_positive_rate,
            bit_vector_size = params.bit_vector_size,
            num_hashes = params.num_hashes,
            byte_size = params.byte_size(),
            "bloom filter created"
        );

        Ok(Self {
            config,
            params,
            hasher,
            store,
            coalescer,
        })
    }

    /// Sizes a filter for `capacity` keys at `false_positive_rate` using the
    /// given pair of base hash functions and default coalescer settings.
    pub fn with_hashers(
        capacity: usize,
        false_positive_rate: f64,
        hash_function_1: KeyHashFunction,
        hash_function_2: KeyHashFunction,
    ) -> Result<Self> {
        let config = FilterConfigBuilder::default()
            .capacity(capacity)
            .false_positive_rate(false_positive_rate)
            .hash_function_1(hash_function_1)
            .hash_function_2(hash_function_2)
            .build()?;
        Self::new(config)
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn params(&self) -> &BloomParams {
        &self.params
    }

    /// Queues `item` for insertion without blocking.
    ///
    /// Returns `false` if the key was dropped because the queue is full or
    /// the filter is closed; the drop is also reflected in
    /// [`dropped_insert_count`](Self::dropped_insert_count).
    pub fn insert(&self, item: &[u8]) -> bool {
        self.coalescer.enqueue(item.to_vec())
    }

    /// `false` means `item` was definitely never committed.
    pub fn might_contain(&self, item: &[u8]) -> bool {
        let positions = self.hasher.positions(item);
        self.store.test_all(&positions)
    }

    /// Stops the background worker after committing every queued key.
    ///
    /// Blocks until the drain completes. Calling it again is a no-op, and
    /// inserts after close are dropped.
    pub fn close(&self) {
        self.coalescer.close();
    }

    /// Theoretical false positive rate, in percent, for the committed count.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        diagnostics::theoretical_fpr(
            self.params.num_hashes,
            self.params.bit_vector_size,
            self.store.element_count(),
        )
    }

    /// Percent confidence that a positive answer is a true member.
    pub fn membership_confidence(&self) -> f64 {
        100.0 - self.estimated_false_positive_rate()
    }

    pub fn dropped_insert_count(&self) -> u64 {
        self.coalescer.dropped_count()
    }

    pub fn queued_len(&self) -> usize {
        self.coalescer.queued_len()
    }

    pub fn coalescer_state(&self) -> CoalescerState {
        self.coalescer.state()
    }

    pub fn saturation_percent(&self) -> f64 {
        diagnostics::saturation(&self.store.read())
    }

    pub fn distribution_variance(&self) -> f64 {
        diagnostics::byte_distribution_variance(&self.store.read())
    }

    /// Samples a random window of `min(sample_bits, m)` bits.
    pub fn heatmap(
        &self,
        sample_bits: usize,
        columns: usize,
    ) -> Result<Heatmap> {
        self.heatmap_with_rng(sample_bits, columns, &mut rand::rng())
    }

    pub fn heatmap_with_rng<R: Rng>(
        &self,
        sample_bits: usize,
        columns: usize,
        rng: &mut R,
    ) -> Result<Heatmap> {
        if columns == 0 {
            return Err(FilterError::InvalidParameter(
                "Heatmap columns must be > 0".into(),
            ));
        }
        Ok(diagnostics::sample_heatmap(
            &self.store.read(),
            sample_bits,
            columns,
            rng,
        ))
    }

    pub fn stats(&self) -> FilterStats {
        let field = self.store.read();
        FilterStats {
            bit_vector_size: self.params.bit_vector_size,
            num_hashes: self.params.num_hashes,
            byte_size: self.params.byte_size(),
            element_count: field.element_count(),
            dropped_count: self.coalescer.dropped_count(),
            queued: self.coalescer.queued_len(),
            estimated_fpr: diagnostics::theoretical_fpr(
                self.params.num_hashes,
                self.params.bit_vector_size,
                field.element_count(),
            ),
            saturation: diagnostics::saturation(&field),
            distribution_variance: diagnostics::byte_distribution_variance(
                &field,
            ),
        }
    }
}

impl BloomFilterStats for BatchedBloomFilter {
    fn capacity(&self) -> usize {
        self.config.capacity
    }

    fn false_positive_rate(&self) -> f64 {
        self.config.false_positive_rate
    }

    fn insert_count(&self) -> u64 {
        self.store.element_count()
    }

    fn bit_vector_size(&self) -> usize {
        self.params.bit_vector_size
    }

    fn num_hashes(&self) -> usize {
        self.params.num_hashes
    }
}

impl BulkBloomFilterOps for BatchedBloomFilter {
    fn insert_bulk(&self, items: &[&[u8]]) -> usize {
        items.iter().filter(|item| self.insert(item)).count()
    }

    fn contains_bulk(&self, items: &[&[u8]]) -> Vec<bool> {
        let position_sets: Vec<Vec<usize>> =
            items.iter().map(|item| self.hasher.positions(item)).collect();
        self.store.test_each(&position_sets)
    }
}

impl std::fmt::Debug for BatchedBloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BatchedBloomFilter {{ capacity: {}, false_positive_rate: {}, bit_vector_size: {}, num_hashes: {}, batch_size: {}, flush_interval: {:?} }}",
            self.config.capacity,
            self.config.false_positive_rate,
            self.params.bit_vector_size,
            self.params.num_hashes,
            self.config.batch_size,
            self.config.flush_interval,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn create_filter(capacity: usize, fpr: f64) -> BatchedBloomFilter {
        let config = FilterConfigBuilder::default()
            .capacity(capacity)
            .false_positive_rate(fpr)
            .build()
            .expect("Unable to build FilterConfig");
        BatchedBloomFilter::new(config).expect("Failed to create filter")
    }

    #[test]
    fn test_sizing_is_exposed() {
        let filter = create_filter(1000, 0.01);
        assert_eq!(filter.bit_vector_size(), 9586);
        assert_eq!(filter.num_hashes(), 7);
        assert_eq!(filter.capacity(), 1000);
        assert_eq!(filter.false_positive_rate(), 0.01);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let (h1, h2) = crate::hash::default_hash_pair();
        for (capacity, fpr) in [(0, 0.01), (100, 0.0), (100, 1.0), (100, -1.0)]
        {
            assert!(matches!(
                BatchedBloomFilter::with_hashers(capacity, fpr, h1, h2),
                Err(FilterError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_membership_visible_after_flush_interval() {
        let filter = create_filter(1000, 0.01);
        assert!(filter.insert(b"apple"));
        std::thread::sleep(Duration::from_millis(400));
        assert!(filter.might_contain(b"apple"));
        assert_eq!(filter.insert_count(), 1);
    }

    #[test]
    fn test_heatmap_rejects_zero_columns() {
        let filter = create_filter(100, 0.01);
        assert!(matches!(
            filter.heatmap(10, 0),
            Err(FilterError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_stats_snapshot_is_consistent() {
        let filter = create_filter(1000, 0.01);
        for i in 0..200 {
            filter.insert(format!("item_{i}").as_bytes());
        }
        filter.close();

        let stats = filter.stats();
        assert_eq!(stats.element_count, 200);
        assert_eq!(stats.dropped_count, 0);
        assert_eq!(stats.queued, 0);
        assert_eq!(stats.byte_size, 1199);
        assert_eq!(stats.estimated_fpr, filter.estimated_false_positive_rate());
        assert_eq!(stats.saturation, filter.saturation_percent());
        assert!(stats.saturation > 0.0);
    }

    #[test]
    fn test_debug_output() {
        let filter = create_filter(1000, 0.01);
        let debug = format!("{filter:?}");
        assert!(debug.contains("bit_vector_size: 9586"));
        assert!(debug.contains("num_hashes: 7"));
    }
}
