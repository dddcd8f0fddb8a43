/// Sizing and counters for a Bloom filter
pub trait BloomFilterStats {
    /// Expected item count the filter was sized for
    fn capacity(&self) -> usize;
    /// Target false positive rate the filter was sized for
    fn false_positive_rate(&self) -> f64;
    /// Keys committed to the bit array
    fn insert_count(&self) -> u64;
    fn bit_vector_size(&self) -> usize;
    fn num_hashes(&self) -> usize;
}

/// Bulk operations for Bloom filters
pub trait BulkBloomFilterOps {
    /// Offers every key to the insert queue; returns how many were accepted
    fn insert_bulk(&self, items: &[&[u8]]) -> usize;
    /// Answers every key under a single read lock
    fn contains_bulk(&self, items: &[&[u8]]) -> Vec<bool>;
}
