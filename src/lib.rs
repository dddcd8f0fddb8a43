//! Concurrent Bloom filter with batched, asynchronous inserts.
//!
//! HowTo:
//!    * Sizing: the bit-array length `m` and hash count `k` are derived once
//!      from the expected item count and the target false positive rate.
//!    * Hashing: two base hashes `h1`, `h2` give every position as
//!      `(h1 + i * h2) mod m` for `i` in `0..k`.
//!    * Storage: a packed bit array behind one reader/writer lock.
//!
//! Insertion:
//!     * `insert` offers the key to a bounded queue and returns immediately.
//!     * A background worker gathers keys into batches and commits each batch
//!       under a single write lock, either when the batch is full or when the
//!       flush interval elapses.
//!     * When the queue is full the key is dropped and counted.
//! Query:
//!     * `might_contain` checks all `k` bits under a read lock.
//!     * Keys still waiting in the queue are not visible yet.
//! Shutdown:
//!     * `close` commits everything accepted so far, then stops the worker.
//!
//! Obvious problems:
//!     * Under sustained overload inserts are lost rather than delayed, so
//!       later queries may report false negatives for dropped keys.
//!     * No deletion and no resizing; a fuller filter must be rebuilt.

pub mod bloom;
pub mod common;
mod error;
mod hash;

pub use bloom::{
    BatchedBloomFilter, BloomFilterStats, BloomParams, BulkBloomFilterOps,
    CoalescerState, FilterConfig, FilterConfigBuilder,
    FilterConfigBuilderError, FilterStats, Heatmap,
};
pub use error::{FilterError, Result};
pub use hash::{
    DoubleHasher, KeyHashFunction, bit_positions, default_hash_pair,
    hash_fnv32, hash_murmur32, optimal_bit_vector_size, optimal_num_hashes,
};
