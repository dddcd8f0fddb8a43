//! Bloom filter with a write-coalescing insert pipeline
pub mod coalescer;
pub mod config;
pub mod diagnostics;
pub mod filter;
pub mod storage;
pub mod traits;

pub use coalescer::{CoalescerSettings, CoalescerState, WriteCoalescer};
pub use config::{
    BloomParams, FilterConfig, FilterConfigBuilder, FilterConfigBuilderError,
};
pub use diagnostics::Heatmap;
pub use filter::{BatchedBloomFilter, FilterStats};
pub use storage::{BitField, BitFieldStore};
pub use traits::{BloomFilterStats, BulkBloomFilterOps};
