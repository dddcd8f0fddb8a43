use crate::error::{FilterError, Result};
use crate::hash::{
    KeyHashFunction, hash_fnv32, hash_murmur32, optimal_bit_vector_size,
    optimal_num_hashes,
};
use derive_builder::Builder;
use std::time::Duration;

#[derive(Clone, Debug, Builder)]
#[builder(pattern = "owned")]
pub struct FilterConfig {
    /// Expected number of distinct keys
    #[builder(default = "1_000_000")]
    pub capacity: usize,

    /// Target false positive rate (0.0 to 1.0, exclusive)
    #[builder(default = "0.01")]
    pub false_positive_rate: f64,

    /// First base hash function
    #[builder(default = "hash_murmur32")]
    pub hash_function_1: KeyHashFunction,

    /// Second base hash function, must be independent of the first
    #[builder(default = "hash_fnv32")]
    pub hash_function_2: KeyHashFunction,

    /// Slots in the insert queue before keys start being dropped
    #[builder(default = "10_000")]
    pub queue_capacity: usize,

    /// Keys per committed batch
    #[builder(default = "100")]
    pub batch_size: usize,

    /// Longest time a key waits in a partial batch
    #[builder(default = "Duration::from_millis(100)")]
    pub flush_interval: Duration,
}

impl FilterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(FilterError::InvalidParameter(
                "Capacity must be > 0".into(),
            ));
        }
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(FilterError::InvalidParameter(format!(
                "FPR must be between 0 and 1, got {}",
                self.false_positive_rate
            )));
        }
        if self.queue_capacity == 0 {
            return Err(FilterError::InvalidParameter(
                "Queue capacity must be > 0".into(),
            ));
        }
        if self.batch_size == 0 {
            return Err(FilterError::InvalidParameter(
                "Batch size must be > 0".into(),
            ));
        }
        if self.flush_interval.is_zero() {
            return Err(FilterError::InvalidParameter(
                "Flush interval must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Derived parameters calculated from FilterConfig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomParams {
    pub bit_vector_size: usize,
    pub num_hashes: usize,
}

impl BloomParams {
    /// Sizes a filter for `capacity` keys at `false_positive_rate`.
    pub fn new(capacity: usize, false_positive_rate: f64) -> Result<Self> {
        if capacity == 0 {
            return Err(FilterError::InvalidParameter(
                "Capacity must be > 0".into(),
            ));
        }
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(FilterError::InvalidParameter(format!(
                "FPR must be between 0 and 1, got {false_positive_rate}"
            )));
        }

        let bit_vector_size =
            optimal_bit_vector_size(capacity, false_positive_rate);
        let num_hashes = optimal_num_hashes(capacity, bit_vector_size);

        Ok(Self {
            bit_vector_size,
            num_hashes,
        })
    }

    /// Bytes backing the bit array, `ceil(m / 8)`.
    pub fn byte_size(&self) -> usize {
        self.bit_vector_size.div_ceil(8)
    }
}

impl TryFrom<&FilterConfig> for BloomParams {
    type Error = FilterError;

    fn try_from(config: &FilterConfig) -> Result<Self> {
        Self::new(config.capacity, config.false_positive_rate)
    }
}
