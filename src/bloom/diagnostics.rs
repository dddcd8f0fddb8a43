//! Read-only measurements over a [`BitField`].

use super::storage::BitField;
use rand::Rng;
use std::fmt;

/// `(1 - e^(-k*n/m))^k` as a percentage.
pub fn theoretical_fpr(
    num_hashes: usize,
    bit_vector_size: usize,
    elements: u64,
) -> f64 {
    let k = num_hashes as f64;
    let m = bit_vector_size as f64;
    let n = elements as f64;
    (1.0 - (-k * n / m).exp()).powf(k) * 100.0
}

/// Percentage of the `m` addressable bits that are set.
pub fn saturation(field: &BitField) -> f64 {
    if field.is_empty() {
        return 0.0;
    }
    field.count_ones() as f64 / field.len() as f64 * 100.0
}

/// Population variance of the set-bit count of each backing byte.
pub fn byte_distribution_variance(field: &BitField) -> f64 {
    let bytes = field.as_bytes();
    if bytes.is_empty() {
        return 0.0;
    }

    let len = bytes.len() as f64;
    let mean =
        bytes.iter().map(|b| b.count_ones() as f64).sum::<f64>() / len;
    bytes
        .iter()
        .map(|b| {
            let diff = b.count_ones() as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / len
}

/// Samples `min(sample_bits, m)` contiguous bits starting at a uniformly
/// chosen offset.
pub fn sample_heatmap<R: Rng>(
    field: &BitField,
    sample_bits: usize,
    columns: usize,
    rng: &mut R,
) -> Heatmap {
    let total = field.len();
    let size = sample_bits.min(total);
    let start = rng.random_range(0..=total - size);

    Heatmap {
        start_bit: start,
        columns,
        cells: field.window(start, start + size),
    }
}

/// A sampled window of the bit array laid out in rows of `columns` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heatmap {
    start_bit: usize,
    columns: usize,
    cells: Vec<bool>,
}

impl Heatmap {
    pub fn start_bit(&self) -> usize {
        self.start_bit
    }

    /// Exclusive end of the sampled window.
    pub fn end_bit(&self) -> usize {
        self.start_bit + self.cells.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn set_count(&self) -> usize {
        self.cells.iter().filter(|&&bit| bit).count()
    }

    /// Rows of at most `columns` cells; the last row may be shorter.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.cells.chunks(self.columns)
    }
}

impl fmt::Display for Heatmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &bit in row {
                f.write_str(if bit { "█" } else { "·" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
