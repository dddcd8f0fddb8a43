use fnv::FnvHasher;
use murmur3::murmur3_32;
use std::hash::Hasher;
use std::io::Cursor;

/// A type alias for one of the two base hash functions used by the filter.
///
/// **Parameters:**
///
/// - `key: &[u8]`
///   - A byte slice representing the key to be hashed.
///
/// **Returns:**
///
/// - `u32`
///   - A hash value assumed to be uniformly distributed and independent of
///     the other base hash function.
///
/// **Usage:**
///
/// The filter calls both base functions once per key and derives all `k`
/// bit positions from the pair with [`bit_positions`].
pub type KeyHashFunction = fn(&[u8]) -> u32;

pub fn hash_murmur32(key: &[u8]) -> u32 {
    let mut cursor = Cursor::new(key);
    // Reading from an in-memory cursor cannot fail.
    murmur3_32(&mut cursor, 0).unwrap_or_default()
}

pub fn hash_fnv32(key: &[u8]) -> u32 {
    let mut hasher = FnvHasher::default();
    hasher.write(key);
    hasher.finish() as u32
}

/// Murmur3 and FNV-1a, the pair used when the caller supplies none.
pub fn default_hash_pair() -> (KeyHashFunction, KeyHashFunction) {
    (hash_murmur32, hash_fnv32)
}

/// Derives `num_hashes` positions in `[0, bit_vector_size)` by double hashing:
/// `(h1 + i * h2) mod m`.
///
/// A zero `h2` is remapped to 1, otherwise every position would collapse onto
/// `h1 mod m`. Positions are not deduplicated.
pub fn bit_positions(
    h1: u32,
    h2: u32,
    num_hashes: usize,
    bit_vector_size: usize,
) -> impl Iterator<Item = usize> {
    let h1 = h1 as u64;
    let h2 = h2.max(1) as u64;
    let m = bit_vector_size as u64;
    (0..num_hashes as u64).map(move |i| ((h1 + i * h2) % m) as usize)
}

/// Maps a key to its `k` bit positions using two base hash functions.
#[derive(Clone, Copy, Debug)]
pub struct DoubleHasher {
    hash_function_1: KeyHashFunction,
    hash_function_2: KeyHashFunction,
    num_hashes: usize,
    bit_vector_size: usize,
}

impl DoubleHasher {
    pub fn new(
        hash_function_1: KeyHashFunction,
        hash_function_2: KeyHashFunction,
        num_hashes: usize,
        bit_vector_size: usize,
    ) -> Self {
        Self {
            hash_function_1,
            hash_function_2,
            num_hashes,
            bit_vector_size,
        }
    }

    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    pub fn bit_vector_size(&self) -> usize {
        self.bit_vector_size
    }

    pub fn positions(&self, key: &[u8]) -> Vec<usize> {
        let mut positions = Vec::with_capacity(self.num_hashes);
        self.extend_positions(key, &mut positions);
        positions
    }

    /// Appends the key's positions to `out`, for building a batch.
    pub fn extend_positions(&self, key: &[u8], out: &mut Vec<usize>) {
        out.extend(bit_positions(
            (self.hash_function_1)(key),
            (self.hash_function_2)(key),
            self.num_hashes,
            self.bit_vector_size,
        ));
    }
}

/// Bit-array size `m` for `n` expected items at false-positive rate `fpr`.
///
/// Computed as `floor(-n * ln(fpr) / ln(2)^2) + 1` so it never rounds down.
pub fn optimal_bit_vector_size(n: usize, fpr: f64) -> usize {
    let ln2 = std::f64::consts::LN_2;
    let exact = (-(n as f64) * fpr.ln()) / (ln2 * ln2);
    exact.floor() as usize + 1
}

/// Hash count `k` for `n` expected items spread over `m` bits.
pub fn optimal_num_hashes(n: usize, m: usize) -> usize {
    let exact = (m as f64 / n as f64) * std::f64::consts::LN_2;
    exact.floor() as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing_for_thousand_items_one_percent() {
        let m = optimal_bit_vector_size(1000, 0.01);
        let k = optimal_num_hashes(1000, m);
        assert_eq!(m, 9586);
        assert_eq!(k, 7);
    }

    #[test]
    fn test_sizing_never_rounds_down() {
        for &(n, p) in &[(1, 0.5), (10, 0.1), (1_000_000, 0.001), (7, 0.3)] {
            let ln2 = std::f64::consts::LN_2;
            let exact_m = -(n as f64) * f64::ln(p) / (ln2 * ln2);
            let m = optimal_bit_vector_size(n, p);
            assert!(m as f64 >= exact_m.ceil(), "m={m} exact={exact_m}");

            let exact_k = (m as f64 / n as f64) * ln2;
            let k = optimal_num_hashes(n, m);
            assert!(k as f64 >= exact_k.ceil(), "k={k} exact={exact_k}");
            assert!(k > 0);
        }
    }

    #[test]
    fn test_positions_follow_double_hashing() {
        let positions: Vec<usize> = bit_positions(10, 7, 4, 20).collect();
        assert_eq!(positions, vec![10, 17, 4, 11]);
    }

    #[test]
    fn test_positions_stay_in_range() {
        let m = 9586;
        for key in ["apple", "banana", "cherry", ""] {
            let bytes = key.as_bytes();
            let positions: Vec<usize> =
                bit_positions(hash_murmur32(bytes), hash_fnv32(bytes), 7, m)
                    .collect();
            assert_eq!(positions.len(), 7);
            assert!(positions.iter().all(|&p| p < m));
        }
    }

    #[test]
    fn test_zero_second_hash_is_remapped() {
        let positions: Vec<usize> = bit_positions(5, 0, 3, 100).collect();
        assert_eq!(positions, vec![5, 6, 7]);
    }

    #[test]
    fn test_no_wraparound_before_modulo() {
        // 32-bit wrapping arithmetic would give (u32::MAX + u32::MAX) as u32.
        let positions: Vec<usize> =
            bit_positions(u32::MAX, u32::MAX, 2, 1_000).collect();
        let expected = ((u32::MAX as u64 * 2) % 1_000) as usize;
        assert_eq!(positions[1], expected);
    }

    #[test]
    fn test_double_hasher_uses_both_functions() {
        fn constant_seven(_: &[u8]) -> u32 {
            7
        }
        fn constant_three(_: &[u8]) -> u32 {
            3
        }

        let hasher = DoubleHasher::new(constant_seven, constant_three, 5, 10);
        assert_eq!(hasher.positions(b"anything"), vec![7, 0, 3, 6, 9]);

        let mut batch = vec![1];
        hasher.extend_positions(b"anything", &mut batch);
        assert_eq!(batch.len(), 6);
    }

    #[test]
    fn test_default_hashes_are_deterministic() {
        let (h1, h2) = default_hash_pair();
        assert_eq!(h1(b"durian"), h1(b"durian"));
        assert_eq!(h2(b"durian"), h2(b"durian"));
        assert_ne!(h1(b"durian"), h2(b"durian"));
    }
}
